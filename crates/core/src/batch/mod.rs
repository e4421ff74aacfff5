//! Payroll batch lifecycle
//!
//! This module provides the pure batch state machine, the ports for batch
//! persistence and Zenegy sync, and the service that composes them.

pub mod ports;
pub mod service;
pub mod state_machine;

pub use ports::{BatchGateway, ZenegySync};
pub use service::{BatchLifecycleService, SyncOutcome};
pub use state_machine::BatchEvent;
