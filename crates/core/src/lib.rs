//! # Cranepay Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Period calculation and work entry aggregation
//! - The payroll batch state machine and lifecycle service
//! - The bulk review engine with two-step confirmation
//! - Port interfaces (traits) for the payroll backend and Zenegy
//!
//! ## Architecture Principles
//! - Only depends on `cranepay-domain`
//! - No HTTP or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod aggregation;
pub mod batch;
pub mod clock;
pub mod period;
pub mod review;

pub use aggregation::{RateResolver, StaticRateResolver, WorkEntryAggregator};
pub use batch::ports::{BatchGateway, ZenegySync};
pub use batch::{BatchEvent, BatchLifecycleService, SyncOutcome};
pub use clock::{Clock, SystemClock};
pub use review::ports::{WorkEntryActions, WorkEntrySource};
pub use review::{BulkActionEngine, BulkNotice, ConfirmationToken, PendingConfirmation, ReviewSession};
