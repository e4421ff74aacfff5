//! # Cranepay Domain
//!
//! Business domain types for the payroll batch workflow.
//!
//! This crate contains:
//! - Periods, work entries, batches and bulk results
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other cranepay crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

pub use config::*;
pub use errors::*;
pub use types::*;
