//! Work entry review
//!
//! Reviewer session state, two-step confirmation and the bulk action engine
//! that applies approve / reject / request-changes across many entries.

pub mod confirmation;
pub mod engine;
pub mod ports;
pub mod session;

pub use confirmation::{ConfirmationToken, PendingConfirmation};
pub use engine::BulkActionEngine;
pub use ports::{WorkEntryActions, WorkEntrySource};
pub use session::{BulkNotice, ReviewSession};
