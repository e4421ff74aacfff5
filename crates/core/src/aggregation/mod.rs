//! Work entry aggregation
//!
//! Groups raw approved hours per employee/project/task and prices them
//! through a pluggable [`RateResolver`].

pub mod aggregator;
pub mod rates;

pub use aggregator::{batch_employee_breakdown, batch_financial_breakdown, WorkEntryAggregator};
pub use rates::{RateResolver, StaticRateResolver};
