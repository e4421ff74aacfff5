//! Domain types and models

pub mod batch;
pub mod breakdown;
pub mod bulk;
pub mod period;
pub mod serde_helpers;
pub mod work_entry;
pub mod zenegy;

pub use batch::{
    BatchId, BatchNumber, BatchStats, BatchStatusFilter, BatchTotals, BatchUpdate, NewBatch,
    PayrollBatch, PayrollBatchStatus,
};
pub use breakdown::{BucketTotals, EmployeeBreakdown, FinancialBreakdown, RateBucket};
pub use bulk::{BulkOperationResult, FailedOperation, FailureReason};
pub use period::{PayrollPeriod, PayrollPeriodOption, PayrollPeriodStatus};
pub use work_entry::{
    EmployeeId, PeriodCoverage, ProjectId, RawWorkEntry, SupervisorConfirmation, TaskId, UserId,
    WorkEntryAction, WorkEntryForReview, WorkEntryId, WorkEntryReviewStatus,
};
pub use zenegy::{ZenegySyncDetails, ZenegySyncResult, ZenegySyncStatus};
