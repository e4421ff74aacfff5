//! Port interfaces for work entry review

use async_trait::async_trait;
use cranepay_domain::{
    BulkOperationResult, PayrollPeriod, RawWorkEntry, Result, WorkEntryAction, WorkEntryId,
};

/// Source of supervisor-approved clock records
#[async_trait]
pub trait WorkEntrySource: Send + Sync {
    /// Raw entries dated inside `period` that a supervisor has confirmed
    async fn fetch_approved_entries(&self, period: &PayrollPeriod) -> Result<Vec<RawWorkEntry>>;
}

/// Backend that applies reviewer actions to raw work entries
#[async_trait]
pub trait WorkEntryActions: Send + Sync {
    /// Apply `action` to every id in one request.
    ///
    /// Ids the backend refuses are reported in `failed`; `Err` means no
    /// usable response was received.
    async fn bulk_apply(
        &self,
        ids: &[WorkEntryId],
        action: WorkEntryAction,
        notes: Option<&str>,
    ) -> Result<BulkOperationResult>;

    /// Apply `action` to a single id
    async fn apply(&self, id: WorkEntryId, action: WorkEntryAction, notes: Option<&str>) -> Result<()>;
}
