//! Port interfaces for payroll batch persistence and Zenegy sync

use async_trait::async_trait;
use cranepay_domain::{
    BatchId, BatchStatusFilter, BatchUpdate, NewBatch, PayrollBatch, Result, ZenegySyncResult,
    ZenegySyncStatus,
};

/// Backend that owns payroll batches
#[async_trait]
pub trait BatchGateway: Send + Sync {
    // Persistence
    /// Create a batch from approved work entries
    async fn create_batch(&self, request: &NewBatch) -> Result<PayrollBatch>;

    /// Get a batch by its ID
    async fn fetch_batch(&self, id: BatchId) -> Result<PayrollBatch>;

    /// List batches, optionally narrowed by status
    async fn list_batches(&self, filter: BatchStatusFilter) -> Result<Vec<PayrollBatch>>;

    // Lifecycle
    /// Approve a batch waiting for approval
    async fn approve_batch(&self, id: BatchId) -> Result<PayrollBatch>;

    /// Cancel a draft or pending batch
    async fn cancel_batch(&self, id: BatchId) -> Result<PayrollBatch>;

    /// Persist fields changed by a local transition
    async fn update_batch(&self, id: BatchId, update: &BatchUpdate) -> Result<PayrollBatch>;
}

/// External payroll provider
#[async_trait]
pub trait ZenegySync: Send + Sync {
    /// Push a batch to Zenegy.
    ///
    /// A rejected sync is `Ok` with `success == false`; `Err` means no
    /// answer was received.
    async fn sync_to_zenegy(&self, id: BatchId) -> Result<ZenegySyncResult>;

    /// Poll the provider-side status of a previously started sync
    async fn fetch_zenegy_status(&self, id: BatchId) -> Result<ZenegySyncStatus>;
}
