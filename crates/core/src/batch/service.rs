//! Batch lifecycle service - orchestrates the state machine and ports

use std::sync::Arc;

use cranepay_domain::{
    BatchId, BatchNumber, BatchStats, BatchStatusFilter, BatchUpdate, PayrollBatch,
    PayrollPeriod, Result, WorkEntryForReview, ZenegySyncResult,
};
use tracing::{info, instrument, warn};

use super::ports::{BatchGateway, ZenegySync};
use super::state_machine::{self, BatchEvent};
use crate::clock::{Clock, SystemClock};

/// Result of one Zenegy sync attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    /// Batch as persisted after the outcome was recorded
    pub batch: PayrollBatch,
    pub result: ZenegySyncResult,
}

/// Drives batches through their lifecycle.
///
/// Every operation validates the transition locally before any request is
/// sent, so guard violations never reach the network. Zenegy syncs are
/// never retried automatically; `retry_sync` is the only way back into
/// `sent_to_zenegy` after a failure.
pub struct BatchLifecycleService {
    gateway: Arc<dyn BatchGateway>,
    zenegy: Arc<dyn ZenegySync>,
    clock: Arc<dyn Clock>,
}

impl BatchLifecycleService {
    /// Create a new lifecycle service
    pub fn new(gateway: Arc<dyn BatchGateway>, zenegy: Arc<dyn ZenegySync>) -> Self {
        Self { gateway, zenegy, clock: Arc::new(SystemClock) }
    }

    /// Override the clock used for lifecycle stamps
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Create a batch from approved review aggregates.
    #[instrument(
        skip(self, period, entries, notes),
        fields(period_name = %period.display_name(), entries = entries.len())
    )]
    pub async fn create_batch(
        &self,
        period: &PayrollPeriod,
        entries: &[WorkEntryForReview],
        notes: Option<String>,
        batch_number: Option<BatchNumber>,
        is_draft: bool,
    ) -> Result<PayrollBatch> {
        let request = state_machine::prepare_new_batch(period, entries, notes, batch_number, is_draft)?;
        let batch = self.gateway.create_batch(&request).await?;

        if !request.totals.matches(&batch) {
            warn!(
                batch_id = batch.id,
                expected_amount = %request.totals.total_amount,
                actual_amount = %batch.total_amount,
                expected_employees = request.totals.total_employees,
                actual_employees = batch.total_employees,
                "Backend batch totals differ from the selected entries"
            );
        }

        info!(batch_id = batch.id, batch_number = %batch.batch_number, status = %batch.status, "Payroll batch created");
        Ok(batch)
    }

    /// Current state of one batch
    pub async fn fetch_batch(&self, id: BatchId) -> Result<PayrollBatch> {
        self.gateway.fetch_batch(id).await
    }

    /// List batches matching `filter`.
    pub async fn list_batches(&self, filter: BatchStatusFilter) -> Result<Vec<PayrollBatch>> {
        let mut batches = self.gateway.list_batches(filter).await?;
        batches.retain(|batch| filter.matches(batch.status));
        Ok(batches)
    }

    /// Dashboard counters over every batch
    pub async fn batch_stats(&self) -> Result<BatchStats> {
        let batches = self.gateway.list_batches(BatchStatusFilter::All).await?;
        Ok(BatchStats::from_batches(&batches))
    }

    /// `draft → ready_for_approval`
    #[instrument(skip(self))]
    pub async fn submit_batch(&self, id: BatchId) -> Result<PayrollBatch> {
        let batch = self.gateway.fetch_batch(id).await?;
        let submitted = state_machine::transition(&batch, BatchEvent::Submit, self.clock.now())?;
        self.persist(&batch, &submitted).await
    }

    /// `ready_for_approval → approved`
    ///
    /// Approval authority is checked by the backend.
    #[instrument(skip(self))]
    pub async fn approve_batch(&self, id: BatchId) -> Result<PayrollBatch> {
        let batch = self.gateway.fetch_batch(id).await?;
        state_machine::ensure_allowed(&batch, BatchEvent::Approve)?;
        let approved = self.gateway.approve_batch(id).await?;
        info!(batch_id = id, "Payroll batch approved");
        Ok(approved)
    }

    /// Cancel a draft or pending batch. Irreversible.
    #[instrument(skip(self))]
    pub async fn cancel_batch(&self, id: BatchId) -> Result<PayrollBatch> {
        let batch = self.gateway.fetch_batch(id).await?;
        state_machine::ensure_allowed(&batch, BatchEvent::Cancel)?;
        let cancelled = self.gateway.cancel_batch(id).await?;
        info!(batch_id = id, "Payroll batch cancelled");
        Ok(cancelled)
    }

    /// `approved → sent_to_zenegy → completed | failed`
    #[instrument(skip(self))]
    pub async fn send_to_zenegy(&self, id: BatchId) -> Result<SyncOutcome> {
        let batch = self.gateway.fetch_batch(id).await?;
        self.run_sync(batch, BatchEvent::SendToZenegy).await
    }

    /// `failed → sent_to_zenegy → completed | failed`, same batch contents
    #[instrument(skip(self))]
    pub async fn retry_sync(&self, id: BatchId) -> Result<SyncOutcome> {
        let batch = self.gateway.fetch_batch(id).await?;
        self.run_sync(batch, BatchEvent::Retry).await
    }

    /// Resolve a batch left in `syncing` by polling Zenegy.
    ///
    /// Batches that are not waiting on a sync are returned unchanged, as are
    /// batches whose provider status is still unresolved.
    #[instrument(skip(self))]
    pub async fn refresh_sync_status(&self, id: BatchId) -> Result<PayrollBatch> {
        let batch = self.gateway.fetch_batch(id).await?;
        if !batch.is_sync_in_progress() {
            return Ok(batch);
        }

        let status = self.zenegy.fetch_zenegy_status(id).await?;
        match state_machine::apply_sync_status(&batch, status, self.clock.now())? {
            Some(resolved) => {
                info!(batch_id = id, sync_status = %status, "Zenegy sync resolved by status poll");
                self.persist(&batch, &resolved).await
            }
            None => Ok(batch),
        }
    }

    /// Replace the batch number of a draft, defaulting to the canonical
    /// number of the batch's period.
    #[instrument(skip(self))]
    pub async fn regenerate_batch_number(
        &self,
        id: BatchId,
        number: Option<BatchNumber>,
    ) -> Result<PayrollBatch> {
        let batch = self.gateway.fetch_batch(id).await?;
        let number = number.unwrap_or_else(|| BatchNumber::for_period(batch.year, batch.period_number));
        let renumbered = state_machine::regenerate_batch_number(&batch, number)?;
        self.persist(&batch, &renumbered).await
    }

    async fn run_sync(&self, batch: PayrollBatch, event: BatchEvent) -> Result<SyncOutcome> {
        let id = batch.id;
        let started = state_machine::transition(&batch, event, self.clock.now())?;

        // The start stamp must be stored before Zenegy is called.
        let started = self.persist(&batch, &started).await?;
        info!(batch_id = id, event = %event, "Zenegy sync started");

        let result = match self.zenegy.sync_to_zenegy(id).await {
            Ok(result) => result,
            Err(err) => {
                warn!(batch_id = id, error = %err, "Zenegy sync got no answer; batch stays syncing");
                return Err(err);
            }
        };

        let outcome_event = if result.success { BatchEvent::SyncSucceeded } else { BatchEvent::SyncFailed };
        let resolved = state_machine::transition(&started, outcome_event, self.clock.now())?;
        let batch = self.persist(&started, &resolved).await?;

        if let Some(message) = result.failure_message() {
            warn!(batch_id = id, error = %message, "Zenegy sync failed");
        } else {
            info!(batch_id = id, zenegy_batch_id = ?result.zenegy_batch_id, "Zenegy sync completed");
        }
        Ok(SyncOutcome { batch, result })
    }

    async fn persist(&self, before: &PayrollBatch, after: &PayrollBatch) -> Result<PayrollBatch> {
        let update = BatchUpdate::between(before, after);
        if update.is_empty() {
            return Ok(after.clone());
        }
        self.gateway.update_batch(before.id, &update).await
    }
}
