//! REST adapter implementing the core payroll ports

use async_trait::async_trait;
use cranepay_core::review::engine::failure_reason;
use cranepay_core::{BatchGateway, WorkEntryActions, WorkEntrySource, ZenegySync};
use cranepay_domain::{
    BatchId, BatchStatusFilter, BatchUpdate, BulkOperationResult, FailureReason, NewBatch,
    PayrollBatch, PayrollError, PayrollPeriod, RawWorkEntry, Result, UserId, WorkEntryAction,
    WorkEntryId, ZenegySyncResult, ZenegySyncStatus,
};
use tracing::{debug, info, instrument, warn};

use super::client::ApiClient;
use super::dto::{
    ApproveRequest, BatchDto, BulkActionRequest, BulkActionResponse, ConfirmedEntriesPage,
    SyncBatchRequest, ZenegyStatusDto,
};

const BATCHES: &str = "/api/app/chef/payroll/batches";
const ZENEGY_SYNC: &str = "/api/app/chef/zenegy/sync-batch";
const CONFIRMED_ENTRIES: &str = "/api/app/work-entries/confirmed";

const DEFAULT_PAGE_SIZE: usize = 100;
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Payroll backend reached over HTTP.
///
/// `approver_id` is the signed-in manager; it is sent with approvals and the
/// backend decides whether that user may approve.
#[derive(Clone)]
pub struct PayrollApi {
    client: ApiClient,
    approver_id: UserId,
    page_size: usize,
}

impl PayrollApi {
    /// Adapter acting as `approver_id` for batch approvals
    pub fn new(client: ApiClient, approver_id: UserId) -> Self {
        Self { client, approver_id, page_size: DEFAULT_PAGE_SIZE }
    }

    /// Page size for confirmed work entry listings
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn batch_path(id: BatchId, suffix: &str) -> String {
        format!("{BATCHES}/{id}{suffix}")
    }

    async fn patch_entries(
        &self,
        ids: &[WorkEntryId],
        action: WorkEntryAction,
        notes: Option<&str>,
    ) -> Result<BulkOperationResult> {
        let request = BulkActionRequest { entry_ids: ids, action, notes };
        let response: BulkActionResponse = self.client.patch(CONFIRMED_ENTRIES, &request).await?;
        Ok(response.into_result())
    }
}

fn into_batch(dto: BatchDto) -> Result<PayrollBatch> {
    PayrollBatch::try_from(dto)
}

#[async_trait]
impl BatchGateway for PayrollApi {
    #[instrument(skip(self, request), fields(entries = request.work_entry_ids.len(), is_draft = request.is_draft))]
    async fn create_batch(&self, request: &NewBatch) -> Result<PayrollBatch> {
        let dto: BatchDto = self.client.post(BATCHES, request).await?;
        into_batch(dto)
    }

    #[instrument(skip(self))]
    async fn fetch_batch(&self, id: BatchId) -> Result<PayrollBatch> {
        let dto: BatchDto = self.client.get(&Self::batch_path(id, ""), &[]).await?;
        into_batch(dto)
    }

    #[instrument(skip(self))]
    async fn list_batches(&self, filter: BatchStatusFilter) -> Result<Vec<PayrollBatch>> {
        let query: Vec<(&str, String)> =
            filter.query_value().map(|status| ("status", status.to_string())).into_iter().collect();

        let dtos: Vec<BatchDto> = self.client.get(BATCHES, &query).await?;
        let batches = dtos.into_iter().map(into_batch).collect::<Result<Vec<_>>>()?;
        debug!(count = batches.len(), "Fetched payroll batches");
        Ok(batches)
    }

    #[instrument(skip(self))]
    async fn approve_batch(&self, id: BatchId) -> Result<PayrollBatch> {
        let request = ApproveRequest { approved_by: self.approver_id, notes: None };
        let dto: BatchDto = self.client.post(&Self::batch_path(id, "/approve"), &request).await?;
        into_batch(dto)
    }

    #[instrument(skip(self))]
    async fn cancel_batch(&self, id: BatchId) -> Result<PayrollBatch> {
        let dto: BatchDto = self.client.post(&Self::batch_path(id, "/cancel"), &serde_json::json!({})).await?;
        into_batch(dto)
    }

    #[instrument(skip(self, update))]
    async fn update_batch(&self, id: BatchId, update: &BatchUpdate) -> Result<PayrollBatch> {
        let dto: BatchDto = self.client.patch(&Self::batch_path(id, ""), update).await?;
        into_batch(dto)
    }
}

#[async_trait]
impl ZenegySync for PayrollApi {
    /// An error status from the sync endpoint is the provider's answer and
    /// comes back as a failed result; only transport errors are `Err`.
    #[instrument(skip(self))]
    async fn sync_to_zenegy(&self, id: BatchId) -> Result<ZenegySyncResult> {
        match self.client.post::<_, ZenegySyncResult>(ZENEGY_SYNC, &SyncBatchRequest { batch_id: id }).await {
            Ok(result) => Ok(result),
            Err(PayrollError::Server { code, message }) => {
                warn!(batch_id = id, code, error = %message, "Zenegy sync rejected");
                Ok(ZenegySyncResult {
                    success: false,
                    zenegy_batch_id: None,
                    synced_at: None,
                    error_message: Some(message),
                    sync_details: None,
                })
            }
            Err(err) => Err(err),
        }
    }

    #[instrument(skip(self))]
    async fn fetch_zenegy_status(&self, id: BatchId) -> Result<ZenegySyncStatus> {
        let dto: ZenegyStatusDto = self.client.get(&Self::batch_path(id, "/zenegy-status"), &[]).await?;
        Ok(dto.into_status())
    }
}

#[async_trait]
impl WorkEntrySource for PayrollApi {
    #[instrument(skip(self, period), fields(period_name = %period.display_name()))]
    async fn fetch_approved_entries(&self, period: &PayrollPeriod) -> Result<Vec<RawWorkEntry>> {
        let start = period.start_date.format(DATE_FORMAT).to_string();
        let end = period.end_date.format(DATE_FORMAT).to_string();

        let mut entries = Vec::new();
        let mut offset = 0usize;
        loop {
            let query = [
                ("start_date", start.clone()),
                ("end_date", end.clone()),
                ("limit", self.page_size.to_string()),
                ("offset", offset.to_string()),
            ];
            let page: ConfirmedEntriesPage = self.client.get(CONFIRMED_ENTRIES, &query).await?;
            let received = page.data.len();

            for dto in page.data {
                let entry_id = dto.entry_id();
                match dto.into_raw() {
                    Some(entry) => entries.push(entry),
                    None => warn!(entry_id, "Skipping confirmed entry without employee or task"),
                }
            }

            let has_more = page.pagination.is_some_and(|p| p.has_more);
            if !has_more || received == 0 {
                break;
            }
            offset += received;
        }

        info!(count = entries.len(), "Fetched approved work entries");
        Ok(entries)
    }
}

#[async_trait]
impl WorkEntryActions for PayrollApi {
    /// A refusal of the whole request (for example 404 when an id is
    /// unknown) is reported against every id; transport errors are `Err`.
    #[instrument(skip_all, fields(%action, entries = ids.len()))]
    async fn bulk_apply(
        &self,
        ids: &[WorkEntryId],
        action: WorkEntryAction,
        notes: Option<&str>,
    ) -> Result<BulkOperationResult> {
        match self.patch_entries(ids, action, notes).await {
            Ok(result) => Ok(result),
            Err(err @ PayrollError::Server { .. }) => {
                let reason = failure_reason(&err);
                warn!(error = %err, "Bulk action refused as a whole");
                Ok(BulkOperationResult::from_outcomes(ids.iter().map(|&id| (id, Err(reason.clone())))))
            }
            Err(err) => Err(err),
        }
    }

    #[instrument(skip(self, notes))]
    async fn apply(&self, id: WorkEntryId, action: WorkEntryAction, notes: Option<&str>) -> Result<()> {
        let result = self.patch_entries(&[id], action, notes).await?;
        if result.successful.contains(&id) {
            return Ok(());
        }

        match result.reason_for(id) {
            // Partial results are answered with 207 Multi-Status
            Some(FailureReason::Server(message)) => {
                Err(PayrollError::Server { code: 207, message: message.clone() })
            }
            Some(FailureReason::NotFound) => Err(PayrollError::NotFound(format!("work entry {id}"))),
            Some(FailureReason::AlreadyFinalized) => Err(PayrollError::AlreadyFinalized(id)),
            Some(other) => Err(PayrollError::Internal(other.to_string())),
            None => Err(PayrollError::InvalidResponse(format!("no result reported for work entry {id}"))),
        }
    }
}
