//! In-memory mocks for the batch and Zenegy ports

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use cranepay_core::{BatchGateway, Clock, ZenegySync};
use cranepay_domain::{
    BatchId, BatchNumber, BatchStatusFilter, BatchUpdate, NewBatch, PayrollBatch,
    PayrollBatchStatus, PayrollError, Result as DomainResult, ZenegySyncResult, ZenegySyncStatus,
};

/// Ordered record of port calls, shared between mocks.
#[derive(Default, Clone)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    pub fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls that can change backend state
    pub fn writes(&self) -> Vec<String> {
        self.calls().into_iter().filter(|c| !c.starts_with("fetch") && !c.starts_with("list")).collect()
    }
}

/// Batch backend keeping everything in a map.
///
/// Mirrors the server rules the client relies on: batch numbers are unique
/// among non-cancelled batches and unknown ids answer 404.
#[derive(Clone)]
pub struct InMemoryBatchGateway {
    batches: Arc<Mutex<BTreeMap<BatchId, PayrollBatch>>>,
    log: CallLog,
    approver_id: i64,
}

impl Default for InMemoryBatchGateway {
    fn default() -> Self {
        Self::new(CallLog::default())
    }
}

impl InMemoryBatchGateway {
    pub fn new(log: CallLog) -> Self {
        Self { batches: Arc::default(), log, approver_id: 7 }
    }

    /// Seed an existing batch.
    pub fn with_batch(self, batch: PayrollBatch) -> Self {
        self.batches.lock().unwrap().insert(batch.id, batch);
        self
    }

    pub fn stored(&self, id: BatchId) -> Option<PayrollBatch> {
        self.batches.lock().unwrap().get(&id).cloned()
    }

    pub fn log(&self) -> &CallLog {
        &self.log
    }

    fn with_stored<T>(&self, id: BatchId, f: impl FnOnce(&mut PayrollBatch) -> T) -> DomainResult<T> {
        let mut batches = self.batches.lock().unwrap();
        let batch = batches.get_mut(&id).ok_or_else(|| PayrollError::Server {
            code: 404,
            message: "Payroll batch not found".to_string(),
        })?;
        Ok(f(batch))
    }
}

#[async_trait]
impl BatchGateway for InMemoryBatchGateway {
    async fn create_batch(&self, request: &NewBatch) -> DomainResult<PayrollBatch> {
        self.log.record("create");
        let mut batches = self.batches.lock().unwrap();

        let number = request
            .batch_number
            .clone()
            .unwrap_or_else(|| BatchNumber::for_period(0, 0));
        if batches
            .values()
            .any(|b| b.batch_number == number && b.status != PayrollBatchStatus::Cancelled)
        {
            return Err(PayrollError::Server {
                code: 409,
                message: format!("Batch number {number} already exists"),
            });
        }

        let id = batches.keys().next_back().map_or(1, |last| last + 1);
        let batch = PayrollBatch {
            id,
            year: number.year(),
            period_number: number.period_number(),
            batch_number: number,
            period_start: request.period_start,
            period_end: request.period_end,
            total_employees: request.totals.total_employees,
            total_hours: request.totals.total_hours,
            total_amount: request.totals.total_amount,
            status: if request.is_draft {
                PayrollBatchStatus::Draft
            } else {
                PayrollBatchStatus::ReadyForApproval
            },
            created_by: 3,
            created_at: Utc.with_ymd_and_hms(2024, 7, 1, 8, 0, 0).unwrap(),
            approved_by: None,
            approved_at: None,
            sent_to_zenegy_at: None,
            zenegy_sync_status: None,
            notes: request.notes.clone(),
        };
        batches.insert(id, batch.clone());
        Ok(batch)
    }

    async fn fetch_batch(&self, id: BatchId) -> DomainResult<PayrollBatch> {
        self.log.record(format!("fetch:{id}"));
        self.with_stored(id, |batch| batch.clone())
    }

    async fn list_batches(&self, filter: BatchStatusFilter) -> DomainResult<Vec<PayrollBatch>> {
        self.log.record(format!("list:{filter:?}"));
        Ok(self
            .batches
            .lock()
            .unwrap()
            .values()
            .filter(|b| filter.matches(b.status))
            .cloned()
            .collect())
    }

    async fn approve_batch(&self, id: BatchId) -> DomainResult<PayrollBatch> {
        self.log.record(format!("approve:{id}"));
        let approver = self.approver_id;
        self.with_stored(id, |batch| {
            batch.status = PayrollBatchStatus::Approved;
            batch.approved_by = Some(approver);
            batch.approved_at = Some(Utc.with_ymd_and_hms(2024, 7, 2, 9, 0, 0).unwrap());
            batch.clone()
        })
    }

    async fn cancel_batch(&self, id: BatchId) -> DomainResult<PayrollBatch> {
        self.log.record(format!("cancel:{id}"));
        self.with_stored(id, |batch| {
            batch.status = PayrollBatchStatus::Cancelled;
            batch.clone()
        })
    }

    async fn update_batch(&self, id: BatchId, update: &BatchUpdate) -> DomainResult<PayrollBatch> {
        let label = update
            .status
            .map_or_else(|| "fields".to_string(), |s| s.to_string());
        self.log.record(format!("update:{id}:{label}"));
        self.with_stored(id, |batch| {
            if let Some(status) = update.status {
                batch.status = status;
            }
            if let Some(sync) = update.zenegy_sync_status {
                batch.zenegy_sync_status = Some(sync);
            }
            if let Some(at) = update.sent_to_zenegy_at {
                batch.sent_to_zenegy_at = Some(at);
            }
            if let Some(number) = &update.batch_number {
                batch.batch_number = number.clone();
            }
            batch.clone()
        })
    }
}

/// Zenegy stand-in replaying scripted answers.
///
/// When built with [`ScriptedZenegy::observing`] it snapshots the stored
/// batch at the moment each sync request arrives.
#[derive(Default, Clone)]
pub struct ScriptedZenegy {
    sync_results: Arc<Mutex<VecDeque<DomainResult<ZenegySyncResult>>>>,
    statuses: Arc<Mutex<VecDeque<ZenegySyncStatus>>>,
    observed: Arc<Mutex<Vec<PayrollBatch>>>,
    gateway: Option<InMemoryBatchGateway>,
    log: CallLog,
}

impl ScriptedZenegy {
    pub fn observing(gateway: &InMemoryBatchGateway) -> Self {
        Self { log: gateway.log().clone(), gateway: Some(gateway.clone()), ..Self::default() }
    }

    pub fn with_success(self) -> Self {
        self.with_result(Ok(ZenegySyncResult {
            success: true,
            zenegy_batch_id: Some("ZEN-2024-07".to_string()),
            synced_at: Some(Utc.with_ymd_and_hms(2024, 7, 3, 10, 0, 0).unwrap()),
            error_message: None,
            sync_details: None,
        }))
    }

    pub fn with_failure(self, message: &str) -> Self {
        self.with_result(Ok(ZenegySyncResult {
            success: false,
            zenegy_batch_id: None,
            synced_at: None,
            error_message: Some(message.to_string()),
            sync_details: None,
        }))
    }

    pub fn with_result(self, result: DomainResult<ZenegySyncResult>) -> Self {
        self.sync_results.lock().unwrap().push_back(result);
        self
    }

    pub fn with_status(self, status: ZenegySyncStatus) -> Self {
        self.statuses.lock().unwrap().push_back(status);
        self
    }

    /// Stored batches as seen by each sync request, in call order
    pub fn observed(&self) -> Vec<PayrollBatch> {
        self.observed.lock().unwrap().clone()
    }
}

#[async_trait]
impl ZenegySync for ScriptedZenegy {
    async fn sync_to_zenegy(&self, id: BatchId) -> DomainResult<ZenegySyncResult> {
        self.log.record(format!("sync:{id}"));
        if let Some(batch) = self.gateway.as_ref().and_then(|g| g.stored(id)) {
            self.observed.lock().unwrap().push(batch);
        }
        self.sync_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(PayrollError::Internal("no scripted sync result".to_string())))
    }

    async fn fetch_zenegy_status(&self, id: BatchId) -> DomainResult<ZenegySyncStatus> {
        self.log.record(format!("fetch_status:{id}"));
        Ok(self.statuses.lock().unwrap().pop_front().unwrap_or(ZenegySyncStatus::Syncing))
    }
}

/// Clock moved by hand
#[derive(Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn starting_at(now: DateTime<Utc>) -> Self {
        Self { now: Arc::new(Mutex::new(now)) }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}
