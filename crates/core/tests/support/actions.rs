//! In-memory mocks for the work-entry review ports

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use cranepay_core::{WorkEntryActions, WorkEntrySource};
use cranepay_domain::{
    BulkOperationResult, FailureReason, PayrollError, PayrollPeriod, RawWorkEntry,
    Result as DomainResult, WorkEntryAction, WorkEntryId, WorkEntryReviewStatus,
};

/// Review backend tracking the status of each raw entry.
///
/// Raw entries that are already approved or rejected are refused, ids listed
/// with [`Self::with_refusal`] fail with a server message, and delayed ids
/// sleep before answering.
#[derive(Default, Clone)]
pub struct InMemoryWorkEntryActions {
    statuses: Arc<Mutex<BTreeMap<WorkEntryId, WorkEntryReviewStatus>>>,
    refusals: Arc<Mutex<HashMap<WorkEntryId, String>>>,
    unreachable: Arc<HashSet<WorkEntryId>>,
    omitted: Arc<HashSet<WorkEntryId>>,
    delays: Arc<HashMap<WorkEntryId, Duration>>,
    bulk_delay: Option<Duration>,
    bulk_unreachable: bool,
    received: Arc<Mutex<Vec<WorkEntryId>>>,
    bulk_calls: Arc<AtomicUsize>,
    single_calls: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl InMemoryWorkEntryActions {
    /// Seed raw entries with their current review status.
    pub fn new(statuses: impl IntoIterator<Item = (WorkEntryId, WorkEntryReviewStatus)>) -> Self {
        Self { statuses: Arc::new(Mutex::new(statuses.into_iter().collect())), ..Self::default() }
    }

    /// Every id in `ids` starts out pending.
    pub fn pending(ids: impl IntoIterator<Item = WorkEntryId>) -> Self {
        Self::new(ids.into_iter().map(|id| (id, WorkEntryReviewStatus::Pending)))
    }

    pub fn with_refusal(self, id: WorkEntryId, message: &str) -> Self {
        self.refusals.lock().unwrap().insert(id, message.to_string());
        self
    }

    /// Stop refusing `id`, as if the blocker was cleared.
    pub fn lift_refusal(&self, id: WorkEntryId) {
        self.refusals.lock().unwrap().remove(&id);
    }

    /// Single calls for `id` fail without reaching the backend.
    pub fn with_unreachable(mut self, id: WorkEntryId) -> Self {
        Arc::make_mut(&mut self.unreachable).insert(id);
        self
    }

    /// Bulk responses silently leave `id` out.
    pub fn with_omitted(mut self, id: WorkEntryId) -> Self {
        Arc::make_mut(&mut self.omitted).insert(id);
        self
    }

    pub fn with_delay(mut self, id: WorkEntryId, delay: Duration) -> Self {
        Arc::make_mut(&mut self.delays).insert(id, delay);
        self
    }

    pub fn with_bulk_delay(mut self, delay: Duration) -> Self {
        self.bulk_delay = Some(delay);
        self
    }

    /// Bulk requests fail without any response.
    pub fn with_bulk_unreachable(mut self) -> Self {
        self.bulk_unreachable = true;
        self
    }

    pub fn status(&self, id: WorkEntryId) -> Option<WorkEntryReviewStatus> {
        self.statuses.lock().unwrap().get(&id).copied()
    }

    /// Raw ids that reached the backend, in arrival order
    pub fn received(&self) -> Vec<WorkEntryId> {
        self.received.lock().unwrap().clone()
    }

    pub fn bulk_calls(&self) -> usize {
        self.bulk_calls.load(Ordering::SeqCst)
    }

    pub fn single_calls(&self) -> usize {
        self.single_calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn settle(&self, id: WorkEntryId, action: WorkEntryAction) -> Result<(), FailureReason> {
        self.received.lock().unwrap().push(id);
        if let Some(message) = self.refusals.lock().unwrap().get(&id) {
            return Err(FailureReason::Server(message.clone()));
        }

        let mut statuses = self.statuses.lock().unwrap();
        let status = statuses.get_mut(&id).ok_or(FailureReason::NotFound)?;
        if status.is_terminal() {
            return Err(FailureReason::AlreadyFinalized);
        }
        *status = action.target_status();
        Ok(())
    }
}

#[async_trait]
impl WorkEntryActions for InMemoryWorkEntryActions {
    async fn bulk_apply(
        &self,
        ids: &[WorkEntryId],
        action: WorkEntryAction,
        _notes: Option<&str>,
    ) -> DomainResult<BulkOperationResult> {
        self.bulk_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.bulk_delay {
            tokio::time::sleep(delay).await;
        }
        if self.bulk_unreachable {
            return Err(PayrollError::Network("connection refused".to_string()));
        }

        let outcomes: Vec<_> = ids
            .iter()
            .filter(|id| !self.omitted.contains(id))
            .map(|&id| (id, self.settle(id, action)))
            .collect();
        Ok(BulkOperationResult::from_outcomes(outcomes))
    }

    async fn apply(&self, id: WorkEntryId, action: WorkEntryAction, _notes: Option<&str>) -> DomainResult<()> {
        self.single_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = self.delays.get(&id).copied().unwrap_or(Duration::from_millis(5));
        tokio::time::sleep(delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.unreachable.contains(&id) {
            return Err(PayrollError::Network("connection reset".to_string()));
        }
        self.settle(id, action).map_err(|reason| match reason {
            FailureReason::NotFound => PayrollError::Server { code: 404, message: "Work entry not found".to_string() },
            FailureReason::AlreadyFinalized => PayrollError::AlreadyFinalized(id),
            FailureReason::Server(message) => PayrollError::Server { code: 422, message },
            other => PayrollError::Internal(other.to_string()),
        })
    }
}

/// Source returning a fixed set of supervisor-approved raw entries
#[derive(Default, Clone)]
pub struct StaticWorkEntrySource {
    entries: Arc<Vec<RawWorkEntry>>,
}

impl StaticWorkEntrySource {
    pub fn new(entries: Vec<RawWorkEntry>) -> Self {
        Self { entries: Arc::new(entries) }
    }
}

#[async_trait]
impl WorkEntrySource for StaticWorkEntrySource {
    async fn fetch_approved_entries(&self, period: &PayrollPeriod) -> DomainResult<Vec<RawWorkEntry>> {
        Ok(self.entries.iter().filter(|e| period.contains(e.date)).cloned().collect())
    }
}
