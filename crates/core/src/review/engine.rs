//! Bulk reviewer actions with per-entry success/failure reporting

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use cranepay_domain::{
    BulkConfig, BulkDispatchMode, BulkOperationResult, FailureReason, PayrollError, Result,
    WorkEntryAction, WorkEntryId,
};
use futures::stream::{self, StreamExt};
use tracing::{debug, info, instrument, warn};

use super::confirmation::{ConfirmationToken, PendingConfirmation};
use super::ports::WorkEntryActions;
use super::session::ReviewSession;

type Outcome = std::result::Result<(), FailureReason>;

/// Applies approve / reject / request-changes to many review entries.
///
/// A review entry aggregates several raw entries; it succeeds only when every
/// raw entry behind it succeeds. Raw entries that went through are dropped
/// from a partly applied review entry, so a retry only sends the rest.
/// Entries that are already approved or rejected fail locally with
/// `AlreadyFinalized` and are never sent. There is no all-or-nothing
/// transaction and no cancellation: the result is returned once every id has
/// settled.
pub struct BulkActionEngine {
    actions: Arc<dyn WorkEntryActions>,
    dispatch: BulkDispatchMode,
    max_parallel: usize,
    call_timeout: Duration,
}

impl BulkActionEngine {
    /// Create an engine with default bulk settings
    pub fn new(actions: Arc<dyn WorkEntryActions>) -> Self {
        Self::from_config(actions, &BulkConfig::default())
    }

    /// Engine using the dispatch mode, parallelism and timeout in `config`
    pub fn from_config(actions: Arc<dyn WorkEntryActions>, config: &BulkConfig) -> Self {
        Self {
            actions,
            dispatch: config.dispatch,
            max_parallel: config.max_parallel.max(1),
            call_timeout: Duration::from_secs(config.call_timeout_secs),
        }
    }

    /// One bulk request or one call per raw entry
    pub fn with_dispatch(mut self, dispatch: BulkDispatchMode) -> Self {
        self.dispatch = dispatch;
        self
    }

    /// Per-entry calls in flight at once; at least 1
    pub fn with_max_parallel(mut self, max_parallel: usize) -> Self {
        self.max_parallel = max_parallel.max(1);
        self
    }

    /// Deadline for the bulk request, or for each per-entry call
    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    /// First step: describe the action so the reviewer can confirm it.
    pub fn request_confirmation(
        &self,
        action: WorkEntryAction,
        ids: impl IntoIterator<Item = WorkEntryId>,
    ) -> PendingConfirmation {
        PendingConfirmation::new(action, ids)
    }

    /// [`Self::request_confirmation`] for the session's current selection
    pub fn confirm_selection(&self, action: WorkEntryAction, session: &ReviewSession) -> PendingConfirmation {
        self.request_confirmation(action, session.selection().iter().copied())
    }

    /// Second step: run a confirmed action and record the result in `session`.
    ///
    /// Returns `Err` only when a batched request produced no response at
    /// all; everything else is reported per id in the result.
    #[instrument(skip(self, token, session, notes), fields(action = %token.action(), nonce = %token.nonce()))]
    pub async fn execute(
        &self,
        token: ConfirmationToken,
        session: &mut ReviewSession,
        notes: Option<&str>,
    ) -> Result<BulkOperationResult> {
        let action = token.action();
        let mut outcomes: Vec<(WorkEntryId, Outcome)> = Vec::with_capacity(token.ids().len());
        let mut dispatch: BTreeMap<WorkEntryId, Vec<WorkEntryId>> = BTreeMap::new();

        for &id in token.ids() {
            match session.entry(id) {
                None => outcomes.push((id, Err(FailureReason::NotFound))),
                Some(entry) if entry.is_finalized() => {
                    debug!(entry_id = id, status = %entry.status, "Skipping finalized entry");
                    outcomes.push((id, Err(FailureReason::AlreadyFinalized)));
                }
                Some(entry) if entry.entry_ids.is_empty() => {
                    dispatch.insert(id, vec![entry.id]);
                }
                Some(entry) => {
                    let mut raw = entry.entry_ids.clone();
                    raw.sort_unstable();
                    raw.dedup();
                    dispatch.insert(id, raw);
                }
            }
        }

        if !dispatch.is_empty() {
            let mut raw_ids: Vec<WorkEntryId> = dispatch.values().flatten().copied().collect();
            raw_ids.sort_unstable();
            raw_ids.dedup();

            let raw_outcomes = match self.dispatch {
                BulkDispatchMode::Batched => self.dispatch_batched(&raw_ids, action, notes).await?,
                BulkDispatchMode::PerEntry => self.dispatch_per_entry(&raw_ids, action, notes).await,
            };

            for (&id, raw) in &dispatch {
                let settled: Vec<(WorkEntryId, Outcome)> = raw
                    .iter()
                    .map(|&raw_id| {
                        let outcome = raw_outcomes.get(&raw_id).cloned().unwrap_or_else(|| {
                            Err(FailureReason::Server(format!("No result reported for entry {raw_id}")))
                        });
                        (raw_id, outcome)
                    })
                    .collect();

                let applied: Vec<WorkEntryId> =
                    settled.iter().filter(|(_, outcome)| outcome.is_ok()).map(|(raw_id, _)| *raw_id).collect();
                let outcome = combine(settled.into_iter().map(|(_, outcome)| outcome));

                if outcome.is_err() && !applied.is_empty() {
                    debug!(entry_id = id, applied = applied.len(), "Grouped entry partly applied");
                    session.mark_applied(id, &applied);
                }
                outcomes.push((id, outcome));
            }
        }

        let result = BulkOperationResult::from_outcomes(outcomes);
        session.apply_result(action, &result);

        info!(
            requested = result.total_requested,
            successful = result.successful.len(),
            failed = result.failed.len(),
            success_rate = result.success_rate(),
            "Bulk action settled"
        );
        Ok(result)
    }

    /// One request for every raw id, bounded by the call timeout
    async fn dispatch_batched(
        &self,
        raw_ids: &[WorkEntryId],
        action: WorkEntryAction,
        notes: Option<&str>,
    ) -> Result<HashMap<WorkEntryId, Outcome>> {
        let response =
            match tokio::time::timeout(self.call_timeout, self.actions.bulk_apply(raw_ids, action, notes)).await {
                Ok(response) => response?,
                Err(_) => {
                    warn!(entries = raw_ids.len(), timeout = ?self.call_timeout, "Bulk request timed out");
                    return Ok(raw_ids.iter().map(|&id| (id, Err(FailureReason::Timeout))).collect());
                }
            };

        let mut raw_outcomes: HashMap<WorkEntryId, Outcome> =
            response.failed.into_iter().map(|f| (f.id, Err(f.reason))).collect();
        for id in response.successful {
            raw_outcomes.entry(id).or_insert(Ok(()));
        }
        Ok(raw_outcomes)
    }

    /// One call per raw id, at most `max_parallel` in flight
    async fn dispatch_per_entry(
        &self,
        raw_ids: &[WorkEntryId],
        action: WorkEntryAction,
        notes: Option<&str>,
    ) -> HashMap<WorkEntryId, Outcome> {
        stream::iter(raw_ids.iter().copied())
            .map(|raw_id| async move {
                let outcome =
                    match tokio::time::timeout(self.call_timeout, self.actions.apply(raw_id, action, notes)).await {
                        Ok(Ok(())) => Ok(()),
                        Ok(Err(err)) => Err(failure_reason(&err)),
                        Err(_) => Err(FailureReason::Timeout),
                    };
                (raw_id, outcome)
            })
            .buffer_unordered(self.max_parallel)
            .collect()
            .await
    }
}

/// All raw outcomes must succeed; the first failure (by raw id) wins.
fn combine(outcomes: impl IntoIterator<Item = Outcome>) -> Outcome {
    outcomes.into_iter().collect::<std::result::Result<Vec<()>, _>>().map(|_| ())
}

/// Per-id failure reason for an error returned by a single-entry call
pub fn failure_reason(err: &PayrollError) -> FailureReason {
    match err {
        PayrollError::AlreadyFinalized(_) => FailureReason::AlreadyFinalized,
        PayrollError::NotFound(_) | PayrollError::Server { code: 404, .. } => FailureReason::NotFound,
        PayrollError::Server { message, .. } => FailureReason::Server(message.clone()),
        PayrollError::Network(message)
        | PayrollError::InvalidUrl(message)
        | PayrollError::InvalidResponse(message)
        | PayrollError::Decoding(message) => FailureReason::Transport(message.clone()),
        other => FailureReason::Server(other.to_string()),
    }
}
