//! Pure payroll batch state machine
//!
//! ```text
//! draft ──submit──▶ ready_for_approval ──approve──▶ approved ──send──▶ sent_to_zenegy
//!   │                      │                                           │        ▲
//!   └──cancel──▶ cancelled ◀──cancel                       sync ok ◀───┤        │ retry
//!                                                        completed    sync fail ▼
//!                                                                          failed
//! ```
//!
//! Every function here is side-effect free: it either returns the batch as it
//! looks after the event or an `InvalidTransition` error, and never touches
//! the input.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use cranepay_domain::{
    BatchNumber, BatchTotals, NewBatch, PayrollBatch, PayrollBatchStatus, PayrollError,
    PayrollPeriod, Result, WorkEntryForReview, WorkEntryReviewStatus, ZenegySyncStatus,
};

/// Lifecycle events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatchEvent {
    /// `draft → ready_for_approval`
    Submit,
    /// `ready_for_approval → approved`
    Approve,
    /// First hand-off to Zenegy
    SendToZenegy,
    /// Zenegy accepted the batch
    SyncSucceeded,
    /// Zenegy rejected the batch
    SyncFailed,
    /// Resend a failed batch unchanged
    Retry,
    /// Abandon a batch before approval
    Cancel,
}

cranepay_domain::impl_domain_status_conversions!(BatchEvent {
    Submit => "submit",
    Approve => "approve",
    SendToZenegy => "send_to_zenegy",
    SyncSucceeded => "sync_succeeded",
    SyncFailed => "sync_failed",
    Retry => "retry",
    Cancel => "cancel",
});

/// Target state for `event` from `from`, if the transition table lists it
pub fn next_status(from: PayrollBatchStatus, event: BatchEvent) -> Option<PayrollBatchStatus> {
    use PayrollBatchStatus as S;

    match (from, event) {
        (S::Draft, BatchEvent::Submit) => Some(S::ReadyForApproval),
        (S::ReadyForApproval, BatchEvent::Approve) => Some(S::Approved),
        (S::Approved, BatchEvent::SendToZenegy) | (S::Failed, BatchEvent::Retry) => {
            Some(S::SentToZenegy)
        }
        (S::SentToZenegy, BatchEvent::SyncSucceeded) => Some(S::Completed),
        (S::SentToZenegy, BatchEvent::SyncFailed) => Some(S::Failed),
        (S::Draft | S::ReadyForApproval, BatchEvent::Cancel) => Some(S::Cancelled),
        _ => None,
    }
}

/// Check the event's guard without applying it.
pub fn ensure_allowed(batch: &PayrollBatch, event: BatchEvent) -> Result<PayrollBatchStatus> {
    let to = next_status(batch.status, event)
        .ok_or_else(|| PayrollError::invalid_transition(batch.status, event))?;

    match event {
        BatchEvent::Submit => {
            BatchNumber::parse(batch.batch_number.as_str())?;
        }
        BatchEvent::SendToZenegy if !batch.can_be_sent_to_zenegy() => {
            return Err(PayrollError::invalid_transition(
                format!("{} (sync {})", batch.status, sync_label(batch)),
                event,
            ));
        }
        _ => {}
    }
    Ok(to)
}

/// Apply `event` at `now`, returning the updated batch.
///
/// Entering `sent_to_zenegy` (first send or retry) stamps
/// `sent_to_zenegy_at = now` and marks the sync as `syncing`.
pub fn transition(batch: &PayrollBatch, event: BatchEvent, now: DateTime<Utc>) -> Result<PayrollBatch> {
    let to = ensure_allowed(batch, event)?;
    let mut next = batch.clone();
    next.status = to;

    match event {
        BatchEvent::Approve => next.approved_at = Some(now),
        BatchEvent::SendToZenegy | BatchEvent::Retry => {
            next.sent_to_zenegy_at = Some(now);
            next.zenegy_sync_status = Some(ZenegySyncStatus::Syncing);
        }
        BatchEvent::SyncSucceeded => next.zenegy_sync_status = Some(ZenegySyncStatus::Completed),
        BatchEvent::SyncFailed => next.zenegy_sync_status = Some(ZenegySyncStatus::Failed),
        BatchEvent::Submit | BatchEvent::Cancel => {}
    }
    Ok(next)
}

/// Apply a polled sync status to a batch that is waiting on Zenegy.
///
/// Returns `Ok(None)` when the status is still unresolved.
pub fn apply_sync_status(
    batch: &PayrollBatch,
    status: ZenegySyncStatus,
    now: DateTime<Utc>,
) -> Result<Option<PayrollBatch>> {
    let event = match status {
        ZenegySyncStatus::Completed => BatchEvent::SyncSucceeded,
        ZenegySyncStatus::Failed => BatchEvent::SyncFailed,
        ZenegySyncStatus::NotStarted | ZenegySyncStatus::Syncing => return Ok(None),
    };
    transition(batch, event, now).map(Some)
}

/// Replace the batch number. Only drafts can be renumbered.
pub fn regenerate_batch_number(batch: &PayrollBatch, number: BatchNumber) -> Result<PayrollBatch> {
    if batch.status != PayrollBatchStatus::Draft {
        return Err(PayrollError::invalid_transition(batch.status, "regenerate_batch_number"));
    }
    let mut next = batch.clone();
    next.batch_number = number;
    Ok(next)
}

/// Validate the creation guard and build the create request.
///
/// Every entry must be `approved` and lie inside `period`. Raw entry ids are
/// flattened and de-duplicated; the batch number defaults to the period's
/// canonical number.
pub fn prepare_new_batch(
    period: &PayrollPeriod,
    entries: &[WorkEntryForReview],
    notes: Option<String>,
    batch_number: Option<BatchNumber>,
    is_draft: bool,
) -> Result<NewBatch> {
    if entries.is_empty() {
        return Err(PayrollError::InvalidInput(
            "A payroll batch needs at least one approved work entry".to_string(),
        ));
    }

    if let Some(entry) = entries.iter().find(|e| e.status != WorkEntryReviewStatus::Approved) {
        return Err(PayrollError::InvalidInput(format!(
            "Work entry {} is {} and cannot be added to a batch",
            entry.id, entry.status
        )));
    }

    if let Some(entry) = entries.iter().find(|e| {
        !period.contains(e.period_coverage.start) || !period.contains(e.period_coverage.end)
    }) {
        return Err(PayrollError::InvalidInput(format!(
            "Work entry {} is outside {}",
            entry.id,
            period.display_name()
        )));
    }

    let work_entry_ids: BTreeSet<_> = entries.iter().flat_map(|e| e.entry_ids.iter().copied()).collect();

    Ok(NewBatch {
        period_start: period.start_date,
        period_end: period.end_date,
        work_entry_ids: work_entry_ids.into_iter().collect(),
        notes,
        batch_number: Some(batch_number.unwrap_or_else(|| period.batch_number())),
        is_draft,
        totals: BatchTotals::from_entries(entries),
    })
}

fn sync_label(batch: &PayrollBatch) -> &'static str {
    batch.zenegy_sync_status.map_or("none", |s| s.as_str())
}
