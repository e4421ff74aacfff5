//! Reviewer-side state: the review queue and the active selection

use std::collections::{BTreeMap, BTreeSet};

use cranepay_domain::{
    BulkOperationResult, PayrollPeriod, WorkEntryAction, WorkEntryForReview, WorkEntryId,
    WorkEntryReviewStatus,
};
use rust_decimal::Decimal;

/// Message to show after a bulk action settles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkNotice {
    pub title: String,
    pub message: String,
}

impl BulkNotice {
    /// Title and message summarising `result`
    pub fn for_result(action: WorkEntryAction, result: &BulkOperationResult) -> Self {
        let past = action.past_tense();
        if result.is_fully_successful() {
            Self {
                title: "Success".to_string(),
                message: format!("Successfully {past} {} work entries", result.successful.len()),
            }
        } else if !result.successful.is_empty() {
            Self {
                title: "Partial Success".to_string(),
                message: format!(
                    "{}. {} failed.",
                    capitalize(&result.summary(past)),
                    result.failed.len()
                ),
            }
        } else {
            Self {
                title: "Action Failed".to_string(),
                message: format!("Unable to {action} any work entries. Please try again."),
            }
        }
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    chars.next().map_or_else(String::new, |first| first.to_uppercase().chain(chars).collect())
}

/// Work entries under review for one period plus the reviewer's selection.
///
/// Owned by a single reviewer; bulk actions borrow it mutably for their
/// whole duration.
#[derive(Debug, Clone)]
pub struct ReviewSession {
    period: PayrollPeriod,
    entries: BTreeMap<WorkEntryId, WorkEntryForReview>,
    selection: BTreeSet<WorkEntryId>,
}

impl ReviewSession {
    /// Session over `entries` with nothing selected
    pub fn new(period: PayrollPeriod, entries: Vec<WorkEntryForReview>) -> Self {
        Self {
            period,
            entries: entries.into_iter().map(|entry| (entry.id, entry)).collect(),
            selection: BTreeSet::new(),
        }
    }

    /// Period under review
    pub fn period(&self) -> &PayrollPeriod {
        &self.period
    }

    /// Entry by review id
    pub fn entry(&self, id: WorkEntryId) -> Option<&WorkEntryForReview> {
        self.entries.get(&id)
    }

    /// Entries ordered by id
    pub fn entries(&self) -> impl Iterator<Item = &WorkEntryForReview> {
        self.entries.values()
    }

    /// Entries still open for review (not approved or rejected)
    pub fn pending_entries(&self) -> Vec<&WorkEntryForReview> {
        self.entries.values().filter(|e| !e.is_finalized()).collect()
    }

    /// Approved entries, ready to go into a batch
    pub fn approved_entries(&self) -> Vec<WorkEntryForReview> {
        self.entries
            .values()
            .filter(|e| e.status == WorkEntryReviewStatus::Approved)
            .cloned()
            .collect()
    }

    /// Add `id` to the selection. Unknown ids are ignored.
    pub fn select(&mut self, id: WorkEntryId) -> bool {
        self.entries.contains_key(&id) && self.selection.insert(id)
    }

    /// Drop `id` from the selection; false if it was not selected
    pub fn deselect(&mut self, id: WorkEntryId) -> bool {
        self.selection.remove(&id)
    }

    /// Select every entry still open for review.
    pub fn select_all(&mut self) {
        self.selection = self.entries.values().filter(|e| !e.is_finalized()).map(|e| e.id).collect();
    }

    /// Deselect everything
    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Selected review ids, ascending
    pub fn selection(&self) -> &BTreeSet<WorkEntryId> {
        &self.selection
    }

    /// Whether a bulk action has anything to target
    pub fn has_selection(&self) -> bool {
        !self.selection.is_empty()
    }

    /// (hours, amount) over the selected entries
    pub fn selected_totals(&self) -> (Decimal, Decimal) {
        self.selection
            .iter()
            .filter_map(|id| self.entries.get(id))
            .fold((Decimal::ZERO, Decimal::ZERO), |(hours, amount), e| {
                (hours + e.total_hours, amount + e.total_amount)
            })
    }

    /// Forget raw entries of `id` that the backend already applied.
    ///
    /// Used when a grouped entry only partly went through; the entry stays
    /// open and keeps the raw ids still outstanding.
    pub fn mark_applied(&mut self, id: WorkEntryId, applied: &[WorkEntryId]) {
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.entry_ids.retain(|raw_id| !applied.contains(raw_id));
        }
    }

    /// Record a settled bulk result.
    ///
    /// Successful entries take the action's target status; failed entries
    /// are left untouched. The selection keeps only ids that failed, so a
    /// retry targets exactly the remainder.
    pub fn apply_result(&mut self, action: WorkEntryAction, result: &BulkOperationResult) -> BulkNotice {
        let target = action.target_status();
        for id in &result.successful {
            if let Some(entry) = self.entries.get_mut(id) {
                entry.status = target;
            }
        }

        let failed = result.failed_ids();
        self.selection.retain(|id| failed.contains(id));

        BulkNotice::for_result(action, result)
    }
}
