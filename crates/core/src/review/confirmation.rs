//! Two-step confirmation for bulk reviewer actions
//!
//! [`BulkActionEngine::execute`](super::engine::BulkActionEngine::execute)
//! only accepts a [`ConfirmationToken`], and the only way to obtain one is
//! [`PendingConfirmation::confirm`]. The token is consumed by `execute` and
//! is bound to the action and ids that were shown to the reviewer.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use cranepay_domain::{WorkEntryAction, WorkEntryId};
use uuid::Uuid;

/// A bulk action waiting for the reviewer's answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingConfirmation {
    action: WorkEntryAction,
    ids: Vec<WorkEntryId>,
    title: String,
    message: String,
}

impl PendingConfirmation {
    pub(crate) fn new(action: WorkEntryAction, ids: impl IntoIterator<Item = WorkEntryId>) -> Self {
        let ids: Vec<_> = ids.into_iter().collect::<BTreeSet<_>>().into_iter().collect();
        let (title, message) = prompt(action, ids.len());
        Self { action, ids, title, message }
    }

    /// Action awaiting confirmation
    pub fn action(&self) -> WorkEntryAction {
        self.action
    }

    /// Ids the action will target, ascending and unique
    pub fn ids(&self) -> &[WorkEntryId] {
        &self.ids
    }

    /// Dialog title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Prompt to show the reviewer
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Reject cannot be undone
    pub fn is_irreversible(&self) -> bool {
        self.action.is_irreversible()
    }

    /// The reviewer said yes.
    pub fn confirm(self) -> ConfirmationToken {
        ConfirmationToken {
            action: self.action,
            ids: self.ids,
            nonce: Uuid::new_v4(),
            confirmed_at: Utc::now(),
        }
    }
}

/// Proof that the reviewer confirmed one specific bulk action
#[derive(Debug, PartialEq, Eq)]
pub struct ConfirmationToken {
    action: WorkEntryAction,
    ids: Vec<WorkEntryId>,
    nonce: Uuid,
    confirmed_at: DateTime<Utc>,
}

impl ConfirmationToken {
    /// Confirmed action
    pub fn action(&self) -> WorkEntryAction {
        self.action
    }

    /// Confirmed ids, ascending and unique
    pub fn ids(&self) -> &[WorkEntryId] {
        &self.ids
    }

    /// Unique per confirmation, for log correlation
    pub fn nonce(&self) -> Uuid {
        self.nonce
    }

    /// When the reviewer confirmed
    pub fn confirmed_at(&self) -> DateTime<Utc> {
        self.confirmed_at
    }
}

fn prompt(action: WorkEntryAction, count: usize) -> (String, String) {
    let single = count == 1;
    match action {
        WorkEntryAction::Approve => (
            "Approve Hours".to_string(),
            if single {
                "Are you sure you want to approve this work entry?".to_string()
            } else {
                format!("Are you sure you want to approve {count} work entries?")
            },
        ),
        WorkEntryAction::Reject => (
            "Reject Hours".to_string(),
            if single {
                "Are you sure you want to reject this work entry? This action cannot be undone."
                    .to_string()
            } else {
                format!(
                    "Are you sure you want to reject {count} work entries? This action cannot be undone."
                )
            },
        ),
        WorkEntryAction::RequestChanges => (
            "Request Changes".to_string(),
            format!("Request changes for {count} work entries? Employees will be notified."),
        ),
    }
}
