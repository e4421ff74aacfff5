//! Bulk work-entry action results

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::work_entry::WorkEntryId;

/// Why a single id in a bulk action was not processed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail")]
pub enum FailureReason {
    /// Entry was already approved or rejected; no request was sent for it
    AlreadyFinalized,
    /// Id is not part of the review set or unknown to the backend
    NotFound,
    /// Backend refused the entry with a message
    Server(String),
    /// Request for the entry never got a response
    Transport(String),
    /// Per-call deadline elapsed
    Timeout,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyFinalized => f.write_str("AlreadyFinalized"),
            Self::NotFound => f.write_str("NotFound"),
            Self::Server(message) => write!(f, "Server: {message}"),
            Self::Transport(message) => write!(f, "Transport: {message}"),
            Self::Timeout => f.write_str("Timeout"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedOperation {
    pub id: WorkEntryId,
    pub reason: FailureReason,
}

/// Outcome of one bulk call. Every requested id is in exactly one list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkOperationResult {
    pub total_requested: usize,
    pub successful: Vec<WorkEntryId>,
    pub failed: Vec<FailedOperation>,
}

impl BulkOperationResult {
    /// Build a result from settled outcomes, ordered by id.
    pub fn from_outcomes<I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = (WorkEntryId, Result<(), FailureReason>)>,
    {
        let mut successful = Vec::new();
        let mut failed = Vec::new();
        for (id, outcome) in outcomes {
            match outcome {
                Ok(()) => successful.push(id),
                Err(reason) => failed.push(FailedOperation { id, reason }),
            }
        }
        successful.sort_unstable();
        failed.sort_by_key(|f| f.id);
        Self { total_requested: successful.len() + failed.len(), successful, failed }
    }

    /// `|successful| / total_requested`, 0 for an empty request
    pub fn success_rate(&self) -> f64 {
        if self.total_requested == 0 {
            return 0.0;
        }
        self.successful.len() as f64 / self.total_requested as f64
    }

    pub fn is_fully_successful(&self) -> bool {
        self.failed.is_empty() && self.total_requested > 0
    }

    pub fn failed_ids(&self) -> BTreeSet<WorkEntryId> {
        self.failed.iter().map(|f| f.id).collect()
    }

    pub fn reason_for(&self, id: WorkEntryId) -> Option<&FailureReason> {
        self.failed.iter().find(|f| f.id == id).map(|f| &f.reason)
    }

    /// Summary line for the reviewer, e.g. `"2 of 3 entries approved"`
    pub fn summary(&self, past_tense: &str) -> String {
        format!("{} of {} entries {past_tense}", self.successful.len(), self.total_requested)
    }
}
