//! Zenegy payroll-provider sync types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// External-sync sub-state of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZenegySyncStatus {
    /// The backend reports this as `pending`
    #[serde(alias = "pending")]
    NotStarted,
    Syncing,
    Completed,
    Failed,
}

crate::impl_domain_status_conversions!(ZenegySyncStatus {
    NotStarted => "not_started",
    Syncing => "syncing",
    Completed => "completed",
    Failed => "failed",
});

impl ZenegySyncStatus {
    /// `Syncing` is unresolved until a status poll says otherwise.
    pub const fn is_resolved(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Statistics reported by a successful sync
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZenegySyncDetails {
    pub employees_synced: u32,
    pub total_amount: Decimal,
    pub processing_time_ms: u64,
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// Outcome of one sync request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZenegySyncResult {
    pub success: bool,
    #[serde(default)]
    pub zenegy_batch_id: Option<String>,
    #[serde(default)]
    pub synced_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub sync_details: Option<ZenegySyncDetails>,
}

impl ZenegySyncResult {
    pub fn outcome(&self) -> ZenegySyncStatus {
        if self.success {
            ZenegySyncStatus::Completed
        } else {
            ZenegySyncStatus::Failed
        }
    }

    /// Error text for a failed sync, with a generic fallback
    pub fn failure_message(&self) -> Option<String> {
        if self.success {
            return None;
        }
        Some(
            self.error_message
                .clone()
                .unwrap_or_else(|| "Zenegy sync failed without an error message".to_string()),
        )
    }
}
