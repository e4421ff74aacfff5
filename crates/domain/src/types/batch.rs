//! Payroll batch types

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::serde_helpers::flexible_date;
use super::work_entry::{UserId, WorkEntryForReview, WorkEntryId};
use super::zenegy::ZenegySyncStatus;
use crate::constants::MAX_PERIODS_PER_YEAR;
use crate::errors::PayrollError;

pub type BatchId = i64;

/// Lifecycle state of a payroll batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayrollBatchStatus {
    Draft,
    ReadyForApproval,
    Approved,
    SentToZenegy,
    Completed,
    Failed,
    Cancelled,
}

crate::impl_domain_status_conversions!(PayrollBatchStatus {
    Draft => "draft",
    ReadyForApproval => "ready_for_approval",
    Approved => "approved",
    SentToZenegy => "sent_to_zenegy",
    Completed => "completed",
    Failed => "failed",
    Cancelled => "cancelled",
});

impl PayrollBatchStatus {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::ReadyForApproval => "Ready for Approval",
            Self::Approved => "Approved",
            Self::SentToZenegy => "Sent to Zenegy",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
            Self::Cancelled => "Cancelled",
        }
    }
}

/// Canonical `YYYY-PP` batch number
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BatchNumber(String);

impl BatchNumber {
    pub fn for_period(year: i32, period_number: u32) -> Self {
        Self(format!("{year:04}-{period_number:02}"))
    }

    /// Strict parse: four digit year, dash, two digit period in `01..=27`.
    pub fn parse(raw: &str) -> Result<Self, PayrollError> {
        let invalid = || {
            PayrollError::InvalidInput(format!(
                "Batch number '{raw}' must have the form YYYY-PP (e.g. 2024-07)"
            ))
        };

        let (year, period) = raw.split_once('-').ok_or_else(invalid)?;
        let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if year.len() != 4 || period.len() != 2 || !all_digits(year) || !all_digits(period) {
            return Err(invalid());
        }

        let period_number: u32 = period.parse().map_err(|_| invalid())?;
        if !(1..=MAX_PERIODS_PER_YEAR).contains(&period_number) {
            return Err(invalid());
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn year(&self) -> i32 {
        self.0.get(..4).and_then(|y| y.parse().ok()).unwrap_or_default()
    }

    pub fn period_number(&self) -> u32 {
        self.0.get(5..).and_then(|p| p.parse().ok()).unwrap_or_default()
    }
}

impl fmt::Display for BatchNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for BatchNumber {
    type Err = PayrollError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for BatchNumber {
    type Error = PayrollError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<BatchNumber> for String {
    fn from(value: BatchNumber) -> Self {
        value.0
    }
}

/// A named, immutable-membership collection of approved work hours
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollBatch {
    pub id: BatchId,
    pub batch_number: BatchNumber,
    #[serde(with = "flexible_date")]
    pub period_start: NaiveDate,
    #[serde(with = "flexible_date")]
    pub period_end: NaiveDate,
    pub year: i32,
    pub period_number: u32,
    pub total_employees: u32,
    pub total_hours: Decimal,
    pub total_amount: Decimal,
    pub status: PayrollBatchStatus,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub approved_by: Option<UserId>,
    #[serde(default)]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub sent_to_zenegy_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub zenegy_sync_status: Option<ZenegySyncStatus>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl PayrollBatch {
    pub fn can_be_approved(&self) -> bool {
        self.status == PayrollBatchStatus::ReadyForApproval
    }

    pub fn can_be_sent_to_zenegy(&self) -> bool {
        self.status == PayrollBatchStatus::Approved
            && matches!(
                self.zenegy_sync_status,
                None | Some(ZenegySyncStatus::NotStarted | ZenegySyncStatus::Failed)
            )
    }

    pub fn can_retry_sync(&self) -> bool {
        self.status == PayrollBatchStatus::Failed
    }

    pub fn can_be_cancelled(&self) -> bool {
        matches!(self.status, PayrollBatchStatus::Draft | PayrollBatchStatus::ReadyForApproval)
    }

    /// A sync was started and no outcome has been recorded yet.
    ///
    /// Any `sent_to_zenegy` batch counts, whatever its sync column says:
    /// only a status poll can move it on.
    pub fn is_sync_in_progress(&self) -> bool {
        self.status == PayrollBatchStatus::SentToZenegy
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Filter used by batch listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatusFilter {
    #[default]
    All,
    Draft,
    /// Waiting for approval
    Pending,
    /// Approved, including batches already handed to Zenegy
    Approved,
    Completed,
    Failed,
}

impl BatchStatusFilter {
    pub fn matches(self, status: PayrollBatchStatus) -> bool {
        match self {
            Self::All => true,
            Self::Draft => status == PayrollBatchStatus::Draft,
            Self::Pending => status == PayrollBatchStatus::ReadyForApproval,
            Self::Approved => {
                matches!(status, PayrollBatchStatus::Approved | PayrollBatchStatus::SentToZenegy)
            }
            Self::Completed => status == PayrollBatchStatus::Completed,
            Self::Failed => status == PayrollBatchStatus::Failed,
        }
    }

    /// `status` query parameter, when the filter maps to exactly one state
    pub fn query_value(self) -> Option<&'static str> {
        match self {
            Self::All | Self::Approved => None,
            Self::Draft => Some(PayrollBatchStatus::Draft.as_str()),
            Self::Pending => Some(PayrollBatchStatus::ReadyForApproval.as_str()),
            Self::Completed => Some(PayrollBatchStatus::Completed.as_str()),
            Self::Failed => Some(PayrollBatchStatus::Failed.as_str()),
        }
    }
}

/// Dashboard counters over a batch listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStats {
    pub total: usize,
    pub draft: usize,
    pub ready_for_approval: usize,
    pub approved: usize,
    pub sent_to_zenegy: usize,
    pub completed: usize,
    pub failed: usize,
    pub cancelled: usize,
    /// Sum over every batch that is not cancelled
    pub total_amount: Decimal,
    pub completed_amount: Decimal,
}

impl BatchStats {
    pub fn from_batches(batches: &[PayrollBatch]) -> Self {
        batches.iter().fold(Self::default(), |mut stats, batch| {
            stats.total += 1;
            match batch.status {
                PayrollBatchStatus::Draft => stats.draft += 1,
                PayrollBatchStatus::ReadyForApproval => stats.ready_for_approval += 1,
                PayrollBatchStatus::Approved => stats.approved += 1,
                PayrollBatchStatus::SentToZenegy => stats.sent_to_zenegy += 1,
                PayrollBatchStatus::Completed => {
                    stats.completed += 1;
                    stats.completed_amount += batch.total_amount;
                }
                PayrollBatchStatus::Failed => stats.failed += 1,
                PayrollBatchStatus::Cancelled => stats.cancelled += 1,
            }
            if batch.status != PayrollBatchStatus::Cancelled {
                stats.total_amount += batch.total_amount;
            }
            stats
        })
    }

    /// Batches still moving through the workflow
    pub fn active(&self) -> usize {
        self.draft + self.ready_for_approval + self.approved + self.sent_to_zenegy
    }
}

/// Headline totals of a batch, derived from its review aggregates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchTotals {
    pub total_employees: u32,
    pub total_hours: Decimal,
    pub total_amount: Decimal,
}

impl BatchTotals {
    pub fn from_entries(entries: &[WorkEntryForReview]) -> Self {
        let employees: BTreeSet<_> = entries.iter().map(|e| e.employee_id).collect();
        Self {
            total_employees: u32::try_from(employees.len()).unwrap_or(u32::MAX),
            total_hours: entries.iter().map(|e| e.total_hours).sum(),
            total_amount: entries.iter().map(|e| e.total_amount).sum(),
        }
    }

    pub fn matches(&self, batch: &PayrollBatch) -> bool {
        self.total_employees == batch.total_employees
            && self.total_hours == batch.total_hours
            && self.total_amount == batch.total_amount
    }
}

/// Request body for batch creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBatch {
    #[serde(with = "flexible_date")]
    pub period_start: NaiveDate,
    #[serde(with = "flexible_date")]
    pub period_end: NaiveDate,
    /// Raw work entry ids, ascending
    pub work_entry_ids: Vec<WorkEntryId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_number: Option<BatchNumber>,
    pub is_draft: bool,
    /// Totals computed locally, sent so the backend can cross-check
    #[serde(flatten)]
    pub totals: BatchTotals,
}

/// Partial update written by lifecycle transitions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PayrollBatchStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zenegy_sync_status: Option<ZenegySyncStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent_to_zenegy_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_number: Option<BatchNumber>,
}

impl BatchUpdate {
    /// Fields that changed between `before` and `after`
    pub fn between(before: &PayrollBatch, after: &PayrollBatch) -> Self {
        Self {
            status: (before.status != after.status).then_some(after.status),
            zenegy_sync_status: (before.zenegy_sync_status != after.zenegy_sync_status)
                .then_some(after.zenegy_sync_status)
                .flatten(),
            sent_to_zenegy_at: (before.sent_to_zenegy_at != after.sent_to_zenegy_at)
                .then_some(after.sent_to_zenegy_at)
                .flatten(),
            batch_number: (before.batch_number != after.batch_number)
                .then(|| after.batch_number.clone()),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
