//! Work entry types: raw clock records and their review aggregates

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::breakdown::FinancialBreakdown;
use crate::constants::SECONDS_PER_HOUR;

pub type WorkEntryId = i64;
pub type EmployeeId = i64;
pub type ProjectId = i64;
pub type TaskId = i64;
pub type UserId = i64;

/// Upstream supervisor sign-off attached to confirmed hours
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupervisorConfirmation {
    pub supervisor_id: UserId,
    pub supervisor_name: String,
    pub confirmed_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digital_signature: Option<String>,
}

/// One supervisor-approved clock record as delivered by the work-entry source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawWorkEntry {
    pub id: WorkEntryId,
    pub employee_id: EmployeeId,
    pub project_id: ProjectId,
    pub task_id: TaskId,
    pub date: NaiveDate,
    #[serde(default)]
    pub clock_in: Option<DateTime<Utc>>,
    #[serde(default)]
    pub clock_out: Option<DateTime<Utc>>,
    #[serde(default)]
    pub pause_minutes: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supervisor_confirmation: Option<SupervisorConfirmation>,
}

impl RawWorkEntry {
    /// Worked seconds after pause, clamped at zero.
    ///
    /// A missing clock-in or clock-out yields 0 rather than an error; the
    /// record still shows up in review so a supervisor can fix it.
    pub fn worked_seconds(&self) -> i64 {
        let (Some(clock_in), Some(clock_out)) = (self.clock_in, self.clock_out) else {
            return 0;
        };
        let gross = (clock_out - clock_in).num_seconds();
        let pause = self.pause_minutes.unwrap_or(0).max(0) * 60;
        (gross - pause).max(0)
    }

    /// Worked hours as an exact decimal
    pub fn worked_hours(&self) -> Decimal {
        Decimal::from(self.worked_seconds()) / Decimal::from(SECONDS_PER_HOUR)
    }

    /// Saturday or Sunday
    pub fn is_weekend(&self) -> bool {
        use chrono::{Datelike, Weekday};
        matches!(self.date.weekday(), Weekday::Sat | Weekday::Sun)
    }
}

/// Review status of an aggregated entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkEntryReviewStatus {
    Pending,
    Approved,
    Rejected,
    ChangesRequested,
}

crate::impl_domain_status_conversions!(WorkEntryReviewStatus {
    Pending => "pending",
    Approved => "approved",
    Rejected => "rejected",
    ChangesRequested => "changes_requested",
});

impl WorkEntryReviewStatus {
    /// Approved and rejected entries are immutable.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

/// Reviewer action applied in bulk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkEntryAction {
    Approve,
    Reject,
    RequestChanges,
}

crate::impl_domain_status_conversions!(WorkEntryAction {
    Approve => "approve",
    Reject => "reject",
    RequestChanges => "request_changes",
});

impl WorkEntryAction {
    /// Status an entry takes when the action succeeds
    pub const fn target_status(self) -> WorkEntryReviewStatus {
        match self {
            Self::Approve => WorkEntryReviewStatus::Approved,
            Self::Reject => WorkEntryReviewStatus::Rejected,
            Self::RequestChanges => WorkEntryReviewStatus::ChangesRequested,
        }
    }

    pub const fn past_tense(self) -> &'static str {
        match self {
            Self::Approve => "approved",
            Self::Reject => "rejected",
            Self::RequestChanges => "sent back for changes",
        }
    }

    /// Actions that cannot be undone from the review screen
    pub const fn is_irreversible(self) -> bool {
        matches!(self, Self::Reject)
    }
}

/// Inclusive date range covered by an aggregate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeriodCoverage {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// One employee's approved hours for one project/task within a period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkEntryForReview {
    /// Lowest raw entry id of the group
    pub id: WorkEntryId,
    pub employee_id: EmployeeId,
    pub project_id: ProjectId,
    pub task_id: TaskId,
    /// Raw entries folded into this aggregate, ascending
    pub entry_ids: Vec<WorkEntryId>,
    pub total_hours: Decimal,
    pub total_amount: Decimal,
    #[serde(default)]
    pub breakdown: FinancialBreakdown,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supervisor_confirmation: Option<SupervisorConfirmation>,
    pub period_coverage: PeriodCoverage,
    pub status: WorkEntryReviewStatus,
}

impl WorkEntryForReview {
    pub fn is_finalized(&self) -> bool {
        self.status.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    use super::*;

    fn entry(clock_in: Option<(u32, u32)>, clock_out: Option<(u32, u32)>, pause: Option<i64>) -> RawWorkEntry {
        let at = |(h, m): (u32, u32)| Utc.with_ymd_and_hms(2024, 4, 2, h, m, 0).unwrap();
        RawWorkEntry {
            id: 1,
            employee_id: 10,
            project_id: 100,
            task_id: 1000,
            date: NaiveDate::from_ymd_opt(2024, 4, 2).unwrap(),
            clock_in: clock_in.map(at),
            clock_out: clock_out.map(at),
            pause_minutes: pause,
            supervisor_confirmation: None,
        }
    }

    #[test]
    fn test_worked_hours_subtracts_pause() {
        let e = entry(Some((7, 0)), Some((15, 30)), Some(30));
        assert_eq!(e.worked_seconds(), 8 * 3600);
        assert_eq!(e.worked_hours(), dec!(8));
    }

    #[test]
    fn test_fractional_hours_are_exact() {
        let e = entry(Some((7, 0)), Some((7, 20)), None);
        assert_eq!(e.worked_hours() * dec!(3), dec!(1));
    }

    #[test]
    fn test_missing_timestamp_contributes_zero() {
        assert_eq!(entry(None, Some((15, 0)), None).worked_hours(), Decimal::ZERO);
        assert_eq!(entry(Some((7, 0)), None, None).worked_hours(), Decimal::ZERO);
    }

    #[test]
    fn test_reversed_clock_or_long_pause_never_negative() {
        assert_eq!(entry(Some((15, 0)), Some((7, 0)), None).worked_seconds(), 0);
        assert_eq!(entry(Some((7, 0)), Some((8, 0)), Some(120)).worked_seconds(), 0);
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(WorkEntryReviewStatus::Approved.is_terminal());
        assert!(WorkEntryReviewStatus::Rejected.is_terminal());
        assert!(!WorkEntryReviewStatus::Pending.is_terminal());
        assert!(!WorkEntryReviewStatus::ChangesRequested.is_terminal());
    }

    #[test]
    fn test_action_targets() {
        assert_eq!(WorkEntryAction::RequestChanges.target_status(), WorkEntryReviewStatus::ChangesRequested);
        assert_eq!(WorkEntryAction::RequestChanges.to_string(), "request_changes");
        assert!(WorkEntryAction::Reject.is_irreversible());
        assert!(!WorkEntryAction::Approve.is_irreversible());
    }
}
