//! Payroll period types

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::batch::BatchNumber;
use super::serde_helpers::flexible_date;
use crate::constants::PERIOD_END_OFFSET_DAYS;

/// Status of a payroll period.
///
/// Periods are produced `active`; closing is an external event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayrollPeriodStatus {
    Active,
    Closed,
}

crate::impl_domain_status_conversions!(PayrollPeriodStatus {
    Active => "active",
    Closed => "closed",
});

/// A fixed 14-day Monday-to-Sunday payroll window.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PayrollPeriod {
    /// `year * 100 + period_number`, stable across regenerations
    pub id: i64,
    pub year: i32,
    pub period_number: u32,
    #[serde(with = "flexible_date")]
    pub start_date: NaiveDate,
    /// Inclusive last day (a Sunday)
    #[serde(with = "flexible_date")]
    pub end_date: NaiveDate,
    /// ISO week number of `start_date`
    pub week_number: u32,
    pub status: PayrollPeriodStatus,
}

impl PayrollPeriod {
    /// Build a period from its Monday start date.
    ///
    /// `period_number` is supplied by the caller (the calculator owns the
    /// numbering rule).
    pub fn new(year: i32, period_number: u32, start_date: NaiveDate) -> Self {
        Self {
            id: i64::from(year) * 100 + i64::from(period_number),
            year,
            period_number,
            start_date,
            end_date: start_date + Duration::days(PERIOD_END_OFFSET_DAYS),
            week_number: start_date.iso_week().week(),
            status: PayrollPeriodStatus::Active,
        }
    }

    /// Whether `date` falls inside the inclusive window.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// Position of `date` inside the period (1 or 2), if contained.
    pub fn week_of_period(&self, date: NaiveDate) -> Option<u32> {
        if !self.contains(date) {
            return None;
        }
        let offset = (date - self.start_date).num_days();
        Some(if offset < 7 { 1 } else { 2 })
    }

    /// Canonical batch number for batches covering this period.
    pub fn batch_number(&self) -> BatchNumber {
        BatchNumber::for_period(self.year, self.period_number)
    }

    /// e.g. `"Period 07/2024"`
    pub fn display_name(&self) -> String {
        format!("Period {:02}/{}", self.period_number, self.year)
    }
}

/// An entry in the period picker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollPeriodOption {
    pub period: PayrollPeriod,
    pub title: String,
    /// True for the period containing the reference date
    pub is_current: bool,
}
