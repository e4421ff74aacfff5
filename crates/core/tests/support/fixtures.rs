//! Builders for periods, raw entries and review aggregates

use std::sync::Arc;

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use cranepay_core::{StaticRateResolver, WorkEntryAggregator};
use cranepay_domain::{
    BatchId, FinancialBreakdown, PayrollBatch, PayrollBatchStatus, PayrollPeriod, PeriodCoverage,
    RatePolicyConfig, RawWorkEntry, SupervisorConfirmation, WorkEntryForReview,
    WorkEntryReviewStatus,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Period 07/2024: Monday 1 April to Sunday 14 April
pub fn period_2024_07() -> PayrollPeriod {
    PayrollPeriod::new(2024, 7, day(2024, 4, 1))
}

/// Aggregator using the default rate policy (450 / 675 / 600, 37 h weeks)
pub fn default_aggregator() -> WorkEntryAggregator {
    WorkEntryAggregator::new(Arc::new(StaticRateResolver::new(RatePolicyConfig::default())))
}

/// Raw entry clocked in at 07:00 for `minutes` of work, no pause.
pub fn raw_entry(
    id: i64,
    employee_id: i64,
    project_id: i64,
    task_id: i64,
    date: NaiveDate,
    minutes: i64,
) -> RawWorkEntry {
    let clock_in = Utc.from_utc_datetime(&date.and_hms_opt(7, 0, 0).unwrap());
    RawWorkEntry {
        id,
        employee_id,
        project_id,
        task_id,
        date,
        clock_in: Some(clock_in),
        clock_out: Some(clock_in + Duration::minutes(minutes)),
        pause_minutes: None,
        supervisor_confirmation: Some(SupervisorConfirmation {
            supervisor_id: 90,
            supervisor_name: "Site Supervisor".to_string(),
            confirmed_at: clock_in + Duration::hours(12),
            notes: None,
            digital_signature: None,
        }),
    }
}

/// Single-entry review aggregate with `hours` at `rate`, dated `on`
pub fn review_entry(
    id: i64,
    employee_id: i64,
    on: NaiveDate,
    hours: Decimal,
    rate: Decimal,
    status: WorkEntryReviewStatus,
) -> WorkEntryForReview {
    let mut breakdown = FinancialBreakdown::default();
    breakdown.regular.add(hours, rate);
    WorkEntryForReview {
        id,
        employee_id,
        project_id: 1,
        task_id: 1,
        entry_ids: vec![id],
        total_hours: breakdown.total_hours(),
        total_amount: breakdown.total_amount(),
        breakdown,
        supervisor_confirmation: None,
        period_coverage: PeriodCoverage { start: on, end: on },
        status,
    }
}

/// Batch for period 07/2024 as the backend would store it
pub fn stored_batch(id: BatchId, status: PayrollBatchStatus) -> PayrollBatch {
    let period = period_2024_07();
    PayrollBatch {
        id,
        batch_number: period.batch_number(),
        period_start: period.start_date,
        period_end: period.end_date,
        year: period.year,
        period_number: period.period_number,
        total_employees: 2,
        total_hours: dec!(120),
        total_amount: dec!(54000),
        status,
        created_by: 3,
        created_at: Utc.with_ymd_and_hms(2024, 4, 15, 8, 0, 0).unwrap(),
        approved_by: None,
        approved_at: None,
        sent_to_zenegy_at: None,
        zenegy_sync_status: None,
        notes: None,
    }
}
