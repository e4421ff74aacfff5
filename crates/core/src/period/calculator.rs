//! Bi-weekly payroll period math
//!
//! Period starts are the Mondays congruent to a fixed anchor modulo 14 days.
//! Numbering restarts every calendar year: period 1 is the first aligned
//! Monday on or after 1 January, and a period belongs to the year of its
//! start date.

use chrono::{Datelike, Duration, NaiveDate};
use cranepay_domain::constants::{PERIOD_ANCHOR_DAYS_FROM_CE, PERIOD_LENGTH_DAYS};
use cranepay_domain::{PayrollPeriod, PayrollPeriodOption};

/// Days between `date` and the previous period start (0..14)
fn offset_from_period_start(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce() - PERIOD_ANCHOR_DAYS_FROM_CE).rem_euclid(PERIOD_LENGTH_DAYS)
}

/// Monday starting the period that contains `date`
pub fn period_start_for(date: NaiveDate) -> NaiveDate {
    date - Duration::days(offset_from_period_start(date))
}

/// First period start on or after 1 January of `year`
fn first_period_start(year: i32, fallback: NaiveDate) -> NaiveDate {
    let Some(jan_first) = NaiveDate::from_ymd_opt(year, 1, 1) else {
        return fallback;
    };
    let offset = offset_from_period_start(jan_first);
    if offset == 0 {
        jan_first
    } else {
        jan_first + Duration::days(PERIOD_LENGTH_DAYS - offset)
    }
}

fn period_from_start(start: NaiveDate) -> PayrollPeriod {
    let year = start.year();
    let first = first_period_start(year, start);
    let index = (start - first).num_days() / PERIOD_LENGTH_DAYS;
    let period_number = u32::try_from(index + 1).unwrap_or(1);
    PayrollPeriod::new(year, period_number, start)
}

/// The period whose 14-day window contains `date`.
pub fn period_containing(date: NaiveDate) -> PayrollPeriod {
    period_from_start(period_start_for(date))
}

/// The period immediately after `period`.
pub fn next_period(period: &PayrollPeriod) -> PayrollPeriod {
    period_from_start(period.start_date + Duration::days(PERIOD_LENGTH_DAYS))
}

/// The period immediately before `period`.
pub fn previous_period(period: &PayrollPeriod) -> PayrollPeriod {
    period_from_start(period.start_date - Duration::days(PERIOD_LENGTH_DAYS))
}

/// Options for the period picker: the current period followed by `count - 1`
/// earlier ones, newest first.
pub fn available_periods(today: NaiveDate, count: usize) -> Vec<PayrollPeriodOption> {
    let mut options = Vec::with_capacity(count);
    let mut period = period_containing(today);
    for index in 0..count {
        let title = format!(
            "{} (weeks {}-{})",
            period.display_name(),
            period.week_number,
            (period.start_date + Duration::days(7)).iso_week().week()
        );
        let previous = previous_period(&period);
        options.push(PayrollPeriodOption { period, title, is_current: index == 0 });
        period = previous;
    }
    options
}
