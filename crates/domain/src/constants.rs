//! Domain constants
//!
//! Centralized location for payroll constants shared by the calculator,
//! the lifecycle and the HTTP adapters.

/// Length of one payroll period in calendar days.
pub const PERIOD_LENGTH_DAYS: i64 = 14;

/// Offset from `start_date` to the inclusive `end_date` of a period.
pub const PERIOD_END_OFFSET_DAYS: i64 = PERIOD_LENGTH_DAYS - 1;

/// Every period start is congruent to this Monday modulo 14 days.
///
/// Monday 2024-01-08 (ISO week 2) as days from the common era, the
/// representation returned by `Datelike::num_days_from_ce`. Periods start on
/// even ISO weeks until the next 53-week year; from then on the anchor alone
/// decides.
pub const PERIOD_ANCHOR_DAYS_FROM_CE: i32 = 738_893;

/// Upper bound for `period_number` inside one calendar year.
pub const MAX_PERIODS_PER_YEAR: u32 = 27;

/// Seconds per hour, used for hour arithmetic on clock timestamps.
pub const SECONDS_PER_HOUR: i64 = 3600;

/// Default number of parallel per-entry calls for bulk actions.
pub const DEFAULT_BULK_MAX_PARALLEL: usize = 5;

/// Default per-call timeout for bulk actions, in seconds.
pub const DEFAULT_BULK_CALL_TIMEOUT_SECS: u64 = 15;

/// Number of periods offered by the period picker.
pub const DEFAULT_AVAILABLE_PERIODS: usize = 3;
