//! Wall-clock abstraction for lifecycle timestamps

use chrono::{DateTime, Utc};

/// Source of "now" for lifecycle stamps (`approved_at`, `sent_to_zenegy_at`)
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Real system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
