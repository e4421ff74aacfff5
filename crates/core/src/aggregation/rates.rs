//! Rate resolution for the regular/overtime/weekend split

use cranepay_domain::{EmployeeId, RateBucket, RatePolicyConfig};
use rust_decimal::Decimal;

/// Supplies hourly rates and the weekly overtime threshold.
///
/// Synchronous; backed by configuration or a preloaded rate table.
pub trait RateResolver: Send + Sync {
    /// Hourly rate for `bucket`
    fn rate(&self, employee_id: EmployeeId, bucket: RateBucket) -> Decimal;

    /// Weekday hours per ISO week billed as regular before overtime starts
    fn weekly_overtime_threshold(&self, employee_id: EmployeeId) -> Decimal;
}

/// Same policy for every employee
#[derive(Debug, Clone)]
pub struct StaticRateResolver {
    policy: RatePolicyConfig,
}

impl StaticRateResolver {
    /// Resolver over a fixed policy
    pub fn new(policy: RatePolicyConfig) -> Self {
        Self { policy }
    }
}

impl From<RatePolicyConfig> for StaticRateResolver {
    fn from(policy: RatePolicyConfig) -> Self {
        Self::new(policy)
    }
}

impl RateResolver for StaticRateResolver {
    fn rate(&self, _employee_id: EmployeeId, bucket: RateBucket) -> Decimal {
        match bucket {
            RateBucket::Regular => self.policy.regular_rate,
            RateBucket::Overtime => self.policy.overtime_rate,
            RateBucket::Weekend => self.policy.weekend_rate,
        }
    }

    fn weekly_overtime_threshold(&self, _employee_id: EmployeeId) -> Decimal {
        self.policy.weekly_overtime_threshold_hours
    }
}
