//! Hour and amount breakdowns for review aggregates and batches

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::work_entry::EmployeeId;

/// Pay bucket an hour is billed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateBucket {
    Regular,
    Overtime,
    Weekend,
}

crate::impl_domain_status_conversions!(RateBucket {
    Regular => "regular",
    Overtime => "overtime",
    Weekend => "weekend",
});

/// Hours and money accumulated in one bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketTotals {
    pub hours: Decimal,
    pub amount: Decimal,
}

impl BucketTotals {
    /// Add `hours` billed at `rate`.
    pub fn add(&mut self, hours: Decimal, rate: Decimal) {
        self.hours += hours;
        self.amount += hours * rate;
    }

    /// `amount / hours`, zero when no hours were booked
    pub fn average_rate(&self) -> Decimal {
        if self.hours.is_zero() {
            Decimal::ZERO
        } else {
            self.amount / self.hours
        }
    }

    fn merge(&mut self, other: &Self) {
        self.hours += other.hours;
        self.amount += other.amount;
    }
}

/// Regular / overtime / weekend split of a set of hours
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialBreakdown {
    pub regular: BucketTotals,
    pub overtime: BucketTotals,
    pub weekend: BucketTotals,
}

impl FinancialBreakdown {
    pub fn bucket_mut(&mut self, bucket: RateBucket) -> &mut BucketTotals {
        match bucket {
            RateBucket::Regular => &mut self.regular,
            RateBucket::Overtime => &mut self.overtime,
            RateBucket::Weekend => &mut self.weekend,
        }
    }

    pub fn bucket(&self, bucket: RateBucket) -> &BucketTotals {
        match bucket {
            RateBucket::Regular => &self.regular,
            RateBucket::Overtime => &self.overtime,
            RateBucket::Weekend => &self.weekend,
        }
    }

    pub fn total_hours(&self) -> Decimal {
        self.regular.hours + self.overtime.hours + self.weekend.hours
    }

    /// Σ bucket hours × bucket rate
    pub fn total_amount(&self) -> Decimal {
        self.regular.amount + self.overtime.amount + self.weekend.amount
    }

    /// Sum two breakdowns bucket by bucket.
    pub fn merged(mut self, other: &Self) -> Self {
        self.regular.merge(&other.regular);
        self.overtime.merge(&other.overtime);
        self.weekend.merge(&other.weekend);
        self
    }
}

/// Per-employee totals shown on the batch detail screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeBreakdown {
    pub employee_id: EmployeeId,
    pub total_hours: Decimal,
    pub total_amount: Decimal,
    /// Number of review aggregates contributing to the totals
    pub entry_count: usize,
}
