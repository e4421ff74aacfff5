//! Groups supervisor-approved raw entries into review aggregates

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::Datelike;
use cranepay_domain::{
    EmployeeBreakdown, EmployeeId, FinancialBreakdown, PayrollPeriod, PeriodCoverage, ProjectId,
    RateBucket, RawWorkEntry, TaskId, WorkEntryForReview, WorkEntryReviewStatus,
};
use rust_decimal::Decimal;
use tracing::debug;

use super::rates::RateResolver;

type GroupKey = (EmployeeId, ProjectId, TaskId);

/// (employee, ISO year, ISO week)
type WeekKey = (EmployeeId, i32, u32);

#[derive(Default)]
struct Group<'a> {
    entries: Vec<&'a RawWorkEntry>,
    breakdown: FinancialBreakdown,
}

/// Turns raw clock records into one [`WorkEntryForReview`] per
/// (employee, project, task).
///
/// Weekday hours count against the employee's weekly threshold in
/// chronological order; whatever exceeds it is overtime. Saturday and Sunday
/// hours are billed as weekend and do not consume the threshold. The output
/// depends only on the set of entries, never on their input order.
#[derive(Clone)]
pub struct WorkEntryAggregator {
    rates: Arc<dyn RateResolver>,
}

impl WorkEntryAggregator {
    /// Aggregator pricing hours with `rates`
    pub fn new(rates: Arc<dyn RateResolver>) -> Self {
        Self { rates }
    }

    /// Aggregate the entries dated inside `period`, ordered by group key.
    pub fn aggregate(
        &self,
        period: &PayrollPeriod,
        entries: &[RawWorkEntry],
    ) -> Vec<WorkEntryForReview> {
        let mut in_period: Vec<&RawWorkEntry> =
            entries.iter().filter(|entry| period.contains(entry.date)).collect();
        in_period.sort_by_key(|e| (e.employee_id, e.date, e.clock_in, e.id));

        let mut weekday_hours: HashMap<WeekKey, Decimal> = HashMap::new();
        let mut groups: BTreeMap<GroupKey, Group<'_>> = BTreeMap::new();

        for entry in in_period.iter().copied() {
            let hours = entry.worked_hours();
            let group = groups.entry((entry.employee_id, entry.project_id, entry.task_id)).or_default();
            group.entries.push(entry);

            if entry.is_weekend() {
                self.book(&mut group.breakdown, entry.employee_id, RateBucket::Weekend, hours);
                continue;
            }

            let week = entry.date.iso_week();
            let used = weekday_hours.entry((entry.employee_id, week.year(), week.week())).or_default();
            let threshold = self.rates.weekly_overtime_threshold(entry.employee_id);
            let regular = hours.min((threshold - *used).max(Decimal::ZERO));
            *used += hours;

            self.book(&mut group.breakdown, entry.employee_id, RateBucket::Regular, regular);
            self.book(&mut group.breakdown, entry.employee_id, RateBucket::Overtime, hours - regular);
        }

        debug!(
            period = %period.display_name(),
            raw_entries = entries.len(),
            in_period = in_period.len(),
            groups = groups.len(),
            "Aggregated work entries"
        );

        groups.into_iter().filter_map(|(key, group)| Self::finish(key, group)).collect()
    }

    fn book(&self, breakdown: &mut FinancialBreakdown, employee_id: EmployeeId, bucket: RateBucket, hours: Decimal) {
        if hours.is_zero() {
            return;
        }
        breakdown.bucket_mut(bucket).add(hours, self.rates.rate(employee_id, bucket));
    }

    fn finish((employee_id, project_id, task_id): GroupKey, group: Group<'_>) -> Option<WorkEntryForReview> {
        let mut entry_ids: Vec<_> = group.entries.iter().map(|e| e.id).collect();
        entry_ids.sort_unstable();
        let id = *entry_ids.first()?;

        let start = group.entries.iter().map(|e| e.date).min()?;
        let end = group.entries.iter().map(|e| e.date).max()?;

        // Most recent sign-off wins; id breaks ties.
        let supervisor_confirmation = group
            .entries
            .iter()
            .filter_map(|e| e.supervisor_confirmation.as_ref().map(|c| (c.confirmed_at, e.id, c)))
            .max_by_key(|(at, id, _)| (*at, *id))
            .map(|(_, _, c)| c.clone());

        Some(WorkEntryForReview {
            id,
            employee_id,
            project_id,
            task_id,
            entry_ids,
            total_hours: group.breakdown.total_hours(),
            total_amount: group.breakdown.total_amount(),
            breakdown: group.breakdown,
            supervisor_confirmation,
            period_coverage: PeriodCoverage { start, end },
            status: WorkEntryReviewStatus::Pending,
        })
    }
}

/// Per-employee totals, highest amount first (ties by employee id)
pub fn batch_employee_breakdown(entries: &[WorkEntryForReview]) -> Vec<EmployeeBreakdown> {
    let mut per_employee: BTreeMap<EmployeeId, EmployeeBreakdown> = BTreeMap::new();
    for entry in entries {
        let row = per_employee.entry(entry.employee_id).or_insert_with(|| EmployeeBreakdown {
            employee_id: entry.employee_id,
            total_hours: Decimal::ZERO,
            total_amount: Decimal::ZERO,
            entry_count: 0,
        });
        row.total_hours += entry.total_hours;
        row.total_amount += entry.total_amount;
        row.entry_count += 1;
    }

    let mut rows: Vec<_> = per_employee.into_values().collect();
    rows.sort_by(|a, b| b.total_amount.cmp(&a.total_amount).then(a.employee_id.cmp(&b.employee_id)));
    rows
}

/// Bucket totals across every entry
pub fn batch_financial_breakdown(entries: &[WorkEntryForReview]) -> FinancialBreakdown {
    entries.iter().fold(FinancialBreakdown::default(), |acc, entry| acc.merged(&entry.breakdown))
}
