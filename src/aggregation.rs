//! Aggregates financial records into fixed-length series of time buckets and
//! derives the summary figures shown alongside them.
//!
//! Every function here is pure. The only notion of "now" is the reference
//! time passed in by the caller.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use time::OffsetDateTime;

use crate::{
    Error,
    period::{Granularity, PeriodRange, period_key, period_label, trailing_periods},
    record::{CategoryName, FinancialRecord, RecordKind},
    settings::BudgetSettings,
};

/// The display maximum used when every bucket is empty.
pub const DISPLAY_MAX_FLOOR: Decimal = Decimal::ONE_HUNDRED;

/// One point in an aggregated series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    /// Sortable identifier of the span, e.g. "2024-01-15", "2024-W03" or "2024-01".
    pub key: String,
    pub label: String,
    pub range: PeriodRange,
    pub income_total: Decimal,
    pub expense_total: Decimal,
    /// Whether the span contains the reference time.
    pub is_current: bool,
}

impl Bucket {
    fn empty(granularity: Granularity, range: PeriodRange, is_current: bool) -> Self {
        Self {
            key: period_key(granularity, range),
            label: period_label(granularity, range, is_current),
            range,
            income_total: Decimal::ZERO,
            expense_total: Decimal::ZERO,
            is_current,
        }
    }

    /// The total for records of `kind`.
    pub fn total(&self, kind: RecordKind) -> Decimal {
        match kind {
            RecordKind::Income => self.income_total,
            RecordKind::Expense => self.expense_total,
        }
    }

    fn add(&mut self, kind: RecordKind, amount: Decimal) {
        let total = match kind {
            RecordKind::Income => &mut self.income_total,
            RecordKind::Expense => &mut self.expense_total,
        };

        *total = total.saturating_add(amount.abs());
    }
}

/// Sum `records` into `window_size` consecutive buckets of width `granularity`,
/// the last of which contains `reference_time`.
///
/// Periods follow the local calendar of the UTC offset carried by
/// `reference_time`: days run midnight to midnight, weeks start on Monday.
/// Records whose timestamp cannot be parsed or that fall outside the window
/// are skipped. Buckets without records are kept with zero totals. Amounts
/// are added as magnitudes, whatever their sign.
///
/// # Errors
///
/// - [Error::EmptyWindow] if `window_size` is zero.
/// - [Error::WindowOutOfRange] if the window would start before the earliest
///   supported date.
pub fn aggregate(
    records: &[FinancialRecord],
    granularity: Granularity,
    window_size: usize,
    reference_time: OffsetDateTime,
) -> Result<Vec<Bucket>, Error> {
    if window_size == 0 {
        return Err(Error::EmptyWindow);
    }

    let local_offset = reference_time.offset();
    let periods = trailing_periods(granularity, reference_time.date(), window_size)
        .ok_or(Error::WindowOutOfRange)?;
    let last_index = periods.len() - 1;

    let mut buckets: Vec<Bucket> = periods
        .into_iter()
        .enumerate()
        .map(|(index, range)| Bucket::empty(granularity, range, index == last_index))
        .collect();

    let window = PeriodRange {
        start: buckets[0].range.start,
        end: buckets[last_index].range.end,
    };

    for record in records {
        let Some(date) = record.local_date(local_offset) else {
            continue;
        };

        if !window.contains(date) {
            continue;
        }

        let index = buckets.partition_point(|bucket| bucket.range.end < date);
        buckets[index].add(record.kind, record.amount);
    }

    Ok(buckets)
}

/// The largest income or expense total in `buckets`, for scaling charts.
///
/// Returns [DISPLAY_MAX_FLOOR] if every total is zero so callers can always
/// divide by the result.
pub fn display_max(buckets: &[Bucket]) -> Decimal {
    let max = buckets
        .iter()
        .map(|bucket| bucket.income_total.max(bucket.expense_total))
        .max()
        .unwrap_or(Decimal::ZERO);

    if max.is_zero() {
        DISPLAY_MAX_FLOOR
    } else {
        max
    }
}

/// The mean `kind` total of the non-current buckets that have a nonzero total.
///
/// Returns zero if no bucket qualifies.
pub fn previous_average(buckets: &[Bucket], kind: RecordKind) -> Decimal {
    let (sum, count) = buckets
        .iter()
        .filter(|bucket| !bucket.is_current)
        .map(|bucket| bucket.total(kind))
        .filter(|total| !total.is_zero())
        .fold((Decimal::ZERO, 0u32), |(sum, count), total| {
            (sum.saturating_add(total), count + 1)
        });

    if count == 0 {
        Decimal::ZERO
    } else {
        sum / Decimal::from(count)
    }
}

/// The sum of the `kind` totals over the whole series.
pub fn period_total(buckets: &[Bucket], kind: RecordKind) -> Decimal {
    buckets
        .iter()
        .fold(Decimal::ZERO, |sum, bucket| sum.saturating_add(bucket.total(kind)))
}

/// Overall income, expense and balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Totals {
    pub income: Decimal,
    pub expense: Decimal,
    /// Income minus expense.
    pub balance: Decimal,
}

/// Total every record regardless of when it occurred.
pub fn summarize(records: &[FinancialRecord]) -> Totals {
    let mut totals = Totals::default();

    for record in records {
        match record.kind {
            RecordKind::Income => totals.income = totals.income.saturating_add(record.amount.abs()),
            RecordKind::Expense => {
                totals.expense = totals.expense.saturating_add(record.amount.abs())
            }
        }
    }

    totals.balance = totals.income.saturating_sub(totals.expense);
    totals
}

/// A category's share of all expenses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryShare {
    pub category: CategoryName,
    pub total: Decimal,
    /// Percentage of all expenses, rounded to two decimal places.
    pub percentage: Decimal,
}

/// Group expenses by category, largest first.
///
/// Categories with equal totals are ordered by name.
pub fn expense_by_category(records: &[FinancialRecord]) -> Vec<CategoryShare> {
    let mut totals: BTreeMap<&CategoryName, Decimal> = BTreeMap::new();

    for record in records
        .iter()
        .filter(|record| record.kind == RecordKind::Expense)
    {
        let total = totals.entry(&record.category).or_insert(Decimal::ZERO);
        *total = total.saturating_add(record.amount.abs());
    }

    let grand_total = totals
        .values()
        .fold(Decimal::ZERO, |sum, total| sum.saturating_add(*total));

    let mut shares: Vec<CategoryShare> = totals
        .into_iter()
        .map(|(category, total)| CategoryShare {
            category: category.clone(),
            total,
            percentage: percentage_of(total, grand_total),
        })
        .collect();

    // Stable, so equal totals keep the name order from the map.
    shares.sort_by(|a, b| b.total.cmp(&a.total));
    shares
}

/// How spending compares to the budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetAlert {
    Disabled,
    UnderThreshold,
    /// Spending reached the alert threshold but not the limit.
    Warning,
    OverLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetStatus {
    pub alert: BudgetAlert,
    pub spent: Decimal,
    /// Percentage of the limit spent, rounded to two decimal places.
    pub percent_used: Decimal,
}

/// Compare `spent` against `budget`.
pub fn budget_status(budget: &BudgetSettings, spent: Decimal) -> BudgetStatus {
    let percent_used = if budget.limit <= Decimal::ZERO {
        if spent.is_zero() {
            Decimal::ZERO
        } else {
            Decimal::ONE_HUNDRED
        }
    } else {
        percentage_of(spent, budget.limit)
    };

    let alert_at = budget.limit.saturating_mul(Decimal::from(budget.alert_threshold_percent))
        / Decimal::ONE_HUNDRED;

    let alert = if !budget.enabled {
        BudgetAlert::Disabled
    } else if spent > budget.limit {
        BudgetAlert::OverLimit
    } else if spent > Decimal::ZERO && spent >= alert_at {
        BudgetAlert::Warning
    } else {
        BudgetAlert::UnderThreshold
    };

    BudgetStatus {
        alert,
        spent,
        percent_used,
    }
}

fn percentage_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }

    part.saturating_mul(Decimal::ONE_HUNDRED)
        .checked_div(whole)
        .unwrap_or(Decimal::MAX)
        .round_dp(2)
}
