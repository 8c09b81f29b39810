//! Builders for records used across aggregation tests.

use rust_decimal::Decimal;

use crate::record::{CategoryName, FinancialRecord, RecordKind};

pub(crate) fn record_at(
    occurred_at: &str,
    amount: i64,
    kind: RecordKind,
    category: &str,
) -> FinancialRecord {
    FinancialRecord {
        id: 0,
        occurred_at: occurred_at.to_owned(),
        amount: Decimal::from(amount),
        kind,
        category: CategoryName::new_unchecked(category),
        note: None,
        receipt_ref: None,
    }
}

pub(crate) fn income(occurred_at: &str, amount: i64) -> FinancialRecord {
    record_at(occurred_at, amount, RecordKind::Income, "Salary")
}

pub(crate) fn expense(occurred_at: &str, amount: i64, category: &str) -> FinancialRecord {
    record_at(occurred_at, amount, RecordKind::Expense, category)
}
