//! Financial records: the income and expense events that get aggregated.

use std::{fmt::Display, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{
    Date, OffsetDateTime, PrimitiveDateTime, UtcOffset, format_description::well_known::Rfc3339,
    macros::format_description,
};

use crate::Error;

/// Database identifier for a record.
pub type RecordId = i64;

/// Whether a record brought money in or sent it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Income,
    Expense,
}

impl RecordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(Error::InvalidRecordKind(s.to_owned())),
        }
    }
}

/// A validated, non-empty category label.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// Leading and trailing whitespace is removed.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyCategoryName] if `name` is empty
    /// after trimming.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyCategoryName)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty, e.g. when the
    /// name was validated before it was stored.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CategoryName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoryName::new(s)
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An income or expense event as kept by the record store.
///
/// Records are never modified once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialRecord {
    pub id: RecordId,
    /// The raw timestamp text. This may not parse, see [FinancialRecord::local_date].
    pub occurred_at: String,
    /// The magnitude of the record, never negative.
    pub amount: Decimal,
    pub kind: RecordKind,
    pub category: CategoryName,
    pub note: Option<String>,
    /// Reference to an externally stored receipt image.
    pub receipt_ref: Option<String>,
}

impl FinancialRecord {
    /// The local calendar date the record occurred on, or `None` if the
    /// timestamp cannot be parsed.
    pub fn local_date(&self, local_offset: UtcOffset) -> Option<Date> {
        parse_timestamp(&self.occurred_at, local_offset)
            .and_then(|instant| instant.checked_to_offset(local_offset))
            .map(|local| local.date())
    }
}

/// The data needed to create a [FinancialRecord].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub occurred_at: String,
    pub amount: Decimal,
    pub kind: RecordKind,
    pub category: CategoryName,
    pub note: Option<String>,
    pub receipt_ref: Option<String>,
}

impl NewRecord {
    /// Create a new record without a note or receipt.
    ///
    /// # Errors
    ///
    /// Returns [Error::NegativeAmount] if `amount` is less than zero.
    pub fn new(
        amount: Decimal,
        kind: RecordKind,
        category: CategoryName,
        occurred_at: &str,
    ) -> Result<Self, Error> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(Error::NegativeAmount(amount.to_string()));
        }

        Ok(Self {
            occurred_at: occurred_at.trim().to_owned(),
            amount,
            kind,
            category,
            note: None,
            receipt_ref: None,
        })
    }

    /// Attach a note, blank notes are dropped.
    pub fn note(mut self, note: &str) -> Self {
        let note = note.trim();
        self.note = (!note.is_empty()).then(|| note.to_owned());
        self
    }

    /// Attach a reference to a receipt image.
    pub fn receipt_ref(mut self, receipt_ref: &str) -> Self {
        let receipt_ref = receipt_ref.trim();
        self.receipt_ref = (!receipt_ref.is_empty()).then(|| receipt_ref.to_owned());
        self
    }
}

/// Parse a record timestamp.
///
/// RFC 3339 timestamps are exact instants. Date-times and dates without an
/// offset are taken to be in `local_offset`, dates are read as local midnight.
pub fn parse_timestamp(raw: &str, local_offset: UtcOffset) -> Option<OffsetDateTime> {
    let raw = raw.trim();

    if let Ok(instant) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(instant);
    }

    let local_date_time = PrimitiveDateTime::parse(
        raw,
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    )
    .or_else(|_| {
        PrimitiveDateTime::parse(
            raw,
            format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
        )
    })
    .or_else(|_| {
        Date::parse(raw, format_description!("[year]-[month]-[day]")).map(Date::midnight)
    });

    local_date_time
        .ok()
        .map(|date_time| date_time.assume_offset(local_offset))
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use time::macros::{date, datetime, offset};

    use crate::Error;

    use super::{CategoryName, FinancialRecord, NewRecord, RecordKind, parse_timestamp};

    fn record_at(occurred_at: &str) -> FinancialRecord {
        FinancialRecord {
            id: 1,
            occurred_at: occurred_at.to_owned(),
            amount: Decimal::new(1000, 2),
            kind: RecordKind::Expense,
            category: CategoryName::new_unchecked("Food"),
            note: None,
            receipt_ref: None,
        }
    }

    #[test]
    fn parses_rfc3339_instants() {
        let got = parse_timestamp("2024-01-15T10:30:00.123+00:00", offset!(+13));

        assert_eq!(got, Some(datetime!(2024-01-15 10:30:00.123 UTC)));
    }

    #[test]
    fn dates_without_offset_use_local_offset() {
        let got = parse_timestamp("2024-01-15", offset!(+13));

        assert_eq!(got, Some(datetime!(2024-01-15 00:00 +13)));
    }

    #[test]
    fn date_times_without_offset_use_local_offset() {
        let space = parse_timestamp("2024-01-15 08:00:00", offset!(-5));
        let t = parse_timestamp("2024-01-15T08:00:00", offset!(-5));

        assert_eq!(space, Some(datetime!(2024-01-15 08:00 -5)));
        assert_eq!(t, space);
    }

    #[test]
    fn garbage_does_not_parse() {
        assert_eq!(parse_timestamp("not-a-date", offset!(UTC)), None);
        assert_eq!(parse_timestamp("", offset!(UTC)), None);
        assert_eq!(parse_timestamp("2024-02-30", offset!(UTC)), None);
    }

    #[test]
    fn local_date_shifts_instant_into_local_time() {
        // 11pm UTC on the 14th is already the 15th in New Zealand.
        let record = record_at("2024-01-14T23:00:00Z");

        assert_eq!(record.local_date(offset!(+13)), Some(date!(2024 - 01 - 15)));
        assert_eq!(record.local_date(offset!(UTC)), Some(date!(2024 - 01 - 14)));
    }

    #[test]
    fn new_record_rejects_negative_amount() {
        let got = NewRecord::new(
            Decimal::new(-5, 0),
            RecordKind::Expense,
            CategoryName::new_unchecked("Food"),
            "2024-01-01",
        );

        assert_eq!(got, Err(Error::NegativeAmount("-5".to_owned())));
    }

    #[test]
    fn new_record_accepts_zero_and_drops_blank_note() {
        let record = NewRecord::new(
            Decimal::ZERO,
            RecordKind::Income,
            CategoryName::new_unchecked("Salary"),
            " 2024-01-01 ",
        )
        .unwrap()
        .note("   ")
        .receipt_ref("slips/abc.png");

        assert_eq!(record.occurred_at, "2024-01-01");
        assert_eq!(record.note, None);
        assert_eq!(record.receipt_ref.as_deref(), Some("slips/abc.png"));
    }

    #[test]
    fn category_name_is_trimmed_and_non_empty() {
        assert_eq!(CategoryName::new("  Rent "), Ok(CategoryName::new_unchecked("Rent")));
        assert_eq!(CategoryName::new("  "), Err(Error::EmptyCategoryName));
    }

    #[test]
    fn record_kind_parses_case_insensitively() {
        assert_eq!("INCOME".parse::<RecordKind>(), Ok(RecordKind::Income));
        assert_eq!(
            "refund".parse::<RecordKind>(),
            Err(Error::InvalidRecordKind("refund".to_owned()))
        );
    }
}
