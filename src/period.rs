//! Calendar period helpers for bucketing records by day, week or month.
//!
//! Everything here works on local calendar dates and is free of clock reads,
//! callers convert instants into local dates before asking which period they
//! fall into.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use time::{Date, Duration, Month, Weekday};

/// The width of a single bucket in an aggregated series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Granularity {
    /// Midnight to midnight in local time.
    Day,
    /// Monday to Sunday.
    Week,
    /// First to last day of a calendar month.
    Month,
}

impl Granularity {
    /// The number of buckets shown for this granularity when the caller does
    /// not ask for a specific window.
    pub fn default_window_size(self) -> usize {
        match self {
            Self::Day => 7,
            Self::Week => 5,
            Self::Month => 6,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }
}

impl Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" | "days" => Ok(Self::Day),
            "week" | "weeks" => Ok(Self::Week),
            "month" | "months" => Ok(Self::Month),
            other => Err(format!(
                "\"{other}\" is not a granularity, expected day, week or month"
            )),
        }
    }
}

/// An inclusive span of local calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PeriodRange {
    pub start: Date,
    pub end: Date,
}

impl PeriodRange {
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Get the period of width `granularity` that contains `date`.
pub fn period_range(granularity: Granularity, date: Date) -> PeriodRange {
    match granularity {
        Granularity::Day => PeriodRange {
            start: date,
            end: date,
        },
        Granularity::Week => week_bounds(date),
        Granularity::Month => month_bounds(date.year(), date.month()),
    }
}

/// Get the period immediately before `range`.
///
/// Returns `None` if `range` already starts at the earliest representable date.
pub fn previous_period(granularity: Granularity, range: PeriodRange) -> Option<PeriodRange> {
    range
        .start
        .previous_day()
        .map(|date| period_range(granularity, date))
}

/// Get `count` consecutive periods in ascending order, the last of which
/// contains `anchor_date`.
///
/// Returns `None` if the periods would run past the earliest representable date.
pub fn trailing_periods(
    granularity: Granularity,
    anchor_date: Date,
    count: usize,
) -> Option<Vec<PeriodRange>> {
    let mut periods = Vec::with_capacity(count.min(1024));
    let mut current = period_range(granularity, anchor_date);

    for index in 0..count {
        if index > 0 {
            current = previous_period(granularity, current)?;
        }

        periods.push(current);
    }

    periods.reverse();
    Some(periods)
}

/// The canonical, sortable identifier for a period.
///
/// Days look like `2024-01-15`, weeks use the ISO week date of their Monday
/// (`2024-W03`) and months look like `2024-01`.
pub fn period_key(granularity: Granularity, range: PeriodRange) -> String {
    let start = range.start;

    match granularity {
        Granularity::Day => format!(
            "{:04}-{:02}-{:02}",
            start.year(),
            u8::from(start.month()),
            start.day()
        ),
        Granularity::Week => {
            let (year, week, _) = start.to_iso_week_date();
            format!("{year:04}-W{week:02}")
        }
        Granularity::Month => format!("{:04}-{:02}", start.year(), u8::from(start.month())),
    }
}

/// A short label for a period, e.g. "Mon", "This Week", "15 Jan" or "Jan".
pub fn period_label(granularity: Granularity, range: PeriodRange, is_current: bool) -> String {
    match granularity {
        Granularity::Day => weekday_abbrev(range.start.weekday()).to_owned(),
        Granularity::Week if is_current => "This Week".to_owned(),
        Granularity::Week => format!("{} {}", range.start.day(), month_abbrev(range.start.month())),
        Granularity::Month => month_abbrev(range.start.month()).to_owned(),
    }
}

fn week_bounds(anchor_date: Date) -> PeriodRange {
    let days_since_monday = anchor_date.weekday().number_days_from_monday() as i64;
    let start = anchor_date
        .checked_sub(Duration::days(days_since_monday))
        .unwrap_or(Date::MIN);
    let end = start.checked_add(Duration::days(6)).unwrap_or(Date::MAX);

    PeriodRange { start, end }
}

fn month_bounds(year: i32, month: Month) -> PeriodRange {
    let start = Date::from_calendar_date(year, month, 1).expect("invalid month start date");
    let end = Date::from_calendar_date(year, month, last_day_of_month(year, month))
        .expect("invalid month end date");

    PeriodRange { start, end }
}

fn last_day_of_month(year: i32, month: Month) -> u8 {
    match month {
        Month::January
        | Month::March
        | Month::May
        | Month::July
        | Month::August
        | Month::October
        | Month::December => 31,
        Month::April | Month::June | Month::September | Month::November => 30,
        Month::February => {
            if time::util::is_leap_year(year) {
                29
            } else {
                28
            }
        }
    }
}

fn weekday_abbrev(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Monday => "Mon",
        Weekday::Tuesday => "Tue",
        Weekday::Wednesday => "Wed",
        Weekday::Thursday => "Thu",
        Weekday::Friday => "Fri",
        Weekday::Saturday => "Sat",
        Weekday::Sunday => "Sun",
    }
}

fn month_abbrev(month: Month) -> &'static str {
    match month {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    }
}
