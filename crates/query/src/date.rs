//! Date expression resolution.
//!
//! Turns the loose date inputs callers send ("last 30 days", "FY2024",
//! "2024-03-15", "March 5, 2024") into concrete ISO dates. Nothing here
//! fails: an expression that cannot be understood falls back to a default,
//! and the fallback is reported as a [`DateWarning`] next to the value so
//! callers can tell a guessed date from a supplied one.
//!
//! Month arithmetic uses calendar months with end-of-month clamping:
//! `2024-03-31` minus one month is `2024-02-29`. Quarters are three months
//! and years are twelve, so the same rule applies everywhere.

use chrono::{DateTime, Days, Local, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Source of "today" for every relative date computation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Clock {
    /// The local calendar date at the time of the call
    #[default]
    System,
    /// A pinned date, for reproducible compilation and tests
    Fixed(NaiveDate),
}

impl Clock {
    pub fn today(&self) -> NaiveDate {
        match self {
            Clock::System => Local::now().date_naive(),
            Clock::Fixed(date) => *date,
        }
    }
}

/// An inclusive pair of ISO dates, serialized as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl DateRange {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
        }
    }

    /// A range covering a single day.
    pub fn single(date: NaiveDate) -> Self {
        Self::new(date, date)
    }

    /// The year ending today: same calendar day one year back through today.
    pub fn trailing_year(today: NaiveDate) -> Self {
        Self::new(one_year_before(today), today)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start_date, self.end_date)
    }
}

/// Emitted whenever a date was guessed instead of parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWarning {
    /// The expression as the caller sent it
    pub input: String,
    /// What was used instead
    pub fallback: String,
    pub message: String,
}

impl DateWarning {
    fn new(input: &str, fallback: String) -> Self {
        let message = format!("Could not parse date expression '{input}'; using {fallback}");
        Self::with_message(input, fallback, message)
    }

    /// A warning with a caller-chosen message. Logged like every other fallback.
    pub(crate) fn with_message(input: &str, fallback: impl Into<String>, message: String) -> Self {
        let fallback = fallback.into();
        warn!(input = %input, fallback = %fallback, "Date expression fell back to default");
        Self {
            input: input.to_string(),
            fallback,
            message,
        }
    }
}

/// A resolved value plus the warning raised if it had to be guessed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<T> {
    pub value: T,
    pub warning: Option<DateWarning>,
}

impl<T> Resolved<T> {
    fn exact(value: T) -> Self {
        Self {
            value,
            warning: None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.warning.is_some()
    }
}

/// Resolve an expression to a single date.
///
/// Unparseable input resolves to `today` with a warning.
pub fn parse_natural_date(input: &str, today: NaiveDate) -> Resolved<NaiveDate> {
    match resolve_date(input, today) {
        Some(date) => Resolved::exact(date),
        None => Resolved {
            value: today,
            warning: Some(DateWarning::new(input, format!("today ({today})"))),
        },
    }
}

/// Resolve an expression to a start/end pair.
///
/// Relative phrases end today; `today` and `yesterday` collapse to a single
/// day. Unparseable input resolves to the last 30 days with a warning.
pub fn parse_date_range(input: &str, today: NaiveDate) -> Resolved<DateRange> {
    match resolve_range(input, today) {
        Some(range) => Resolved::exact(range),
        None => {
            let range = last_days(today, 30);
            Resolved {
                value: range,
                warning: Some(DateWarning::new(input, format!("the last 30 days ({range})"))),
            }
        }
    }
}

/// Federal fiscal year `year`: October 1 of the prior year through September 30.
pub fn fiscal_year_range(year: i32) -> Option<DateRange> {
    let start = NaiveDate::from_ymd_opt(year.checked_sub(1)?, 10, 1)?;
    let end = NaiveDate::from_ymd_opt(year, 9, 30)?;
    Some(DateRange::new(start, end))
}

/// The same calendar day one year earlier, clamped to month end.
pub fn one_year_before(date: NaiveDate) -> NaiveDate {
    date.checked_sub_months(Months::new(12)).unwrap_or(date)
}

fn last_days(today: NaiveDate, days: u64) -> DateRange {
    let start = today.checked_sub_days(Days::new(days)).unwrap_or(today);
    DateRange::new(start, today)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phrase {
    Today,
    Yesterday,
    DaysAgo(u32),
    LastDays(u32),
    LastWeek,
    LastMonths(u32),
    LastQuarter,
    LastYear,
    YearsAgo(u32),
}

impl Phrase {
    fn parse(input: &str) -> Option<Self> {
        let lowered = input.trim().to_lowercase();
        let tokens: Vec<&str> = lowered.split_whitespace().collect();
        let phrase = match tokens.as_slice() {
            ["today"] => Phrase::Today,
            ["yesterday"] => Phrase::Yesterday,
            [n, "day" | "days", "ago"] => Phrase::DaysAgo(n.parse().ok()?),
            [n, "week" | "weeks", "ago"] => {
                Phrase::DaysAgo(n.parse::<u32>().ok()?.checked_mul(7)?)
            }
            [n, "month" | "months", "ago"] => Phrase::LastMonths(n.parse().ok()?),
            ["last" | "past", "day"] => Phrase::LastDays(1),
            ["last" | "past", n, "day" | "days"] => Phrase::LastDays(n.parse().ok()?),
            ["last" | "past", "week"] => Phrase::LastWeek,
            ["last" | "past", "month"] => Phrase::LastMonths(1),
            ["last" | "past", n, "month" | "months"] => Phrase::LastMonths(n.parse().ok()?),
            ["last" | "past", "quarter"] => Phrase::LastQuarter,
            ["last" | "past", "year"] => Phrase::LastYear,
            [n, "year" | "years", "ago"] => Phrase::YearsAgo(n.parse().ok()?),
            _ => return None,
        };
        Some(phrase)
    }

    /// The single date the phrase points at.
    fn anchor(self, today: NaiveDate) -> Option<NaiveDate> {
        match self {
            Phrase::Today => Some(today),
            Phrase::Yesterday => today.checked_sub_days(Days::new(1)),
            Phrase::DaysAgo(n) | Phrase::LastDays(n) => {
                today.checked_sub_days(Days::new(u64::from(n)))
            }
            Phrase::LastWeek => today.checked_sub_days(Days::new(7)),
            Phrase::LastMonths(n) => today.checked_sub_months(Months::new(n)),
            Phrase::LastQuarter => today.checked_sub_months(Months::new(3)),
            Phrase::LastYear => today.checked_sub_months(Months::new(12)),
            Phrase::YearsAgo(n) => today.checked_sub_months(Months::new(n.checked_mul(12)?)),
        }
    }

    fn range(self, today: NaiveDate) -> Option<DateRange> {
        let anchor = self.anchor(today)?;
        match self {
            Phrase::Today | Phrase::Yesterday => Some(DateRange::single(anchor)),
            _ => Some(DateRange::new(anchor, today)),
        }
    }
}

const CALENDAR_FORMATS: &[&str] = &[
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
];

fn parse_iso(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d").ok()
}

fn parse_calendar(input: &str) -> Option<NaiveDate> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(input) {
        return Some(ts.date_naive());
    }
    CALENDAR_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
}

fn resolve_date(input: &str, today: NaiveDate) -> Option<NaiveDate> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    parse_iso(trimmed)
        .or_else(|| Phrase::parse(trimmed).and_then(|p| p.anchor(today)))
        .or_else(|| parse_calendar(trimmed))
}

/// `FY2024`, `FY 2024`, `fiscal year 2024`.
fn parse_fiscal_phrase(input: &str) -> Option<i32> {
    let lowered = input.trim().to_lowercase();
    let rest = lowered
        .strip_prefix("fiscal year")
        .or_else(|| lowered.strip_prefix("fy"))?;
    rest.trim().parse().ok()
}

fn resolve_range(input: &str, today: NaiveDate) -> Option<DateRange> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(phrase) = Phrase::parse(trimmed) {
        return phrase.range(today);
    }
    if let Some(year) = parse_fiscal_phrase(trimmed) {
        return fiscal_year_range(year);
    }
    if let Some((start, end)) = trimmed.split_once(" to ") {
        let start = resolve_date(start, today)?;
        let end = resolve_date(end, today)?;
        return Some(DateRange::new(start, end));
    }
    resolve_date(trimmed, today).map(DateRange::single)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn today() -> NaiveDate {
        d("2024-03-15")
    }

    fn single(input: &str) -> String {
        let resolved = parse_natural_date(input, today());
        assert!(!resolved.is_fallback(), "{input} should parse");
        resolved.value.to_string()
    }

    fn range(input: &str) -> (String, String) {
        let resolved = parse_date_range(input, today());
        assert!(!resolved.is_fallback(), "{input} should parse");
        (
            resolved.value.start_date.to_string(),
            resolved.value.end_date.to_string(),
        )
    }

    #[test]
    fn iso_date_returned_unchanged() {
        assert_eq!(single("2023-07-04"), "2023-07-04");
    }

    #[test]
    fn yesterday_and_today() {
        assert_eq!(single("yesterday"), "2024-03-14");
        assert_eq!(single("today"), "2024-03-15");
        assert_eq!(single("  Today "), "2024-03-15");
    }

    #[test]
    fn relative_single_dates() {
        assert_eq!(single("10 days ago"), "2024-03-05");
        assert_eq!(single("last 30 days"), "2024-02-14");
        assert_eq!(single("last week"), "2024-03-08");
        assert_eq!(single("last month"), "2024-02-15");
        assert_eq!(single("last 6 months"), "2023-09-15");
        assert_eq!(single("last quarter"), "2023-12-15");
        assert_eq!(single("last year"), "2023-03-15");
        assert_eq!(single("2 years ago"), "2022-03-15");
        assert_eq!(single("2 weeks ago"), "2024-03-01");
        assert_eq!(single("6 months ago"), "2023-09-15");
    }

    #[test]
    fn month_subtraction_clamps_to_month_end() {
        let resolved = parse_natural_date("last month", d("2024-03-31"));
        assert_eq!(resolved.value, d("2024-02-29"));
        let resolved = parse_natural_date("last year", d("2024-02-29"));
        assert_eq!(resolved.value, d("2023-02-28"));
    }

    #[test]
    fn calendar_fallback_formats() {
        assert_eq!(single("03/05/2024"), "2024-03-05");
        assert_eq!(single("2024/03/05"), "2024-03-05");
        assert_eq!(single("March 5, 2024"), "2024-03-05");
        assert_eq!(single("Mar 5, 2024"), "2024-03-05");
        assert_eq!(single("5 March 2024"), "2024-03-05");
        assert_eq!(single("2024-03-05T14:30:00Z"), "2024-03-05");
    }

    #[test]
    fn unparseable_single_date_falls_back_to_today() {
        let resolved = parse_natural_date("the day after the election", today());
        assert_eq!(resolved.value, today());
        let warning = resolved.warning.unwrap();
        assert_eq!(warning.input, "the day after the election");
        assert!(warning.fallback.contains("2024-03-15"));
        assert!(warning.message.contains("Could not parse"));
    }

    #[test]
    fn last_thirty_days_range() {
        assert_eq!(
            range("last 30 days"),
            ("2024-02-14".into(), "2024-03-15".into())
        );
    }

    #[test]
    fn relative_ranges_end_today() {
        assert_eq!(range("last week"), ("2024-03-08".into(), "2024-03-15".into()));
        assert_eq!(range("last month"), ("2024-02-15".into(), "2024-03-15".into()));
        assert_eq!(range("last 3 months"), ("2023-12-15".into(), "2024-03-15".into()));
        assert_eq!(range("last year"), ("2023-03-15".into(), "2024-03-15".into()));
        assert_eq!(range("5 days ago"), ("2024-03-10".into(), "2024-03-15".into()));
    }

    #[test]
    fn today_and_yesterday_ranges_collapse() {
        assert_eq!(range("today"), ("2024-03-15".into(), "2024-03-15".into()));
        assert_eq!(range("yesterday"), ("2024-03-14".into(), "2024-03-14".into()));
    }

    #[test]
    fn explicit_span_and_fiscal_phrases() {
        assert_eq!(
            range("2024-01-01 to last week"),
            ("2024-01-01".into(), "2024-03-08".into())
        );
        assert_eq!(range("FY2023"), ("2022-10-01".into(), "2023-09-30".into()));
        assert_eq!(
            range("fiscal year 2024"),
            ("2023-10-01".into(), "2024-09-30".into())
        );
        assert_eq!(range("2024-01-10"), ("2024-01-10".into(), "2024-01-10".into()));
    }

    #[test]
    fn unparseable_range_falls_back_to_last_thirty_days() {
        let resolved = parse_date_range("since forever", today());
        assert_eq!(resolved.value.start_date, d("2024-02-14"));
        assert_eq!(resolved.value.end_date, d("2024-03-15"));
        assert!(resolved.warning.unwrap().fallback.contains("last 30 days"));

        let resolved = parse_date_range("2024-01-01 to whenever", today());
        assert!(resolved.is_fallback());
    }

    #[test]
    fn fiscal_year_boundaries() {
        let fy = fiscal_year_range(2024).unwrap();
        assert_eq!(fy.start_date, d("2023-10-01"));
        assert_eq!(fy.end_date, d("2024-09-30"));
        assert!(fiscal_year_range(i32::MIN).is_none());
    }

    #[test]
    fn trailing_year_from_today() {
        let window = DateRange::trailing_year(today());
        assert_eq!(window.to_string(), "2023-03-15 to 2024-03-15");
    }

    #[test]
    fn range_serializes_as_iso_strings() {
        let json = serde_json::to_value(DateRange::new(d("2023-10-01"), d("2024-09-30"))).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"start_date": "2023-10-01", "end_date": "2024-09-30"})
        );
    }

    #[test]
    fn fixed_clock_is_pinned() {
        assert_eq!(Clock::Fixed(today()).today(), today());
    }
}
