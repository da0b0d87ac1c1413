//! Date parsing and report periods
//!
//! Transactions carry ISO strings (a plain date or a full datetime), while
//! schedules use calendar dates. Everything here works on the date portion.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Parse the date portion of an ISO date or datetime string
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    let head = value.trim().get(..10)?;
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

/// Format a calendar date the way the document stores it
pub fn format_iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Serde adapter for required calendar dates that tolerates datetimes
pub mod iso_date {
    use super::{format_iso_date, parse_iso_date};
    use chrono::NaiveDate;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_iso_date(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_iso_date(&raw).ok_or_else(|| D::Error::custom(format!("invalid date: {}", raw)))
    }
}

/// Serde adapter for optional calendar dates; empty strings and null read as `None`
pub mod iso_date_opt {
    use super::{format_iso_date, parse_iso_date};
    use chrono::NaiveDate;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        date: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => serializer.serialize_some(&format_iso_date(*d)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(s) if s.trim().is_empty() => Ok(None),
            Some(s) => parse_iso_date(&s)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid date: {}", s))),
        }
    }
}

/// Period used to scope aggregate reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "range", rename_all = "lowercase")]
pub enum ReportPeriod {
    /// One calendar month (`month` is 1-12)
    Month { year: i32, month: u32 },
    /// One calendar year
    Year { year: i32 },
    /// Inclusive custom range
    Custom { start: NaiveDate, end: NaiveDate },
    /// No restriction
    All,
}

impl Default for ReportPeriod {
    fn default() -> Self {
        ReportPeriod::All
    }
}

impl ReportPeriod {
    /// The calendar month containing `date`
    pub fn month_of(date: NaiveDate) -> Self {
        ReportPeriod::Month { year: date.year(), month: date.month() }
    }

    /// Check if a date falls within the period
    pub fn contains(&self, date: &NaiveDate) -> bool {
        match *self {
            ReportPeriod::Month { year, month } => date.year() == year && date.month() == month,
            ReportPeriod::Year { year } => date.year() == year,
            ReportPeriod::Custom { start, end } => *date >= start && *date <= end,
            ReportPeriod::All => true,
        }
    }

    /// Check an ISO date string; unparseable dates only match `All`
    pub fn contains_iso(&self, value: &str) -> bool {
        match parse_iso_date(value) {
            Some(date) => self.contains(&date),
            None => matches!(self, ReportPeriod::All),
        }
    }

    /// Human-readable description of the period
    pub fn description(&self) -> String {
        match self {
            ReportPeriod::Month { year, month } => format!("{:04}-{:02}", year, month),
            ReportPeriod::Year { year } => format!("{:04}", year),
            ReportPeriod::Custom { start, end } => format!("{} to {}", start, end),
            ReportPeriod::All => "All Time".to_string(),
        }
    }
}
