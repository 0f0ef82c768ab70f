//! Date parsing for the formats different endpoints produce.
use std::{fmt, str::FromStr};

use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveDateTime};

/// Parses `YYYY-MM-DD`, ISO timestamps and `DD/MM/YYYY`.
///
/// Timestamps keep the calendar date as written, no timezone shift.
pub fn normalize_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%d/%m/%Y") {
        return Some(date);
    }
    if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(stamp.naive_local().date());
    }
    if let Ok(stamp) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(stamp.date());
    }
    raw.split_once('T')
        .and_then(|(day, _)| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
}

pub fn canonical_date(raw: &str) -> Option<String> {
    normalize_date(raw).map(format_date)
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// A calendar month. Only months with a neighbour on both sides exist,
/// so the padded grid around one is always representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    first: NaiveDate,
}

impl Month {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        first.checked_add_months(Months::new(1))?;
        first.checked_sub_months(Months::new(1))?;
        Some(Self { first })
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            first: date.with_day(1).unwrap_or(date),
        }
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn last_day(&self) -> NaiveDate {
        self.first
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year() && date.month() == self.month()
    }

    /// `None` at the edge of the representable calendar.
    pub fn next(&self) -> Option<Self> {
        let first = self.first.checked_add_months(Months::new(1))?;
        Month::new(first.year(), first.month())
    }

    pub fn previous(&self) -> Option<Self> {
        let first = self.first.checked_sub_months(Months::new(1))?;
        Month::new(first.year(), first.month())
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for Month {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((year, month)) = s.trim().split_once('-') else {
            return Err("month must be YYYY-MM".to_owned());
        };
        let year = year
            .parse::<i32>()
            .map_err(|_| "month year must be numeric".to_owned())?;
        let month = month
            .parse::<u32>()
            .map_err(|_| "month must be YYYY-MM".to_owned())?;
        if !(1..=12).contains(&month) {
            return Err("month must be between 01 and 12".to_owned());
        }
        Month::new(year, month).ok_or_else(|| format!("{} is outside the supported calendar", s.trim()))
    }
}
