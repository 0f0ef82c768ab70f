//! Per-day attendance status for a month view.
use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, Days, NaiveDate, Weekday};
use log::{debug, warn};
use serde::Serialize;

use super::dates::{format_date, normalize_date, Month};
use crate::api::models::Holiday;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DayStatus {
    Pending,
    Marked,
    Weekend,
    Holiday,
    Future,
    Other,
}

impl DayStatus {
    fn glyph(self) -> char {
        match self {
            DayStatus::Pending => 'P',
            DayStatus::Marked => 'M',
            DayStatus::Weekend => 'W',
            DayStatus::Holiday => 'H',
            DayStatus::Future => 'F',
            DayStatus::Other => ' ',
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    #[serde(serialize_with = "serialize_date")]
    pub date: NaiveDate,
    pub in_month: bool,
    pub status: DayStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holiday_name: Option<String>,
}

fn serialize_date<S: serde::Serializer>(date: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format_date(*date))
}

/// Normalised date sets the classifier works on.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CalendarInputs {
    pub pending: BTreeSet<NaiveDate>,
    pub marked: BTreeSet<NaiveDate>,
    pub holidays: BTreeMap<NaiveDate, String>,
}

fn normalize_all<'a, I>(kind: &str, raw: I) -> BTreeSet<NaiveDate>
where
    I: IntoIterator<Item = &'a str>,
{
    raw.into_iter()
        .filter_map(|value| {
            let date = normalize_date(value);
            if date.is_none() {
                warn!("Skipping unparsable {} date {:?}", kind, value);
            }
            date
        })
        .collect()
}

impl CalendarInputs {
    /// Builds the sets from raw endpoint strings. Dates that do not parse
    /// are logged and left out.
    pub fn from_raw<'a, P, M>(pending: P, marked: M, holidays: &[Holiday]) -> Self
    where
        P: IntoIterator<Item = &'a str>,
        M: IntoIterator<Item = &'a str>,
    {
        let holidays = holidays
            .iter()
            .filter_map(|holiday| match normalize_date(&holiday.date) {
                Some(date) => Some((date, holiday.name.clone())),
                None => {
                    warn!(
                        "Skipping holiday {:?} with unparsable date {:?}",
                        holiday.name, holiday.date
                    );
                    None
                }
            })
            .collect();
        Self {
            pending: normalize_all("pending", pending),
            marked: normalize_all("marked", marked),
            holidays,
        }
    }
}

/// First match wins; see the ordering of the checks.
pub fn classify_day(
    date: NaiveDate,
    month: Month,
    today: NaiveDate,
    inputs: &CalendarInputs,
) -> DayStatus {
    if !month.contains(date) {
        return DayStatus::Other;
    }
    if date.weekday() == Weekday::Sat {
        return DayStatus::Weekend;
    }
    if inputs.holidays.contains_key(&date) {
        return DayStatus::Holiday;
    }
    if date > today {
        return DayStatus::Future;
    }
    if inputs.marked.contains(&date) {
        return DayStatus::Marked;
    }
    if inputs.pending.contains(&date) || date <= today {
        return DayStatus::Pending;
    }
    DayStatus::Other
}

/// Sunday-first grid for `month`, padded with neighbouring days to whole weeks.
pub fn build_calendar(month: Month, today: NaiveDate, inputs: &CalendarInputs) -> Vec<CalendarDay> {
    let first = month.first_day();
    let last = month.last_day();
    let start = first
        .checked_sub_days(Days::new(u64::from(first.weekday().num_days_from_sunday())))
        .unwrap_or(first);
    let end = last
        .checked_add_days(Days::new(u64::from(6 - last.weekday().num_days_from_sunday())))
        .unwrap_or(last);

    let days = start
        .iter_days()
        .take_while(|date| *date <= end)
        .map(|date| {
            let status = classify_day(date, month, today, inputs);
            CalendarDay {
                date,
                in_month: month.contains(date),
                status,
                holiday_name: match status {
                    DayStatus::Holiday => inputs.holidays.get(&date).cloned(),
                    _ => None,
                },
            }
        })
        .collect::<Vec<_>>();
    debug!("Built {} calendar cells for {}", days.len(), month);
    days
}

/// Plain text rendering, one row per week.
pub fn render_grid(month: Month, days: &[CalendarDay]) -> String {
    let mut out = format!("{}\n Su  Mo  Tu  We  Th  Fr  Sa\n", month);
    for week in days.chunks(7) {
        let row = week
            .iter()
            .map(|day| {
                if day.in_month {
                    format!("{:>2}{}", day.date.day(), day.status.glyph())
                } else {
                    "  .".to_owned()
                }
            })
            .collect::<Vec<_>>()
            .join(" ");
        out.push_str(&row);
        out.push('\n');
    }
    let holidays = days
        .iter()
        .filter_map(|day| {
            day.holiday_name
                .as_ref()
                .map(|name| format!("{}: {}", format_date(day.date), name))
        })
        .collect::<Vec<_>>();
    out.push_str("P pending  M marked  W weekend  H holiday  F future\n");
    if !holidays.is_empty() {
        out.push_str(&holidays.join("\n"));
        out.push('\n');
    }
    out
}
