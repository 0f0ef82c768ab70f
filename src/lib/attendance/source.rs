use std::collections::BTreeSet;

use chrono::NaiveDate;
use futures::future;
use log::{info, warn};

use super::{
    calendar::{build_calendar, CalendarDay, CalendarInputs},
    dates::{format_date, normalize_date, Month},
};
use crate::api::{
    models::{AttendanceRecord, ClassScope, Holiday},
    ApiClient, ApiError,
};

/// Anything that can provide the raw data behind an attendance calendar.
#[allow(async_fn_in_trait)]
pub trait AttendanceSource {
    async fn pending_dates(&self, scope: &ClassScope) -> Result<Vec<String>, ApiError>;
    async fn recorded_dates(&self, scope: &ClassScope, month: Month)
        -> Result<Vec<String>, ApiError>;
    async fn daily_records(
        &self,
        scope: &ClassScope,
        date: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, ApiError>;
    async fn holiday_list(&self) -> Result<Vec<Holiday>, ApiError>;
}

/// Talks to the backend's attendance endpoints.
impl AttendanceSource for ApiClient {
    async fn pending_dates(&self, scope: &ClassScope) -> Result<Vec<String>, ApiError> {
        Ok(self.pending_days(scope).await?.pending_dates)
    }

    async fn recorded_dates(
        &self,
        scope: &ClassScope,
        month: Month,
    ) -> Result<Vec<String>, ApiError> {
        Ok(self
            .attendance_stats(scope, &month.to_string())
            .await?
            .recorded_dates)
    }

    async fn daily_records(
        &self,
        scope: &ClassScope,
        date: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, ApiError> {
        self.daily_attendance(scope, &format_date(date)).await
    }

    async fn holiday_list(&self) -> Result<Vec<Holiday>, ApiError> {
        self.holidays().await
    }
}

/// Dates of `month` that really have attendance saved.
///
/// Stats only hint at recorded days; each hinted day is confirmed against
/// the daily endpoint. A failed confirmation leaves the day unmarked.
pub async fn marked_dates<S: AttendanceSource>(
    source: &S,
    scope: &ClassScope,
    month: Month,
) -> Result<Vec<String>, ApiError> {
    let candidates = source
        .recorded_dates(scope, month)
        .await?
        .iter()
        .filter_map(|raw| {
            let date = normalize_date(raw);
            if date.is_none() {
                warn!("Ignoring unparsable recorded date {:?}", raw);
            }
            date
        })
        .filter(|date| month.contains(*date))
        .collect::<BTreeSet<_>>();

    let confirmed = future::join_all(candidates.into_iter().map(|date| async move {
        (date, source.daily_records(scope, date).await)
    }))
    .await
    .into_iter()
    .filter_map(|(date, records)| match records {
        Ok(records) if !records.is_empty() => Some(format_date(date)),
        Ok(_) => None,
        Err(err) => {
            warn!("Could not confirm attendance for {}: {}", date, err);
            None
        }
    })
    .collect::<Vec<_>>();
    Ok(confirmed)
}

/// Fetches everything a month view needs and classifies it.
pub async fn load_calendar<S: AttendanceSource>(
    source: &S,
    scope: &ClassScope,
    month: Month,
    today: NaiveDate,
) -> Result<Vec<CalendarDay>, ApiError> {
    info!(
        "Loading attendance calendar for class {} section {} in {}",
        scope.class_id, scope.section_id, month
    );
    let (pending, marked, holidays) = futures::join!(
        source.pending_dates(scope),
        marked_dates(source, scope, month),
        source.holiday_list()
    );
    let (pending, marked, holidays) = (pending?, marked?, holidays?);
    info!(
        "Got {} pending, {} marked dates and {} holidays",
        pending.len(),
        marked.len(),
        holidays.len()
    );
    let inputs = CalendarInputs::from_raw(
        pending.iter().map(String::as_str),
        marked.iter().map(String::as_str),
        &holidays,
    );
    Ok(build_calendar(month, today, &inputs))
}
