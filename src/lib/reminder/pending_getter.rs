use std::collections::{BTreeMap, BTreeSet};

use futures::future;
use log::{error, info};

use super::models::ClassTeacher;
use crate::{
    api::{
        models::{ClassScope, Holiday},
        ApiClient,
    },
    batch::BatchOutcome,
};

/// A trait, necessary for every entity that will be used for getting pending attendance days.
#[allow(async_fn_in_trait)]
pub trait PendingDaysGetter {
    async fn get_pending_days(
        &self,
        teachers: &[ClassTeacher],
    ) -> BTreeMap<ClassScope, Vec<String>>;

    /// Holidays are never owed attendance.
    async fn get_holidays(&self) -> Vec<Holiday>;
}

/// Allows to use ApiClient for getting pending days via requests to the backend.
///
/// Sections whose request failed are left out of the result.
impl PendingDaysGetter for ApiClient {
    async fn get_pending_days(
        &self,
        teachers: &[ClassTeacher],
    ) -> BTreeMap<ClassScope, Vec<String>> {
        let scopes = teachers
            .iter()
            .map(ClassTeacher::scope)
            .collect::<BTreeSet<_>>();
        let outcome = BatchOutcome::collect(
            future::join_all(scopes.into_iter().map(|scope| async move {
                let pending = self.pending_days(&scope).await.map(|p| p.pending_dates);
                (scope, pending)
            }))
            .await,
        );
        if !outcome.is_complete() {
            error!("{}", outcome.summary("pending day lookups"));
        }
        info!("Collected pending days for {} sections", outcome.succeeded.len());
        outcome.succeeded.into_iter().collect()
    }

    async fn get_holidays(&self) -> Vec<Holiday> {
        match self.holidays().await {
            Ok(holidays) => {
                info!("Got {} holidays", holidays.len());
                holidays
            }
            Err(err) => {
                error!("Could not get holidays, reminding about every pending day: {}", err);
                Vec::new()
            }
        }
    }
}
