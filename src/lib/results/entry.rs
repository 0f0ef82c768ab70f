use futures::future;
use log::{debug, info};
use reqwest::Method;
use thiserror::Error;

use super::models::{ResultRow, ResultScope};
use crate::{
    api::{
        models::{ClassScope, RecalculateRequest, Student, SubjectResult, SubjectResultInput},
        ApiClient, ApiError,
    },
    batch::BatchOutcome,
};

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("there are no editable results to save")]
    NothingToSave,
}

/// The result endpoints the entry table needs.
#[allow(async_fn_in_trait)]
pub trait ResultsBackend {
    async fn enrolled_students(&self, scope: &ClassScope) -> Result<Vec<Student>, ApiError>;
    async fn saved_results(&self, scope: &ResultScope) -> Result<Vec<SubjectResult>, ApiError>;
    async fn save_result(&self, input: &SubjectResultInput) -> Result<(), ApiError>;
    async fn recalculate(&self, request: &RecalculateRequest) -> Result<Option<String>, ApiError>;
}

impl ResultsBackend for ApiClient {
    async fn enrolled_students(&self, scope: &ClassScope) -> Result<Vec<Student>, ApiError> {
        self.students(scope).await
    }

    async fn saved_results(&self, scope: &ResultScope) -> Result<Vec<SubjectResult>, ApiError> {
        self.get(
            "/results/subject",
            &[
                ("classId", scope.class_id.as_str()),
                ("sectionId", scope.section_id.as_str()),
                ("subjectId", scope.subject_id.as_str()),
                ("academicYear", scope.academic_year.as_str()),
                ("term", scope.term.as_str()),
            ],
        )
        .await
    }

    async fn save_result(&self, input: &SubjectResultInput) -> Result<(), ApiError> {
        self.send_json::<_, serde_json::Value>(Method::POST, "/results/subject", input)
            .await?
            .into_ack()
            .map(|_| ())
    }

    async fn recalculate(&self, request: &RecalculateRequest) -> Result<Option<String>, ApiError> {
        self.send_json::<_, serde_json::Value>(Method::POST, "/results/recalculate", request)
            .await?
            .into_ack()
    }
}

/// Builds the entry table: every enrolled student, overlaid with whatever
/// has been saved for the same subject, year and term.
pub async fn load_results<B: ResultsBackend>(
    backend: &B,
    scope: &ResultScope,
) -> Result<Vec<ResultRow>, ApiError> {
    info!(
        "Loading {} results for class {} section {} ({} {})",
        scope.subject_id, scope.class_id, scope.section_id, scope.academic_year, scope.term
    );
    let class_scope = scope.class_scope();
    let (students, saved) = futures::join!(
        backend.enrolled_students(&class_scope),
        backend.saved_results(scope)
    );
    let (students, saved) = (students?, saved?);

    let mut rows = students
        .iter()
        .map(|student| ResultRow::blank(student.id.clone(), student.display_name()))
        .collect::<Vec<_>>();

    for record in saved.iter().filter(|record| {
        record.subject_id == scope.subject_id
            && record.academic_year == scope.academic_year
            && record.term == scope.term
    }) {
        let Some(row) = rows.iter_mut().find(|row| row.student_id == record.student_id) else {
            debug!("Saved result for unenrolled student {}", record.student_id);
            continue;
        };
        row.is_locked = record.is_locked.unwrap_or(true);
        row.is_editable = !row.is_locked;
        row.theory_marks = record.theory_marks;
        row.practical_marks = record.practical_marks;
    }

    info!(
        "Loaded {} rows, {} locked",
        rows.len(),
        rows.iter().filter(|row| row.is_locked).count()
    );
    Ok(rows)
}

/// Submits every editable row, one request each, all in flight at once.
///
/// There is no transaction: on partial failure some rows are saved and
/// others are not, and the table has to be reloaded.
pub async fn save_results<B: ResultsBackend>(
    backend: &B,
    scope: &ResultScope,
    rows: &[ResultRow],
) -> Result<BatchOutcome<String, ()>, SaveError> {
    let inputs = rows
        .iter()
        .filter(|row| row.is_editable)
        .map(|row| row.to_input(scope))
        .collect::<Vec<_>>();
    if inputs.is_empty() {
        return Err(SaveError::NothingToSave);
    }
    info!("Saving {} results", inputs.len());

    let results = future::join_all(inputs.iter().map(|input| async move {
        (input.student_id.clone(), backend.save_result(input).await)
    }))
    .await;
    Ok(BatchOutcome::collect(results))
}

/// Asks the backend to rebuild overall results; lock state is untouched.
pub async fn recalculate_results<B: ResultsBackend>(
    backend: &B,
    class_id: &str,
    section_id: Option<&str>,
    academic_year: &str,
    term: &str,
) -> Result<Option<String>, ApiError> {
    info!(
        "Recalculating results for class {} section {:?} ({} {})",
        class_id, section_id, academic_year, term
    );
    backend
        .recalculate(&RecalculateRequest {
            class_id: class_id.to_owned(),
            section_id: section_id.map(str::to_owned),
            academic_year: academic_year.to_owned(),
            term: term.to_owned(),
        })
        .await
}
