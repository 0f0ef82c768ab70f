use std::fs::File;
use std::io::BufReader;
use std::sync::Mutex;

use portal::api::models::{
    ClassScope, RecalculateRequest, Student, SubjectResult, SubjectResultInput,
};
use portal::api::ApiError;
use portal::results::entry::{load_results, save_results, ResultsBackend};
use portal::results::models::{ResultRow, ResultScope};
use serde::Deserialize;

#[derive(Deserialize)]
struct Fixture {
    students: Vec<Student>,
    saved: Vec<SubjectResult>,
}

/// Keeps saved results in memory the way the backend would.
pub struct TestBackend {
    students: Vec<Student>,
    saved: Mutex<Vec<SubjectResult>>,
}

impl TestBackend {
    fn from_fixture(path: &str) -> Self {
        let fixture: Fixture =
            serde_json::from_reader(BufReader::new(File::open(path).unwrap())).unwrap();
        Self {
            students: fixture.students,
            saved: Mutex::new(fixture.saved),
        }
    }
}

impl ResultsBackend for TestBackend {
    async fn enrolled_students(&self, _scope: &ClassScope) -> Result<Vec<Student>, ApiError> {
        Ok(self.students.clone())
    }

    async fn saved_results(&self, _scope: &ResultScope) -> Result<Vec<SubjectResult>, ApiError> {
        Ok(self.saved.lock().unwrap().clone())
    }

    async fn save_result(&self, input: &SubjectResultInput) -> Result<(), ApiError> {
        let mut saved = self.saved.lock().unwrap();
        saved.retain(|r| {
            !(r.student_id == input.student_id
                && r.subject_id == input.subject_id
                && r.academic_year == input.academic_year
                && r.term == input.term)
        });
        saved.push(SubjectResult {
            student_id: input.student_id.clone(),
            subject_id: input.subject_id.clone(),
            academic_year: input.academic_year.clone(),
            term: input.term.clone(),
            theory_marks: input.theory_marks,
            practical_marks: input.practical_marks,
            is_locked: Some(false),
        });
        Ok(())
    }

    async fn recalculate(&self, _request: &RecalculateRequest) -> Result<Option<String>, ApiError> {
        Ok(None)
    }
}

fn scope() -> ResultScope {
    ResultScope {
        class_id: "cls-10".to_owned(),
        section_id: "sec-10a".to_owned(),
        subject_id: "math".to_owned(),
        academic_year: "2024-2025".to_owned(),
        term: "TERM_1".to_owned(),
    }
}

fn marks(rows: &[ResultRow]) -> Vec<(String, f64, f64, bool)> {
    rows.iter()
        .map(|row| {
            (
                row.student_id.clone(),
                row.theory_marks,
                row.practical_marks,
                row.is_locked,
            )
        })
        .collect()
}

#[tokio::test]
async fn saving_unedited_rows_changes_nothing() {
    let backend = TestBackend::from_fixture("tests/test.results.json");
    let scope = scope();

    let loaded = load_results(&backend, &scope).await.unwrap();
    let outcome = save_results(&backend, &scope, &loaded).await.unwrap();
    assert!(outcome.is_complete());
    // stu-2 is locked and is not sent again
    assert_eq!(outcome.len(), 2);

    let reloaded = load_results(&backend, &scope).await.unwrap();
    assert_eq!(marks(&loaded), marks(&reloaded));
}

#[tokio::test]
async fn table_reflects_the_fixture() {
    let backend = TestBackend::from_fixture("tests/test.results.json");

    let rows = load_results(&backend, &scope()).await.unwrap();

    assert_eq!(
        marks(&rows),
        vec![
            ("stu-1".to_owned(), 61.5, 18.0, false),
            ("stu-2".to_owned(), 70.0, 20.0, true),
            // saved only for another term
            ("stu-3".to_owned(), 0.0, 0.0, false),
        ]
    );
    assert_eq!(rows[0].student_name, "Ada Lovelace");
    assert_eq!(rows[0].total(), 79.5);
}

#[tokio::test]
async fn edits_survive_a_reload() {
    let backend = TestBackend::from_fixture("tests/test.results.json");
    let scope = scope();

    let mut rows = load_results(&backend, &scope).await.unwrap();
    rows[2].set_marks(55.0, 15.0).unwrap();
    assert!(rows[1].set_marks(99.0, 1.0).is_err());
    save_results(&backend, &scope, &rows).await.unwrap();

    let reloaded = load_results(&backend, &scope).await.unwrap();
    assert_eq!(
        marks(&reloaded),
        vec![
            ("stu-1".to_owned(), 61.5, 18.0, false),
            ("stu-2".to_owned(), 70.0, 20.0, true),
            ("stu-3".to_owned(), 55.0, 15.0, false),
        ]
    );
}
