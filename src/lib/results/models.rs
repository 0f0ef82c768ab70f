use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::models::{ClassScope, SubjectResultInput};

/// Which subject results a view works on.
#[derive(Deserialize, Debug, Serialize, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct ResultScope {
    pub class_id: String,
    pub section_id: String,
    pub subject_id: String,
    pub academic_year: String,
    pub term: String,
}

impl ResultScope {
    pub fn class_scope(&self) -> ClassScope {
        ClassScope {
            class_id: self.class_id.clone(),
            section_id: self.section_id.clone(),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum EditError {
    #[error("result for student {0} is locked")]
    Locked(String),
    #[error("marks must be finite and not negative")]
    InvalidMarks,
}

/// One student's marks in the entry table.
///
/// `is_locked` comes from the backend; the client never clears it.
#[derive(Deserialize, Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResultRow {
    pub student_id: String,
    pub student_name: String,
    pub theory_marks: f64,
    pub practical_marks: f64,
    pub is_editable: bool,
    pub is_locked: bool,
}

impl ResultRow {
    pub fn blank(student_id: String, student_name: String) -> Self {
        Self {
            student_id,
            student_name,
            theory_marks: 0.0,
            practical_marks: 0.0,
            is_editable: true,
            is_locked: false,
        }
    }

    pub fn total(&self) -> f64 {
        self.theory_marks + self.practical_marks
    }

    pub fn set_marks(&mut self, theory: f64, practical: f64) -> Result<(), EditError> {
        if self.is_locked || !self.is_editable {
            return Err(EditError::Locked(self.student_id.clone()));
        }
        if !theory.is_finite() || !practical.is_finite() || theory < 0.0 || practical < 0.0 {
            return Err(EditError::InvalidMarks);
        }
        self.theory_marks = theory;
        self.practical_marks = practical;
        Ok(())
    }

    pub fn to_input(&self, scope: &ResultScope) -> SubjectResultInput {
        SubjectResultInput {
            student_id: self.student_id.clone(),
            class_id: scope.class_id.clone(),
            section_id: scope.section_id.clone(),
            subject_id: scope.subject_id.clone(),
            academic_year: scope.academic_year.clone(),
            term: scope.term.clone(),
            theory_marks: self.theory_marks,
            practical_marks: self.practical_marks,
            total_marks: self.total(),
        }
    }
}

/// Parses `STUDENT_ID=THEORY/PRACTICAL`, e.g. `stu-12=58/17.5`.
pub fn parse_mark_entry(entry: &str) -> Result<(String, f64, f64), String> {
    let (student_id, marks) = entry
        .split_once('=')
        .ok_or_else(|| format!("{:?} is not STUDENT_ID=THEORY/PRACTICAL", entry))?;
    let (theory, practical) = marks
        .split_once('/')
        .ok_or_else(|| format!("{:?} is missing the practical marks", entry))?;
    let theory = theory
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("bad theory marks in {:?}", entry))?;
    let practical = practical
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("bad practical marks in {:?}", entry))?;
    Ok((student_id.trim().to_owned(), theory, practical))
}
