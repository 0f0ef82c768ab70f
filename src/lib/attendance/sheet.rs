use chrono::NaiveDate;
use log::info;
use thiserror::Error;

use super::dates::format_date;
use crate::api::{
    models::{AttendanceRecord, AttendanceStatus, ClassScope, DailyAttendance, Student},
    ApiClient, ApiError,
};

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("student {0} is not enrolled in this section")]
    UnknownStudent(String),
    #[error("no students to mark")]
    Empty,
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// One day's attendance for a section, edited locally and submitted at once.
#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceSheet {
    pub scope: ClassScope,
    pub date: NaiveDate,
    pub records: Vec<AttendanceRecord>,
}

impl AttendanceSheet {
    /// Everybody starts out present.
    pub fn for_students(scope: ClassScope, date: NaiveDate, students: &[Student]) -> Self {
        let records = students
            .iter()
            .map(|student| AttendanceRecord {
                student_id: student.id.clone(),
                status: AttendanceStatus::Present,
                remarks: None,
                class_id: scope.class_id.clone(),
                section_id: scope.section_id.clone(),
            })
            .collect();
        Self {
            scope,
            date,
            records,
        }
    }

    pub fn set_status(
        &mut self,
        student_id: &str,
        status: AttendanceStatus,
        remarks: Option<String>,
    ) -> Result<(), SheetError> {
        let record = self
            .records
            .iter_mut()
            .find(|record| record.student_id == student_id)
            .ok_or_else(|| SheetError::UnknownStudent(student_id.to_owned()))?;
        record.status = status;
        record.remarks = remarks;
        Ok(())
    }

    pub fn count(&self, status: AttendanceStatus) -> usize {
        self.records
            .iter()
            .filter(|record| record.status == status)
            .count()
    }

    pub fn to_request(&self) -> DailyAttendance {
        DailyAttendance {
            date: format_date(self.date),
            class_id: self.scope.class_id.clone(),
            section_id: self.scope.section_id.clone(),
            records: self.records.clone(),
        }
    }

    /// Saving the same date again replaces what was stored before.
    pub async fn submit(&self, api: &ApiClient) -> Result<Option<String>, SheetError> {
        if self.records.is_empty() {
            return Err(SheetError::Empty);
        }
        info!(
            "Saving attendance for {}: {} present, {} absent",
            self.date,
            self.count(AttendanceStatus::Present),
            self.count(AttendanceStatus::Absent)
        );
        Ok(api.submit_daily_attendance(&self.to_request()).await?)
    }
}
