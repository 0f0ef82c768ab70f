use futures::future;
use log::info;
use reqwest::Method;

use super::{
    models::{
        AttendanceRecord, AttendanceStats, ClassInfo, ClassScope, DailyAttendance, Holiday,
        PendingDays, Section, Student,
    },
    ApiClient, ApiError,
};
use crate::batch::BatchOutcome;

impl ApiClient {
    pub async fn classes(&self) -> Result<Vec<ClassInfo>, ApiError> {
        self.get("/academic/classes", &[]).await
    }

    pub async fn sections(&self, class_id: &str) -> Result<Vec<Section>, ApiError> {
        self.get("/academic/sections", &[("classId", class_id)]).await
    }

    /// Fetches the sections of several classes at once.
    pub async fn sections_for_classes(
        &self,
        class_ids: &[String],
    ) -> BatchOutcome<String, Vec<Section>> {
        info!("Getting sections for {} classes", class_ids.len());
        let results = future::join_all(
            class_ids
                .iter()
                .map(|id| async move { (id.clone(), self.sections(id).await) }),
        )
        .await;
        BatchOutcome::collect(results)
    }

    pub async fn students(&self, scope: &ClassScope) -> Result<Vec<Student>, ApiError> {
        self.get(
            "/users/students",
            &[("classId", scope.class_id.as_str()), ("sectionId", scope.section_id.as_str())],
        )
        .await
    }

    pub async fn daily_attendance(
        &self,
        scope: &ClassScope,
        date: &str,
    ) -> Result<Vec<AttendanceRecord>, ApiError> {
        self.get(
            "/attendance/daily",
            &[
                ("date", date),
                ("classId", scope.class_id.as_str()),
                ("sectionId", scope.section_id.as_str()),
            ],
        )
        .await
    }

    pub async fn submit_daily_attendance(
        &self,
        attendance: &DailyAttendance,
    ) -> Result<Option<String>, ApiError> {
        info!(
            "Submitting {} attendance records for {}",
            attendance.records.len(),
            attendance.date
        );
        self.send_json::<_, serde_json::Value>(Method::POST, "/attendance/daily", attendance)
            .await?
            .into_ack()
    }

    pub async fn attendance_stats(
        &self,
        scope: &ClassScope,
        month: &str,
    ) -> Result<AttendanceStats, ApiError> {
        self.get(
            "/attendance/stats",
            &[
                ("classId", scope.class_id.as_str()),
                ("sectionId", scope.section_id.as_str()),
                ("month", month),
            ],
        )
        .await
    }

    pub async fn pending_days(&self, scope: &ClassScope) -> Result<PendingDays, ApiError> {
        self.get(
            "/attendance/pending-days",
            &[("classId", scope.class_id.as_str()), ("sectionId", scope.section_id.as_str())],
        )
        .await
    }

    pub async fn holidays(&self) -> Result<Vec<Holiday>, ApiError> {
        self.get("/holidays", &[]).await
    }

    pub async fn upcoming_holidays(&self) -> Result<Vec<Holiday>, ApiError> {
        self.get("/holidays/upcoming", &[]).await
    }
}
