//! Module with models compatible with the school backend's REST API
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClassInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub grade_level: Option<u32>,
}

#[derive(Deserialize, Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: String,
    pub name: String,
    pub class_id: String,
}

#[derive(Deserialize, Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub roll_number: Option<String>,
}

impl Student {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Deserialize, Debug, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    HalfDay,
    Excused,
}

#[derive(Deserialize, Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub student_id: String,
    pub status: AttendanceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    pub class_id: String,
    pub section_id: String,
}

/// Body of `POST /attendance/daily`.
#[derive(Deserialize, Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyAttendance {
    pub date: String,
    pub class_id: String,
    pub section_id: String,
    pub records: Vec<AttendanceRecord>,
}

/// Summary returned by `/attendance/stats`. Dates come in whatever
/// format the endpoint felt like producing.
#[derive(Deserialize, Debug, Serialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceStats {
    #[serde(default)]
    pub total_days: u32,
    #[serde(default)]
    pub recorded_dates: Vec<String>,
}

#[derive(Deserialize, Debug, Serialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PendingDays {
    #[serde(default)]
    pub pending_dates: Vec<String>,
}

#[derive(Deserialize, Debug, Serialize, Clone, PartialEq)]
pub struct Holiday {
    pub date: String,
    pub name: String,
}

/// A saved per-subject result as the backend reports it.
#[derive(Deserialize, Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubjectResult {
    pub student_id: String,
    pub subject_id: String,
    pub academic_year: String,
    pub term: String,
    #[serde(default)]
    pub theory_marks: f64,
    #[serde(default)]
    pub practical_marks: f64,
    #[serde(default)]
    pub is_locked: Option<bool>,
}

/// Body of `POST /results/subject`.
#[derive(Deserialize, Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubjectResultInput {
    pub student_id: String,
    pub class_id: String,
    pub section_id: String,
    pub subject_id: String,
    pub academic_year: String,
    pub term: String,
    pub theory_marks: f64,
    pub practical_marks: f64,
    pub total_marks: f64,
}

#[derive(Deserialize, Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecalculateRequest {
    pub class_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_id: Option<String>,
    pub academic_year: String,
    pub term: String,
}

#[derive(Deserialize, Debug, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Teacher,
    Student,
    Parent,
}

#[derive(Deserialize, Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Deserialize, Debug, Serialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Deserialize, Debug, Serialize, Clone, PartialEq)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Debug, Serialize, Clone, PartialEq)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

pub type Timestamp = DateTime<Utc>;

/// The class + section pair most views are scoped to.
#[derive(Deserialize, Debug, Serialize, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub struct ClassScope {
    pub class_id: String,
    pub section_id: String,
}
