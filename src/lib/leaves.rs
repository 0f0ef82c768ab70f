//! Leave applications and the approval flow.
use log::info;
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::api::{ApiClient, ApiError};

#[derive(Deserialize, Debug, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicantType {
    Student,
    Teacher,
    Admin,
}

#[derive(Deserialize, Debug, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl LeaveStatus {
    /// Only a pending application can move, and only once.
    pub fn can_transition_to(self, next: LeaveStatus) -> bool {
        self == LeaveStatus::Pending && next != LeaveStatus::Pending
    }

    pub fn as_query(self) -> &'static str {
        match self {
            LeaveStatus::Pending => "PENDING",
            LeaveStatus::Approved => "APPROVED",
            LeaveStatus::Rejected => "REJECTED",
            LeaveStatus::Cancelled => "CANCELLED",
        }
    }
}

/// What an approver can decide.
#[derive(Deserialize, Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeaveDecision {
    Approved,
    Rejected,
}

impl From<LeaveDecision> for LeaveStatus {
    fn from(decision: LeaveDecision) -> Self {
        match decision {
            LeaveDecision::Approved => LeaveStatus::Approved,
            LeaveDecision::Rejected => LeaveStatus::Rejected,
        }
    }
}

#[derive(Deserialize, Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeaveApplication {
    pub id: String,
    pub applicant_type: ApplicantType,
    #[serde(default)]
    pub applicant_name: Option<String>,
    pub leave_type_id: String,
    pub from_date: String,
    pub to_date: String,
    #[serde(default)]
    pub reason: Option<String>,
    pub status: LeaveStatus,
}

impl LeaveApplication {
    /// Whether approve/reject controls are offered for this application.
    pub fn is_actionable(&self) -> bool {
        self.status == LeaveStatus::Pending
    }
}

#[derive(Serialize, Debug)]
struct StatusUpdate<'a> {
    status: LeaveDecision,
    #[serde(skip_serializing_if = "Option::is_none")]
    remarks: Option<&'a str>,
}

pub async fn list_leaves(
    api: &ApiClient,
    status: Option<LeaveStatus>,
) -> Result<Vec<LeaveApplication>, ApiError> {
    match status {
        Some(status) => api.get("/leaves", &[("status", status.as_query())]).await,
        None => api.get("/leaves", &[]).await,
    }
}

/// Records an approver's decision.
///
/// The current status is not checked here; the backend refuses
/// transitions out of anything but PENDING.
pub async fn update_status(
    api: &ApiClient,
    leave_id: &str,
    decision: LeaveDecision,
    remarks: Option<&str>,
) -> Result<LeaveApplication, ApiError> {
    info!("Setting leave {} to {:?}", leave_id, decision);
    api.send_json::<_, LeaveApplication>(
        Method::PATCH,
        &format!("/leaves/{}/status", leave_id),
        &StatusUpdate {
            status: decision,
            remarks,
        },
    )
    .await?
    .into_data()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_pending_moves() {
        use LeaveStatus::*;
        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Rejected));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(!Pending.can_transition_to(Pending));
        for done in [Approved, Rejected, Cancelled] {
            for next in [Pending, Approved, Rejected, Cancelled] {
                assert!(!done.can_transition_to(next));
            }
        }
    }

    #[test]
    fn decode_and_gate_controls() {
        let leaves: Vec<LeaveApplication> = serde_json::from_str(
            r#"[
                {"id":"l1","applicantType":"STUDENT","leaveTypeId":"sick","fromDate":"2025-04-10","toDate":"2025-04-11","status":"PENDING"},
                {"id":"l2","applicantType":"TEACHER","leaveTypeId":"casual","fromDate":"2025-04-01","toDate":"2025-04-01","status":"APPROVED","reason":"wedding"}
            ]"#,
        )
        .unwrap();
        assert!(leaves[0].is_actionable());
        assert!(!leaves[1].is_actionable());
        assert_eq!(leaves[1].applicant_type, ApplicantType::Teacher);
    }

    #[test]
    fn status_update_body() {
        let body = serde_json::to_value(StatusUpdate {
            status: LeaveDecision::Rejected,
            remarks: Some("exam week"),
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"status": "REJECTED", "remarks": "exam week"})
        );
        assert_eq!(LeaveStatus::from(LeaveDecision::Approved), LeaveStatus::Approved);
    }
}
