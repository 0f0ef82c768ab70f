//! Announcements and the per-viewer feed.
use std::cmp::Reverse;

use log::info;
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::api::{
    models::{Role, Timestamp},
    ApiClient, ApiError,
};

#[derive(Deserialize, Debug, Serialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    Normal,
    High,
    Urgent,
}

#[derive(Deserialize, Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: String,
    pub title: String,
    pub content: String,
    pub priority: Priority,
    #[serde(default)]
    pub target_roles: Vec<Role>,
    #[serde(default)]
    pub target_classes: Vec<String>,
    #[serde(default)]
    pub target_sections: Vec<String>,
    #[serde(default)]
    pub expires_at: Option<Timestamp>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

/// Who is looking at the feed.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewer {
    pub role: Role,
    pub class_id: Option<String>,
    pub section_id: Option<String>,
}

fn targets(list: &[String], value: Option<&String>) -> bool {
    list.is_empty() || value.is_some_and(|value| list.contains(value))
}

impl Announcement {
    /// Active until `expires_at`; no expiry means always active.
    pub fn is_active(&self, now: Timestamp) -> bool {
        self.expires_at.map_or(true, |expires| expires > now)
    }

    /// Empty target lists address everybody.
    pub fn visible_to(&self, viewer: &Viewer) -> bool {
        if viewer.role == Role::Admin {
            return true;
        }
        (self.target_roles.is_empty() || self.target_roles.contains(&viewer.role))
            && targets(&self.target_classes, viewer.class_id.as_ref())
            && targets(&self.target_sections, viewer.section_id.as_ref())
    }
}

/// Active announcements for `viewer`, most urgent and newest first.
pub fn feed<'a>(
    announcements: &'a [Announcement],
    viewer: &Viewer,
    now: Timestamp,
) -> Vec<&'a Announcement> {
    let mut visible = announcements
        .iter()
        .filter(|a| a.is_active(now) && a.visible_to(viewer))
        .collect::<Vec<_>>();
    visible.sort_by_key(|a| (Reverse(a.priority), Reverse(a.created_at)));
    visible
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementDraft {
    pub title: String,
    pub content: String,
    pub priority: Priority,
    pub target_roles: Vec<Role>,
    pub target_classes: Vec<String>,
    pub target_sections: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<Timestamp>,
}

pub async fn list_announcements(api: &ApiClient) -> Result<Vec<Announcement>, ApiError> {
    api.get("/announcements", &[]).await
}

pub async fn create_announcement(
    api: &ApiClient,
    draft: &AnnouncementDraft,
) -> Result<Announcement, ApiError> {
    info!("Publishing announcement {:?}", draft.title);
    api.send_json::<_, Announcement>(Method::POST, "/announcements", draft)
        .await?
        .into_data()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn at(day: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2025, 4, day, 9, 0, 0).unwrap()
    }

    fn announcement(id: &str, priority: Priority, created: u32) -> Announcement {
        Announcement {
            id: id.to_owned(),
            title: id.to_owned(),
            content: String::new(),
            priority,
            target_roles: Vec::new(),
            target_classes: Vec::new(),
            target_sections: Vec::new(),
            expires_at: None,
            created_at: Some(at(created)),
        }
    }

    fn student_viewer() -> Viewer {
        Viewer {
            role: Role::Student,
            class_id: Some("class-7".to_owned()),
            section_id: Some("sec-a".to_owned()),
        }
    }

    #[test]
    fn expiry_decides_activity() {
        let mut a = announcement("a", Priority::Normal, 1);
        assert!(a.is_active(at(20)));
        a.expires_at = Some(at(10));
        assert!(a.is_active(at(9)));
        assert!(!a.is_active(at(10)));
    }

    #[test]
    fn targeting() {
        let viewer = student_viewer();
        let mut a = announcement("a", Priority::Normal, 1);
        assert!(a.visible_to(&viewer));

        a.target_roles = vec![Role::Teacher];
        assert!(!a.visible_to(&viewer));

        a.target_roles = vec![Role::Student, Role::Parent];
        a.target_classes = vec!["class-8".to_owned()];
        assert!(!a.visible_to(&viewer));

        a.target_classes = vec!["class-7".to_owned()];
        a.target_sections = vec!["sec-a".to_owned()];
        assert!(a.visible_to(&viewer));

        let parent = Viewer {
            role: Role::Parent,
            class_id: None,
            section_id: None,
        };
        assert!(!a.visible_to(&parent));
    }

    #[test]
    fn feed_orders_by_priority_then_recency() {
        let mut expired = announcement("expired", Priority::Urgent, 2);
        expired.expires_at = Some(at(3));
        let items = vec![
            announcement("old-normal", Priority::Normal, 1),
            announcement("new-normal", Priority::Normal, 5),
            announcement("urgent", Priority::Urgent, 2),
            announcement("low", Priority::Low, 6),
            expired,
        ];
        let ids = feed(&items, &student_viewer(), at(10))
            .into_iter()
            .map(|a| a.id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["urgent", "new-normal", "old-normal", "low"]);
    }

    #[test]
    fn decode_announcement() {
        let a: Announcement = serde_json::from_str(
            r#"{"id":"n1","title":"Sports day","content":"Bring water","priority":"HIGH",
                "targetRoles":["STUDENT"],"expiresAt":"2025-04-30T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(a.priority, Priority::High);
        assert!(a.is_active(at(29)));
        assert!(a.target_classes.is_empty());
    }
}
