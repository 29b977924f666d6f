use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row of the `announcements` table.
///
/// `read_by` only ever grows: the client appends the current user and writes
/// the whole list back.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Announcement {
    pub id: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub created_by: String,
    /// Missing or null in pushed payloads means nobody has read it yet.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub read_by: Vec<String>,
}

impl Announcement {
    pub fn is_read_by(&self, user_id: &str) -> bool {
        self.read_by.iter().any(|u| u == user_id)
    }

    /// The read-list as it would look after `user_id` acknowledged it.
    pub fn read_by_with(&self, user_id: &str) -> Vec<String> {
        let mut read_by = self.read_by.clone();
        if !self.is_read_by(user_id) {
            read_by.push(user_id.to_string());
        }
        read_by
    }

    /// "You" for the viewer's own announcements, "Admin" otherwise.
    pub fn creator_label(&self, viewer_id: &str) -> &'static str {
        if self.created_by == viewer_id {
            "You"
        } else {
            "Admin"
        }
    }

    /// Local date and time, e.g. `06/01/24 at 14:05`.
    pub fn time_label(&self) -> String {
        let local = self.timestamp.with_timezone(&Local);
        format!("{} at {}", local.format("%x"), local.format("%H:%M"))
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Announcements lacking `user_id` in their read-list, preserving order.
pub fn unread_for(announcements: Vec<Announcement>, user_id: &str) -> Vec<Announcement> {
    announcements
        .into_iter()
        .filter(|a| !a.is_read_by(user_id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn announcement(read_by: &[&str]) -> Announcement {
        Announcement {
            id: "a1".into(),
            text: "Maintenance tonight".into(),
            timestamp: Utc::now(),
            created_by: "admin".into(),
            read_by: read_by.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_read_by_with_is_idempotent() {
        let mut a = announcement(&[]);
        for _ in 0..3 {
            a.read_by = a.read_by_with("u1");
        }
        assert!(a.is_read_by("u1"));
        assert_eq!(a.read_by.iter().filter(|u| *u == "u1").count(), 1);
    }

    #[test]
    fn test_read_by_with_does_not_duplicate() {
        let a = announcement(&["u1"]);
        assert_eq!(a.read_by_with("u1"), vec!["u1".to_string()]);
        assert_eq!(a.read_by_with("u2"), vec!["u1".to_string(), "u2".to_string()]);
    }

    #[test]
    fn test_unread_filter_keeps_order() {
        let mut first = announcement(&[]);
        first.id = "first".into();
        let read = announcement(&["me"]);
        let mut last = announcement(&["someone"]);
        last.id = "last".into();

        let unread = unread_for(vec![first, read, last], "me");
        let ids: Vec<_> = unread.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, ["first", "last"]);
    }

    #[test]
    fn test_payload_with_null_read_by() {
        let json = r#"{"id":"x","text":"hi","timestamp":"2024-06-01T10:00:00.123+00:00","created_by":"admin","read_by":null}"#;
        let a: Announcement = serde_json::from_str(json).unwrap();
        assert!(a.read_by.is_empty());

        let json = r#"{"id":"x","text":"hi","timestamp":"2024-06-01T10:00:00+00:00","created_by":"admin"}"#;
        let a: Announcement = serde_json::from_str(json).unwrap();
        assert!(a.read_by.is_empty());
    }

    #[test]
    fn test_creator_label() {
        let a = announcement(&[]);
        assert_eq!(a.creator_label("admin"), "You");
        assert_eq!(a.creator_label("u1"), "Admin");
    }
}
