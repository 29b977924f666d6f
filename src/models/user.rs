use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::prefs::{PreferenceStore, USERNAME_KEY};

/// The signed-in user as seen by the UI. Read-only for the managers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CurrentUser {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub role: String,
}

impl CurrentUser {
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        let username = username.into();
        Self {
            id: id.into(),
            display_name: username.clone(),
            username,
            role: "user".into(),
        }
    }

    /// Temporary identity used when no authenticated user is available.
    /// The display name comes from the stored username preference, or "Guest".
    pub fn fallback(prefs: &dyn PreferenceStore) -> Self {
        let username = prefs
            .get(USERNAME_KEY)
            .ok()
            .flatten()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "Guest".into());
        Self::new(format!("temp-{}", Utc::now().timestamp_millis()), username)
    }
}
