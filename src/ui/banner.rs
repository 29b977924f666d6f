use serde::Serialize;

use crate::models::announcement::Announcement;

pub type BannerId = u64;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BannerKind {
    /// Pushed while the page was open. Dismisses itself.
    New,
    /// Was already unread when the page loaded. Stays until acted on.
    Pending,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BannerPhase {
    Shown,
    /// Hidden, removed once the fade finishes.
    Fading,
}

/// A dismissible notification for a single announcement.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Banner {
    pub id: BannerId,
    pub announcement_id: String,
    pub kind: BannerKind,
    pub phase: BannerPhase,
    pub title: &'static str,
    pub icon: &'static str,
    pub text: String,
    pub creator: &'static str,
    pub time: String,
    /// Count shown on the "View All" action, taken when the banner was built.
    pub unread_count: usize,
}

impl Banner {
    pub fn new(
        id: BannerId,
        announcement: &Announcement,
        kind: BannerKind,
        viewer_id: &str,
        unread_count: usize,
    ) -> Self {
        let title = match kind {
            BannerKind::New => "📢 New Announcement",
            BannerKind::Pending => "📬 Pending Announcement",
        };
        Self {
            id,
            announcement_id: announcement.id.clone(),
            kind,
            phase: BannerPhase::Shown,
            title,
            icon: "announce",
            text: announcement.text.clone(),
            creator: announcement.creator_label(viewer_id),
            time: announcement.time_label(),
            unread_count,
        }
    }

    pub fn auto_dismisses(&self) -> bool {
        self.kind == BannerKind::New
    }

    pub fn view_all_label(&self) -> String {
        format!("View All ({})", self.unread_count)
    }
}
