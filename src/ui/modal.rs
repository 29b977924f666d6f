use serde::Serialize;

use crate::models::announcement::Announcement;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ModalItem {
    pub announcement_id: String,
    pub creator: &'static str,
    pub time: String,
    pub text: String,
    pub read: bool,
}

impl ModalItem {
    /// "checkmark" for read items, "notification" for unread ones.
    pub fn status_icon(&self) -> &'static str {
        if self.read {
            "checkmark"
        } else {
            "notification"
        }
    }
}

/// The "all announcements" list.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AnnouncementsModal {
    pub items: Vec<ModalItem>,
    /// Taken from the cached unread set when the modal opened.
    pub unread_count: usize,
}

impl AnnouncementsModal {
    pub fn build(announcements: &[Announcement], viewer_id: &str, unread_count: usize) -> Self {
        let items = announcements
            .iter()
            .map(|a| ModalItem {
                announcement_id: a.id.clone(),
                creator: a.creator_label(viewer_id),
                time: a.time_label(),
                text: a.text.clone(),
                read: a.is_read_by(viewer_id),
            })
            .collect();
        Self {
            items,
            unread_count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The bulk control is only offered while something is unread.
    pub fn shows_mark_all(&self) -> bool {
        self.unread_count > 0
    }

    /// "3 unread", or None when the header badge is hidden.
    pub fn unread_label(&self) -> Option<String> {
        self.shows_mark_all()
            .then(|| format!("{} unread", self.unread_count))
    }

    /// Flip one item to read. Returns false if it was unknown or already read.
    pub fn mark_item_read(&mut self, announcement_id: &str) -> bool {
        match self
            .items
            .iter_mut()
            .find(|i| i.announcement_id == announcement_id)
        {
            Some(item) if !item.read => {
                item.read = true;
                self.unread_count = self.unread_count.saturating_sub(1);
                true
            }
            _ => false,
        }
    }

    pub fn mark_all_read(&mut self) {
        for item in &mut self.items {
            item.read = true;
        }
        self.unread_count = 0;
    }
}
