use serde::Serialize;

use super::layout::Layout;

/// Counts above this are displayed as "99+".
pub const BADGE_CAP: usize = 99;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BadgeAnchor {
    AnnounceButton,
    SidebarNotifications,
}

/// The unread-count badge. Created once, then only its text and visibility change.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Badge {
    pub anchors: Vec<BadgeAnchor>,
    pub text: String,
    pub visible: bool,
}

pub fn badge_text(count: usize) -> String {
    if count > BADGE_CAP {
        format!("{BADGE_CAP}+")
    } else {
        count.to_string()
    }
}

#[derive(Debug, Default)]
pub struct BadgeState {
    badge: Option<Badge>,
}

impl BadgeState {
    pub fn badge(&self) -> Option<&Badge> {
        self.badge.as_ref()
    }

    /// Reflect `count` in the badge. Returns true when something visible changed.
    ///
    /// The badge is only created once there is something unread and at least
    /// one anchor exists to attach it to.
    pub fn update(&mut self, count: usize, layout: &Layout) -> bool {
        match &mut self.badge {
            None if count == 0 => false,
            None => {
                let mut anchors = Vec::new();
                if layout.announce_button {
                    anchors.push(BadgeAnchor::AnnounceButton);
                }
                if layout.sidebar_notifications {
                    anchors.push(BadgeAnchor::SidebarNotifications);
                }
                if anchors.is_empty() {
                    return false;
                }
                self.badge = Some(Badge {
                    anchors,
                    text: badge_text(count),
                    visible: true,
                });
                true
            }
            Some(badge) => {
                let (text, visible) = if count > 0 {
                    (badge_text(count), true)
                } else {
                    // Hidden, text left as it was.
                    (badge.text.clone(), false)
                };
                let changed = badge.text != text || badge.visible != visible;
                badge.text = text;
                badge.visible = visible;
                changed
            }
        }
    }
}
