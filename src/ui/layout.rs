/// Which anchors and controls exist on the page the managers drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// Announcement button in the admin controls; primary badge anchor.
    pub announce_button: bool,
    /// Notifications entry in the sidebar; gets a copy of the badge.
    pub sidebar_notifications: bool,
    /// "Mark read" control in the chat header.
    pub mark_read_control: bool,
    /// Theme picker popover with one option per catalog entry.
    pub theme_picker: bool,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            announce_button: true,
            sidebar_notifications: true,
            mark_read_control: true,
            theme_picker: true,
        }
    }
}

impl Layout {
    /// A page with none of the optional anchors.
    pub fn bare() -> Self {
        Self {
            announce_button: false,
            sidebar_notifications: false,
            mark_read_control: false,
            theme_picker: false,
        }
    }
}
