use serde::Serialize;

use crate::models::theme::Theme;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PickerState {
    #[default]
    Closed,
    Open,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NoticePhase {
    Shown,
    Fading,
}

/// Confirmation shown after the user picks a theme.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ThemeNotice {
    pub theme_key: &'static str,
    pub icon: &'static str,
    pub title: &'static str,
    pub description: String,
    pub pearls: &'static str,
    pub phase: NoticePhase,
}

impl ThemeNotice {
    pub fn for_theme(theme: &Theme) -> Self {
        Self {
            theme_key: theme.key,
            icon: theme.icon,
            title: "Theme Applied",
            description: format!("{} • {}", theme.name, theme.description),
            pearls: if theme.has_pearls {
                "✨ With Chardonnay Pearls"
            } else {
                ""
            },
            phase: NoticePhase::Shown,
        }
    }
}

/// A key press as delivered by the front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPress {
    pub key: String,
    pub ctrl: bool,
    pub alt: bool,
}

impl KeyPress {
    pub fn plain(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ctrl: false,
            alt: false,
        }
    }

    pub fn is_escape(&self) -> bool {
        self.key == "Escape"
    }

    /// Ctrl+Alt+T.
    pub fn is_cycle_shortcut(&self) -> bool {
        self.ctrl && self.alt && self.key.eq_ignore_ascii_case("t")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::theme;

    #[test]
    fn test_notice_text() {
        let notice = ThemeNotice::for_theme(theme::find("neon").unwrap());
        assert_eq!(notice.description, "Neon City • Futuristic skyline at night");
        assert_eq!(notice.pearls, "");
        assert_eq!(notice.icon, "themeNeon");

        let notice = ThemeNotice::for_theme(theme::find("forest").unwrap());
        assert_eq!(notice.pearls, "✨ With Chardonnay Pearls");
    }

    #[test]
    fn test_cycle_shortcut() {
        let chord = KeyPress {
            key: "t".into(),
            ctrl: true,
            alt: true,
        };
        assert!(chord.is_cycle_shortcut());
        assert!(!KeyPress::plain("t").is_cycle_shortcut());
        assert!(KeyPress::plain("Escape").is_escape());
    }
}
