use serde::Serialize;

pub const DEFAULT_THEME: &str = "seaside";

/// Prefix of the marker class set on the document root.
pub const THEME_CLASS_PREFIX: &str = "theme-";

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Theme {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Whether the theme renders the decorative "Chardonnay pearls" effect.
    pub has_pearls: bool,
    pub icon: &'static str,
}

impl Theme {
    pub fn class_name(&self) -> String {
        format!("{THEME_CLASS_PREFIX}{}", self.key)
    }
}

/// Catalog in cycling order.
pub static THEMES: [Theme; 10] = [
    Theme {
        key: "seaside",
        name: "Seaside",
        description: "Sun-drenched beach with gentle waves",
        has_pearls: true,
        icon: "themeSeaside",
    },
    Theme {
        key: "cozy",
        name: "Cozy House",
        description: "Warm living room with fireplace",
        has_pearls: true,
        icon: "themeCozy",
    },
    Theme {
        key: "neon",
        name: "Neon City",
        description: "Futuristic skyline at night",
        has_pearls: false,
        icon: "themeNeon",
    },
    Theme {
        key: "forest",
        name: "Forest Retreat",
        description: "Sunlight through leafy trees",
        has_pearls: true,
        icon: "themeForest",
    },
    Theme {
        key: "winter",
        name: "Winter Wonderland",
        description: "Snowflakes and cozy lights",
        has_pearls: true,
        icon: "themeWinter",
    },
    Theme {
        key: "starry",
        name: "Starry Night",
        description: "Endless dark sky with stars",
        has_pearls: true,
        icon: "themeStarry",
    },
    Theme {
        key: "candy",
        name: "Candyland",
        description: "Sweet pastel dreamscape",
        has_pearls: false,
        icon: "themeCandy",
    },
    Theme {
        key: "desert",
        name: "Desert Oasis",
        description: "Warm sands and palm trees",
        has_pearls: true,
        icon: "themeDesert",
    },
    Theme {
        key: "arcade",
        name: "Retro Arcade",
        description: "Flashy pixel art and 80s vibes",
        has_pearls: false,
        icon: "themeArcade",
    },
    Theme {
        key: "autumn",
        name: "Autumn Park",
        description: "Crisp breeze with red and orange foliage",
        has_pearls: true,
        icon: "themeAutumn",
    },
];

pub fn find(key: &str) -> Option<&'static Theme> {
    THEMES.iter().find(|t| t.key == key)
}

pub fn default_theme() -> &'static Theme {
    &THEMES[0]
}

/// Theme following `key` in catalog order, wrapping at the end.
/// Unknown keys restart from the first entry.
pub fn next_after(key: &str) -> &'static Theme {
    match THEMES.iter().position(|t| t.key == key) {
        Some(i) => &THEMES[(i + 1) % THEMES.len()],
        None => &THEMES[0],
    }
}

pub fn is_theme_class(class: &str) -> bool {
    class
        .strip_prefix(THEME_CLASS_PREFIX)
        .is_some_and(|key| find(key).is_some())
}
