use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub user_id: Option<String>,
    pub prefs_path: String,
    pub timings: Timings,
}

/// Timer lengths used by the announcement and theme managers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    /// Interval between background refreshes of the unread set.
    pub refresh_interval: Duration,
    /// Delay before the most recent unread item is shown as a pending banner.
    pub pending_delay: Duration,
    /// Lifetime of a "new" banner before it starts fading.
    pub banner_lifetime: Duration,
    /// Fade duration between hiding an element and removing it.
    pub fade: Duration,
    /// Lifetime of the theme confirmation notice.
    pub theme_notice_lifetime: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(30),
            pending_delay: Duration::from_secs(2),
            banner_lifetime: Duration::from_secs(30),
            fade: Duration::from_millis(300),
            theme_notice_lifetime: Duration::from_secs(4),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).filter(|s| !s.is_empty());

        let mut timings = Timings::default();
        if let Some(secs) = var("ANNOUNCEMENT_REFRESH_SECS") {
            let secs: u64 = secs.parse()?;
            if secs == 0 {
                anyhow::bail!("ANNOUNCEMENT_REFRESH_SECS must be greater than zero");
            }
            timings.refresh_interval = Duration::from_secs(secs);
        }

        Ok(Self {
            database_url: var("DATABASE_URL"),
            user_id: var("NIAMCHAT_USER_ID"),
            prefs_path: var("NIAMCHAT_PREFS_PATH").unwrap_or_else(|| "niamchat-prefs.json".into()),
            timings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.database_url, None);
        assert_eq!(config.user_id, None);
        assert_eq!(config.prefs_path, "niamchat-prefs.json");
        assert_eq!(config.timings, Timings::default());
        assert_eq!(config.timings.refresh_interval, Duration::from_secs(30));
    }

    #[test]
    fn test_empty_values_count_as_unset() {
        let config = config_from(&[("DATABASE_URL", ""), ("ANNOUNCEMENT_REFRESH_SECS", "")]).unwrap();
        assert_eq!(config.database_url, None);
        assert_eq!(config.timings.refresh_interval, Duration::from_secs(30));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("DATABASE_URL", "postgres://localhost/niamchat"),
            ("NIAMCHAT_USER_ID", "u42"),
            ("NIAMCHAT_PREFS_PATH", "/tmp/prefs.json"),
            ("ANNOUNCEMENT_REFRESH_SECS", "5"),
        ])
        .unwrap();
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/niamchat"));
        assert_eq!(config.user_id.as_deref(), Some("u42"));
        assert_eq!(config.prefs_path, "/tmp/prefs.json");
        assert_eq!(config.timings.refresh_interval, Duration::from_secs(5));
        assert_eq!(config.timings.pending_delay, Duration::from_secs(2));
    }

    #[test]
    fn test_zero_refresh_interval_is_rejected() {
        let err = config_from(&[("ANNOUNCEMENT_REFRESH_SECS", "0")]).unwrap_err();
        assert!(err.to_string().contains("greater than zero"));
    }

    #[test]
    fn test_non_numeric_refresh_interval_is_rejected() {
        assert!(config_from(&[("ANNOUNCEMENT_REFRESH_SECS", "soon")]).is_err());
    }
}
