//! Configuration management via environment variables
//!
//! All settings are resolved once at startup into an immutable [`Config`]
//! that is handed to each component at construction. Older deployments used
//! unprefixed variable names; those still work but log a deprecation
//! warning.

use std::time::Duration;

/// Default target URL when none is configured.
pub const DEFAULT_TARGET_URL: &str = "https://example.com/results";

/// Get an environment variable with fallback to a deprecated name
///
/// If the new variable name is set, returns its value. If only the old
/// (deprecated) name is set, returns its value and logs a deprecation
/// warning.
pub fn get_env_with_fallback(new_name: &str, old_name: &str) -> Option<String> {
    if let Ok(val) = std::env::var(new_name) {
        return Some(val);
    }
    if let Ok(val) = std::env::var(old_name) {
        tracing::warn!(
            "Environment variable '{}' is deprecated, use '{}' instead",
            old_name,
            new_name
        );
        return Some(val);
    }
    None
}

/// Get an environment variable with fallback and default value
pub fn get_env_with_fallback_or(new_name: &str, old_name: &str, default: &str) -> String {
    get_env_with_fallback(new_name, old_name).unwrap_or_else(|| default.to_string())
}

/// Get an environment variable with fallback, parsing to a specific type
///
/// Returns the default when neither variable is set or parsing fails.
pub fn get_env_with_fallback_parse<T: std::str::FromStr>(
    new_name: &str,
    old_name: &str,
    default: T,
) -> T {
    get_env_with_fallback(new_name, old_name)
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|value| {
            matches!(
                value.to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            )
        })
        .unwrap_or(false)
}

/// Immutable process-wide configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the page to monitor.
    pub target_url: String,
    /// Telegram bot token. Empty disables notifications.
    pub bot_token: String,
    /// Telegram chat id. Empty disables notifications.
    pub chat_id: String,
    /// Delay between successful polls.
    pub poll_interval: Duration,
    /// Listen port for the health responder.
    pub port: u16,
    /// Render the page through a headless browser before hashing.
    pub render: bool,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Every value is optional; unset or unparseable values fall back to
    /// their defaults.
    pub fn from_env() -> Self {
        let target_url =
            get_env_with_fallback_or("PAGEWATCH_URL", "RESULT_URL", DEFAULT_TARGET_URL);
        let bot_token = get_env_with_fallback_or("PAGEWATCH_BOT_TOKEN", "BOT_TOKEN", "");
        let chat_id = get_env_with_fallback_or("PAGEWATCH_CHAT_ID", "CHAT_ID", "");
        let interval_secs =
            get_env_with_fallback_parse("PAGEWATCH_INTERVAL_SECS", "CHECK_INTERVAL", 300u64);
        let port = get_env_with_fallback_parse("PAGEWATCH_PORT", "PORT", 5000u16);
        let render = env_flag("PAGEWATCH_RENDER");

        Self {
            target_url,
            bot_token,
            chat_id,
            poll_interval: Duration::from_secs(interval_secs),
            port,
            render,
        }
    }

    /// True when both Telegram credentials are present.
    pub fn notifications_enabled(&self) -> bool {
        !self.bot_token.is_empty() && !self.chat_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const ALL_VARS: &[&str] = &[
        "PAGEWATCH_URL",
        "RESULT_URL",
        "PAGEWATCH_BOT_TOKEN",
        "BOT_TOKEN",
        "PAGEWATCH_CHAT_ID",
        "CHAT_ID",
        "PAGEWATCH_INTERVAL_SECS",
        "CHECK_INTERVAL",
        "PAGEWATCH_PORT",
        "PORT",
        "PAGEWATCH_RENDER",
    ];

    fn clear_env() {
        for var in ALL_VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_defaults_when_env_unset() {
        clear_env();
        let config = Config::from_env();

        assert_eq!(config.target_url, DEFAULT_TARGET_URL);
        assert_eq!(config.bot_token, "");
        assert_eq!(config.chat_id, "");
        assert_eq!(config.poll_interval, Duration::from_secs(300));
        assert_eq!(config.port, 5000);
        assert!(!config.render);
        assert!(!config.notifications_enabled());
    }

    #[test]
    #[serial]
    fn test_new_names_take_precedence() {
        clear_env();
        std::env::set_var("PAGEWATCH_URL", "https://new.example/a");
        std::env::set_var("RESULT_URL", "https://old.example/b");

        let config = Config::from_env();
        assert_eq!(config.target_url, "https://new.example/a");
        clear_env();
    }

    #[test]
    #[serial]
    fn test_deprecated_names_still_work() {
        clear_env();
        std::env::set_var("RESULT_URL", "https://old.example/results");
        std::env::set_var("BOT_TOKEN", "123:abc");
        std::env::set_var("CHAT_ID", "42");
        std::env::set_var("CHECK_INTERVAL", "60");
        std::env::set_var("PORT", "8080");

        let config = Config::from_env();
        assert_eq!(config.target_url, "https://old.example/results");
        assert_eq!(config.bot_token, "123:abc");
        assert_eq!(config.chat_id, "42");
        assert_eq!(config.poll_interval, Duration::from_secs(60));
        assert_eq!(config.port, 8080);
        assert!(config.notifications_enabled());
        clear_env();
    }

    #[test]
    #[serial]
    fn test_unparseable_numbers_fall_back_to_defaults() {
        clear_env();
        std::env::set_var("PAGEWATCH_INTERVAL_SECS", "soon");
        std::env::set_var("PAGEWATCH_PORT", "not-a-port");

        let config = Config::from_env();
        assert_eq!(config.poll_interval, Duration::from_secs(300));
        assert_eq!(config.port, 5000);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_render_flag_variants() {
        clear_env();
        for value in ["1", "true", "YES", "on"] {
            std::env::set_var("PAGEWATCH_RENDER", value);
            assert!(Config::from_env().render, "should enable for {value}");
        }
        std::env::set_var("PAGEWATCH_RENDER", "off");
        assert!(!Config::from_env().render);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_missing_single_credential_disables_notifications() {
        clear_env();
        std::env::set_var("PAGEWATCH_BOT_TOKEN", "123:abc");
        assert!(!Config::from_env().notifications_enabled());
        clear_env();
    }
}
