// ABOUTME: Configuration loading for minibot.
// ABOUTME: Reads ~/.minibot/config.toml, then applies environment and CLI overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::tui::state::View;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub ui: UiConfig,
    pub logging: LoggingConfig,
}

/// Where the bot backend lives and who we are to it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub base_url: String,
    pub user_id: String,
    pub timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            user_id: "cli_user".to_string(),
            timeout_seconds: 30,
        }
    }
}

impl ServerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.max(1))
    }
}

/// TUI defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub start_view: View,
    pub greeting: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            start_view: View::Home,
            greeting: true,
        }
    }
}

/// Log level and destination while the TUI owns the terminal.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Log file path, defaulting to ~/.minibot/minibot.log.
    pub fn file_path(&self) -> PathBuf {
        self.file
            .clone()
            .unwrap_or_else(|| Config::config_dir().join("minibot.log"))
    }
}

/// Values that override the config file, highest precedence last.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub user_id: Option<String>,
}

impl Overrides {
    /// Read `MINIBOT_URL` and `MINIBOT_USER_ID` from the environment.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("MINIBOT_URL").ok().filter(|s| !s.is_empty()),
            user_id: std::env::var("MINIBOT_USER_ID").ok().filter(|s| !s.is_empty()),
        }
    }

    /// Layer `other` on top of `self`.
    pub fn merge(self, other: Overrides) -> Self {
        Self {
            base_url: other.base_url.or(self.base_url),
            user_id: other.user_id.or(self.user_id),
        }
    }
}

impl Config {
    /// Load config from ~/.minibot/config.toml, falling back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load config from an explicit path; a missing file yields defaults.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Apply environment/CLI overrides.
    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(url) = overrides.base_url {
            self.server.base_url = url;
        }
        if let Some(user_id) = overrides.user_id {
            self.server.user_id = user_id;
        }
    }

    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".minibot")
    }

    /// Path to the config file.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = Config::default();
        assert_eq!(config.server.base_url, "http://localhost:8000");
        assert_eq!(config.server.user_id, "cli_user");
        assert_eq!(config.server.timeout_seconds, 30);
        assert_eq!(config.ui.start_view, View::Home);
        assert!(config.ui.greeting);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn parse_config_toml() {
        let toml_str = r#"
[server]
base_url = "http://bot.internal:9000"
user_id = "ops"
timeout_seconds = 5

[ui]
start_view = "approvals"
greeting = false

[logging]
level = "debug"
file = "/tmp/minibot.log"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.base_url, "http://bot.internal:9000");
        assert_eq!(config.server.user_id, "ops");
        assert_eq!(config.server.timeout(), Duration::from_secs(5));
        assert_eq!(config.ui.start_view, View::Approvals);
        assert!(!config.ui.greeting);
        assert_eq!(config.logging.file_path(), PathBuf::from("/tmp/minibot.log"));
    }

    #[test]
    fn parse_partial_config_uses_defaults() {
        let toml_str = r#"
[server]
user_id = "alice"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.user_id, "alice");
        assert_eq!(config.server.base_url, "http://localhost:8000");
        assert!(config.ui.greeting);
    }

    #[test]
    fn zero_timeout_is_clamped() {
        let server = ServerConfig {
            timeout_seconds: 0,
            ..Default::default()
        };
        assert_eq!(server.timeout(), Duration::from_secs(1));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.server.user_id, "cli_user");
    }

    #[test]
    fn load_from_file_and_apply_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nbase_url = \"http://file:1\"\nuser_id = \"file\"\n")
            .unwrap();

        let mut config = Config::load_from(&path).unwrap();
        let env = Overrides {
            base_url: Some("http://env:2".to_string()),
            user_id: None,
        };
        let cli = Overrides {
            base_url: None,
            user_id: Some("cli".to_string()),
        };
        config.apply(env.merge(cli));

        assert_eq!(config.server.base_url, "http://env:2");
        assert_eq!(config.server.user_id, "cli");
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server\nbase_url = ").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
