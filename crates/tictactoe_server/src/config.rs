//! Application configuration.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use tictactoe_engine::{Difficulty, Player};
use tracing::{debug, info, instrument, warn};

/// Environment variable overriding [`AppConfig::database_path`].
pub const DATABASE_ENV: &str = "TICTACTOE_DATABASE";
/// Environment variable overriding [`AppConfig::notify_url`].
pub const NOTIFY_URL_ENV: &str = "TICTACTOE_NOTIFY_URL";
/// Environment variable overriding [`AppConfig::difficulty`].
pub const DIFFICULTY_ENV: &str = "TICTACTOE_DIFFICULTY";

/// Settings shared by every subcommand.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct AppConfig {
    /// SQLite file holding players, games and streaks.
    #[serde(default = "default_database_path")]
    database_path: String,

    /// Receiver URL for result notifications. Disabled when absent.
    #[serde(default)]
    notify_url: Option<String>,

    /// Difficulty of new games.
    #[serde(default)]
    difficulty: Difficulty,

    /// Side the human plays.
    #[serde(default = "default_human_player")]
    human_player: Player,

    /// Bind address of the notification receiver.
    #[serde(default = "default_listen_host")]
    listen_host: String,

    /// Port of the notification receiver.
    #[serde(default = "default_listen_port")]
    listen_port: u16,

    /// Sender address on composed emails.
    #[serde(default = "default_mail_from")]
    mail_from: String,
}

fn default_database_path() -> String {
    "tictactoe.sqlite".to_string()
}

fn default_human_player() -> Player {
    Player::X
}

fn default_listen_host() -> String {
    "127.0.0.1".to_string()
}

fn default_listen_port() -> u16 {
    3000
}

fn default_mail_from() -> String {
    "tic-tac-toe@localhost".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            notify_url: None,
            difficulty: Difficulty::default(),
            human_player: default_human_player(),
            listen_host: default_listen_host(),
            listen_port: default_listen_port(),
            mail_from: default_mail_from(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the text is not valid configuration.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        info!(database = %config.database_path, "Config loaded");
        Ok(config)
    }

    /// Loads the optional file, then applies `.env` and process environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file or an override is invalid.
    #[instrument]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(env_file) => debug!(path = %env_file.display(), "Loaded .env"),
            Err(e) if e.not_found() => {}
            Err(e) => warn!(error = %e, "Ignoring unreadable .env"),
        }
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Applies environment-style overrides from `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if an override holds an invalid value.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(path) = lookup(DATABASE_ENV).filter(|v| !v.is_empty()) {
            debug!(path = %path, "Database path overridden");
            self.database_path = path;
        }
        if let Some(url) = lookup(NOTIFY_URL_ENV) {
            self.notify_url = Some(url).filter(|v| !v.is_empty());
        }
        if let Some(level) = lookup(DIFFICULTY_ENV) {
            self.difficulty = Difficulty::from_str(&level).map_err(|_| {
                ConfigError::new(format!("Invalid {}: '{}'", DIFFICULTY_ENV, level))
            })?;
        }
        Ok(())
    }

    /// Replaces the difficulty.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
    }

    /// Replaces the human side.
    pub fn set_human_player(&mut self, player: Player) {
        self.human_player = player;
    }

    /// Replaces the database path.
    pub fn set_database_path(&mut self, path: String) {
        self.database_path = path;
    }

    /// Replaces the receiver port.
    pub fn set_listen_port(&mut self, port: u16) {
        self.listen_port = port;
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = AppConfig::from_toml("").expect("parse");
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.database_path(), "tictactoe.sqlite");
        assert_eq!(*config.difficulty(), Difficulty::Medium);
        assert_eq!(*config.human_player(), Player::X);
        assert_eq!(*config.listen_port(), 3000);
        assert!(config.notify_url().is_none());
    }

    #[test]
    fn test_partial_toml() {
        let config = AppConfig::from_toml(
            r#"
            database_path = "/tmp/games.sqlite"
            notify_url = "http://localhost:3000/api/games"
            difficulty = "hard"
            human_player = "O"
            "#,
        )
        .expect("parse");
        assert_eq!(config.database_path(), "/tmp/games.sqlite");
        assert_eq!(
            config.notify_url().as_deref(),
            Some("http://localhost:3000/api/games")
        );
        assert_eq!(*config.difficulty(), Difficulty::Hard);
        assert_eq!(*config.human_player(), Player::O);
        assert_eq!(config.mail_from(), "tic-tac-toe@localhost");
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let err = AppConfig::from_toml("difficulty = \"impossible\"").expect_err("bad tier");
        assert!(err.message.contains("Failed to parse config"));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "listen_port = 8080").expect("write");
        let config = AppConfig::from_file(file.path()).expect("load");
        assert_eq!(*config.listen_port(), 8080);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = AppConfig::from_file("/nonexistent/tictactoe.toml").expect_err("missing");
        assert!(err.message.contains("Failed to read config file"));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            (DATABASE_ENV, "override.sqlite"),
            (NOTIFY_URL_ENV, "http://example.test/api/games"),
            (DIFFICULTY_ENV, "easy"),
        ]
        .into_iter()
        .collect();
        let mut config = AppConfig::default();
        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .expect("overrides");
        assert_eq!(config.database_path(), "override.sqlite");
        assert_eq!(
            config.notify_url().as_deref(),
            Some("http://example.test/api/games")
        );
        assert_eq!(*config.difficulty(), Difficulty::Easy);
    }

    #[test]
    fn test_empty_notify_override_disables_notifications() {
        let mut config = AppConfig::from_toml("notify_url = \"http://x.test\"").expect("parse");
        config
            .apply_overrides(|key| (key == NOTIFY_URL_ENV).then(String::new))
            .expect("overrides");
        assert!(config.notify_url().is_none());
    }

    #[test]
    fn test_invalid_difficulty_override() {
        let mut config = AppConfig::default();
        let err = config
            .apply_overrides(|key| (key == DIFFICULTY_ENV).then(|| "extreme".to_string()))
            .expect_err("invalid tier");
        assert!(err.message.contains(DIFFICULTY_ENV));
    }
}
