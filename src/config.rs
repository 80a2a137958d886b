//! Configuration for the Synheart Rhythm Agent.

use crate::baseline::{baseline_path, BaselineError};
use crate::core::DEFAULT_MAX_TWEETS;
use crate::ingest::{parse_timezone, IngestError};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default port for `synheart-rhythm serve`.
pub const DEFAULT_SERVER_PORT: u16 = 8787;

/// Main configuration for the rhythm agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Posts classified per batch
    pub max_tweets: usize,

    /// Path for storing per-user baselines
    pub data_path: PathBuf,

    /// Path for writing reports
    pub export_path: PathBuf,

    /// IANA timezone applied to posts that carry no offset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_timezone: Option<String>,

    /// Port for the HTTP server
    pub server_port: u16,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("synheart-rhythm-agent");

        Self {
            max_tweets: DEFAULT_MAX_TWEETS,
            export_path: data_dir.join("reports"),
            data_path: data_dir,
            default_timezone: None,
            server_port: DEFAULT_SERVER_PORT,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .map_err(|e| ConfigError::IoError(e.to_string()))?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|e| ConfigError::ParseError(e.to_string()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(&config_path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("synheart-rhythm-agent")
            .join("config.json")
    }

    /// Directory holding one baseline file per user.
    pub fn baseline_dir(&self) -> PathBuf {
        self.data_path.join("baselines")
    }

    /// Baseline file for a user; fails for ids that are not file-safe.
    pub fn baseline_path(&self, user_id: &str) -> Result<PathBuf, BaselineError> {
        baseline_path(&self.baseline_dir(), user_id)
    }

    /// Resolve `default_timezone`, if set.
    pub fn timezone(&self) -> Result<Option<Tz>, ConfigError> {
        self.default_timezone
            .as_deref()
            .map(parse_timezone)
            .transpose()
            .map_err(|e: IngestError| ConfigError::ParseError(e.to_string()))
    }

    /// Ensure all required directories exist.
    pub fn ensure_directories(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.export_path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        std::fs::create_dir_all(self.baseline_dir())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {e}"),
            ConfigError::ParseError(e) => write!(f, "Parse error: {e}"),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.max_tweets, 20);
        assert_eq!(config.server_port, 8787);
        assert!(config.default_timezone.is_none());
        assert!(config.export_path.ends_with("reports"));
        assert!(config.export_path.starts_with(&config.data_path));
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: Config = serde_json::from_str(r#"{"max_tweets": 5}"#).unwrap();
        assert_eq!(config.max_tweets, 5);
        assert_eq!(config.server_port, DEFAULT_SERVER_PORT);
    }

    #[test]
    fn test_baseline_path_per_user() {
        let config = Config {
            data_path: PathBuf::from("/tmp/rhythm"),
            ..Config::default()
        };
        assert_eq!(
            config.baseline_path("alice").unwrap(),
            PathBuf::from("/tmp/rhythm/baselines/alice.json")
        );
        assert!(config.baseline_path("../etc").is_err());
    }

    #[test]
    fn test_timezone_resolution() {
        let mut config = Config::default();
        assert_eq!(config.timezone().unwrap(), None);

        config.default_timezone = Some("Europe/Berlin".to_string());
        assert_eq!(config.timezone().unwrap(), Some(chrono_tz::Europe::Berlin));

        config.default_timezone = Some("Mars/Olympus".to_string());
        assert!(matches!(config.timezone(), Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_ensure_directories() {
        let root = std::env::temp_dir().join(format!("rhythm-config-{}", uuid::Uuid::new_v4()));
        let config = Config {
            export_path: root.join("reports"),
            data_path: root.clone(),
            ..Config::default()
        };

        config.ensure_directories().unwrap();
        assert!(config.export_path.is_dir());
        assert!(config.baseline_dir().is_dir());

        let _ = std::fs::remove_dir_all(&root);
    }
}
