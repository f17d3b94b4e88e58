//! Configuration loading and validation for MissionLoom.
//!
//! Loads `missionloom.toml`, applies defaults for every omitted field, and
//! validates the result at startup so the pipeline never has to.

use missionloom_core::event::{EventCategory, SourceKind};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `missionloom.toml`. Every field has a default, so an
/// empty file (or no file at all) yields a working configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite event store.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Directory to write the dataset into.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Version tag recorded in every annotation.
    #[serde(default = "default_dataset_version")]
    pub dataset_version: u32,

    /// Windowing and target selection.
    #[serde(default)]
    pub window: WindowConfig,

    /// Which event sources feed the timeline, in assembly order.
    #[serde(default = "default_sources")]
    pub sources: Vec<SourceKind>,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("missionloom.db")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("dataset")
}
fn default_dataset_version() -> u32 {
    1
}
fn default_sources() -> Vec<SourceKind> {
    SourceKind::all().to_vec()
}

/// Context-window parameters for the splitter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Category the model learns to predict.
    #[serde(default = "default_target_category")]
    pub target_category: EventCategory,

    /// Maximum lookback in ticks.
    #[serde(default = "default_max_window_size")]
    pub max_window_size: i64,

    /// Category dropped from a context when it shares the target's tick.
    #[serde(
        default = "default_exclude_at_target",
        skip_serializing_if = "Option::is_none"
    )]
    pub exclude_at_target: Option<EventCategory>,
}

fn default_target_category() -> EventCategory {
    EventCategory::SentMessage
}
fn default_max_window_size() -> i64 {
    100
}
fn default_exclude_at_target() -> Option<EventCategory> {
    Some(EventCategory::ReceivedMessage)
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            target_category: default_target_category(),
            max_window_size: default_max_window_size(),
            exclude_at_target: default_exclude_at_target(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a specific file path.
    ///
    /// A missing file is not an error; defaults are used.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("no config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.max_window_size < 0 {
            return Err(ConfigError::ValidationError(
                "window.max_window_size must not be negative".into(),
            ));
        }

        if self.window.exclude_at_target == Some(self.window.target_category) {
            return Err(ConfigError::ValidationError(
                "window.exclude_at_target must differ from window.target_category".into(),
            ));
        }

        if self.sources.is_empty() {
            return Err(ConfigError::ValidationError(
                "sources must name at least one event source".into(),
            ));
        }

        for (i, source) in self.sources.iter().enumerate() {
            if self.sources[..i].contains(source) {
                return Err(ConfigError::ValidationError(format!(
                    "sources lists {source:?} more than once"
                )));
            }
        }

        Ok(())
    }

    /// Generate a default config TOML string (for `init` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            output_dir: default_output_dir(),
            dataset_version: default_dataset_version(),
            window: WindowConfig::default(),
            sources: default_sources(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.window.max_window_size, 100);
        assert_eq!(config.window.target_category, EventCategory::SentMessage);
        assert_eq!(config.sources, SourceKind::all().to_vec());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.window.max_window_size, config.window.max_window_size);
        assert_eq!(parsed.sources, config.sources);
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/missionloom.toml")).unwrap();
        assert_eq!(config.dataset_version, 1);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
db_path = "runs/events.db"

[window]
max_window_size = 50
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.db_path, PathBuf::from("runs/events.db"));
        assert_eq!(config.window.max_window_size, 50);
        assert_eq!(config.window.target_category, EventCategory::SentMessage);
        assert_eq!(config.output_dir, PathBuf::from("dataset"));
    }

    #[test]
    fn exclusion_matching_target_rejected() {
        let config = AppConfig {
            window: WindowConfig {
                exclude_at_target: Some(EventCategory::SentMessage),
                ..WindowConfig::default()
            },
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn negative_window_rejected() {
        let config = AppConfig {
            window: WindowConfig {
                max_window_size: -1,
                ..WindowConfig::default()
            },
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    // A zero-width window is legal: the splitter restricts context to events
    // sharing the target's tick.
    #[test]
    fn zero_window_accepted() {
        let config = AppConfig {
            window: WindowConfig {
                max_window_size: 0,
                ..WindowConfig::default()
            },
            ..AppConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn duplicate_sources_rejected() {
        let config = AppConfig {
            sources: vec![SourceKind::Messages, SourceKind::Messages],
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_sources_rejected() {
        let config = AppConfig {
            sources: vec![],
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_from_validates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missionloom.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[window]\nmax_window_size = -5").unwrap();
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
