//! Configuration file support for the health tracker.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/health-tracker/config.toml`.

use crate::units::HeightUnit;
use crate::{ActivityLevel, Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_history_file")]
    pub history_file: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            history_file: default_history_file(),
        }
    }
}

/// Values used when the user leaves a field blank
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct DefaultsConfig {
    #[serde(default)]
    pub activity: ActivityLevel,

    #[serde(default)]
    pub height_unit: HeightUnit,
}

// Default value functions
fn default_data_dir() -> PathBuf {
    match dirs::data_local_dir() {
        Some(base) => base.join("health-tracker"),
        None => PathBuf::from("data"),
    }
}

fn default_history_file() -> String {
    "health_history.csv".into()
}

impl DataConfig {
    /// Full path of the history CSV
    pub fn history_path(&self) -> PathBuf {
        self.data_dir.join(&self.history_file)
    }
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        if config.data.history_file.trim().is_empty() {
            return Err(Error::Config("data.history_file must not be empty".into()));
        }
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from(".config"));
        base.join("health-tracker").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Replace the data directory, keeping the file name
    pub fn with_data_dir(mut self, data_dir: PathBuf) -> Self {
        self.data.data_dir = data_dir;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.data.history_file, "health_history.csv");
        assert_eq!(config.defaults.activity, ActivityLevel::Light);
        assert_eq!(config.defaults.height_unit, HeightUnit::Centimeters);
        assert!(config.data.history_path().ends_with("health_history.csv"));
    }

    #[test]
    fn test_config_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default().with_data_dir(temp_dir.path().join("data"));
        config.defaults.activity = ActivityLevel::VeryActive;
        config.save_to(&path).unwrap();

        let parsed = Config::load_from(&path).unwrap();
        assert_eq!(parsed.data.data_dir, temp_dir.path().join("data"));
        assert_eq!(parsed.defaults.activity, ActivityLevel::VeryActive);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[defaults]
activity = "very_active"
height_unit = "m"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.defaults.activity, ActivityLevel::VeryActive);
        assert_eq!(config.defaults.height_unit, HeightUnit::Meters);
        assert_eq!(config.data.history_file, "health_history.csv"); // default
    }

    #[test]
    fn test_empty_history_file_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[data]\nhistory_file = \"\"\n").unwrap();

        assert!(matches!(Config::load_from(&path), Err(Error::Config(_))));
    }
}
