use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Endpoint used when neither the config file, the environment, nor the
/// command line names one.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000";

/// Environment variable consulted after the config file.
pub const ENDPOINT_ENV: &str = "ASKR_ENDPOINT";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the answering endpoint; `/ask` is appended per request.
    pub endpoint: String,

    /// UI preferences
    #[serde(default)]
    pub ui: UiConfig,
}

/// UI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Show HH:MM:SS timestamps in message headers.
    pub timestamps: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { timestamps: true }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            ui: UiConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from `~/.askr/config.toml`. On first run the
    /// directory is created and a starter file with the defaults is
    /// written. The `ASKR_ENDPOINT` environment variable overrides the
    /// file.
    pub fn load() -> Result<Self> {
        let askr_home = Self::askr_home()?;
        fs::create_dir_all(&askr_home).context("Failed to create .askr directory")?;

        let config_path = askr_home.join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        if !config_path.exists() {
            config.save_to(&config_path)?;
        }

        config.apply_env_override();
        Ok(config)
    }

    /// Let `ASKR_ENDPOINT` override whatever the file said. Blank values
    /// are ignored.
    fn apply_env_override(&mut self) {
        if let Ok(endpoint) = std::env::var(ENDPOINT_ENV) {
            if !endpoint.trim().is_empty() {
                self.endpoint = endpoint;
            }
        }
    }

    /// Load configuration from a specific path; missing file means defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path).context("Failed to read config file")?;
        toml::from_str(&content).context("Failed to parse config file")
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// Where the log file for interactive sessions lives.
    pub fn log_path() -> Result<PathBuf> {
        Ok(Self::askr_home()?.join("askr.log"))
    }

    fn askr_home() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(".askr"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Environment variables are process-global; tests that touch
    // ASKR_ENDPOINT take this lock so they cannot interleave.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn defaults_point_at_local_endpoint() {
        let config = Config::default();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert!(config.ui.timestamps);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = Config {
            endpoint: "http://answers.example:8080".to_string(),
            ui: UiConfig { timestamps: false },
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.endpoint, "http://answers.example:8080");
        assert!(!loaded.ui.timestamps);
    }

    #[test]
    fn ui_section_is_optional_in_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "endpoint = \"http://somewhere:1234\"\n").unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.endpoint, "http://somewhere:1234");
        assert!(loaded.ui.timestamps);
    }

    #[test]
    fn env_var_overrides_file_value() {
        let _guard = ENV_LOCK.lock().unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "endpoint = \"http://from-file:1111\"\n").unwrap();

        let mut config = Config::load_from(&path).unwrap();
        unsafe { std::env::set_var(ENDPOINT_ENV, "http://from-env:2222") };
        config.apply_env_override();
        unsafe { std::env::remove_var(ENDPOINT_ENV) };

        assert_eq!(config.endpoint, "http://from-env:2222");
    }

    #[test]
    fn blank_env_var_is_ignored() {
        let _guard = ENV_LOCK.lock().unwrap();

        let mut config = Config::default();
        unsafe { std::env::set_var(ENDPOINT_ENV, "   ") };
        config.apply_env_override();
        unsafe { std::env::remove_var(ENDPOINT_ENV) };

        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn unset_env_var_leaves_endpoint_alone() {
        let _guard = ENV_LOCK.lock().unwrap();

        unsafe { std::env::remove_var(ENDPOINT_ENV) };
        let mut config = Config {
            endpoint: "http://configured:3333".to_string(),
            ui: UiConfig::default(),
        };
        config.apply_env_override();

        assert_eq!(config.endpoint, "http://configured:3333");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "endpoint = [not toml").unwrap();

        assert!(Config::load_from(&path).is_err());
    }
}
