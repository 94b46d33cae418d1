//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/libris/config.toml)
//! 3. Environment variables (LIBRIS_* prefix)
//!
//! Environment variables take precedence over config file values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix
const ENV_PREFIX: &str = "LIBRIS";

/// Default number of audit entries shown by the recent-logs view
pub const DEFAULT_RECENT_LOG_LIMIT: usize = 20;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory for data storage (SQLite collection store, log file)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Display name of the library
    #[serde(default = "default_library_name")]
    pub library_name: String,

    /// How many audit entries the recent-logs view shows
    #[serde(default = "default_recent_log_limit")]
    pub recent_log_limit: usize,

    /// Log file path (defaults to {data_dir}/libris.log)
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            library_name: default_library_name(),
            recent_log_limit: DEFAULT_RECENT_LOG_LIMIT,
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (LIBRIS_DATA_DIR, LIBRIS_LIBRARY_NAME, LIBRIS_LOG_FILE)
    /// 2. Config file (~/.config/libris/config.toml or LIBRIS_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration, preferring an explicit path given on the command line
    pub fn load_with_cli_override(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        config.ensure_data_dir()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var(format!("{}_LIBRARY_NAME", ENV_PREFIX)) {
            if !val.is_empty() {
                self.library_name = val;
            }
        }

        // Empty string clears the log file override
        if let Ok(val) = std::env::var(format!("{}_LOG_FILE", ENV_PREFIX)) {
            self.log_file = if val.is_empty() {
                None
            } else {
                Some(PathBuf::from(val))
            };
        }
    }

    /// Ensure data directory exists
    fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)
                .with_context(|| format!("Failed to create data directory: {:?}", self.data_dir))?;
        }
        Ok(())
    }

    /// Save configuration to the default config file
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_file_path())
    }

    /// Save configuration to a specific file
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with LIBRIS_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("libris")
            .join("config.toml")
    }

    /// Get the path to the SQLite collection store
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("libris.db")
    }

    /// Get the effective log file path
    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join("libris.log"))
    }
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("libris")
}

fn default_library_name() -> String {
    "Rajarshi Janak University Library".to_string()
}

fn default_recent_log_limit() -> usize {
    DEFAULT_RECENT_LOG_LIMIT
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to serialize tests that touch environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &["LIBRIS_DATA_DIR", "LIBRIS_LIBRARY_NAME", "LIBRIS_LOG_FILE"];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.recent_log_limit, 20);
        assert!(config.log_file.is_none());
        assert!(config.data_dir.ends_with("libris"));
        assert!(config.library_name.contains("Library"));
    }

    #[test]
    fn test_file_paths() {
        let config = Config {
            data_dir: PathBuf::from("/data/libris"),
            ..Config::default()
        };

        assert_eq!(config.database_path(), PathBuf::from("/data/libris/libris.db"));
        assert_eq!(config.log_path(), PathBuf::from("/data/libris/libris.log"));

        let config = Config {
            log_file: Some(PathBuf::from("/var/log/libris.log")),
            ..config
        };
        assert_eq!(config.log_path(), PathBuf::from("/var/log/libris.log"));
    }

    #[test]
    fn test_env_override_data_dir() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("LIBRIS_DATA_DIR", "/tmp/libris-test");
        config.apply_env_overrides();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/libris-test"));
    }

    #[test]
    fn test_env_override_log_file() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("LIBRIS_LOG_FILE", "/tmp/libris.log");
        config.apply_env_overrides();
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/libris.log")));

        // Empty string clears it
        env::set_var("LIBRIS_LOG_FILE", "");
        config.apply_env_overrides();
        assert!(config.log_file.is_none());
    }

    #[test]
    fn test_env_override_library_name_ignores_empty() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        let original = config.library_name.clone();

        env::set_var("LIBRIS_LIBRARY_NAME", "");
        config.apply_env_overrides();
        assert_eq!(config.library_name, original);

        env::set_var("LIBRIS_LIBRARY_NAME", "City Library");
        config.apply_env_overrides();
        assert_eq!(config.library_name, "City Library");
    }

    #[test]
    fn test_serialization() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config {
            data_dir: PathBuf::from("/data/libris"),
            library_name: "Branch Library".to_string(),
            recent_log_limit: 50,
            log_file: None,
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("data_dir"));
        assert!(toml_str.contains("library_name"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.data_dir, config.data_dir);
        assert_eq!(parsed.library_name, config.library_name);
        assert_eq!(parsed.recent_log_limit, 50);
    }

    #[test]
    fn test_load_from_str_fills_defaults() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config::load_from_str(r#"data_dir = "/custom/data""#).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/custom/data"));
        assert_eq!(config.recent_log_limit, DEFAULT_RECENT_LOG_LIMIT);
        assert_eq!(config.library_name, default_library_name());
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = tempfile::TempDir::new().unwrap();

        env::set_var("LIBRIS_DATA_DIR", temp_dir.path().join("data"));
        let path = temp_dir.path().join("missing.toml");
        let config = Config::load_from_path(&path).unwrap();

        // Defaults plus the env override, and the data dir gets created
        assert_eq!(config.recent_log_limit, DEFAULT_RECENT_LOG_LIMIT);
        assert!(config.data_dir.exists());
    }

    #[test]
    fn test_save_and_reload() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let config = Config {
            data_dir: temp_dir.path().join("data"),
            library_name: "Saved Library".to_string(),
            recent_log_limit: 5,
            log_file: None,
        };
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.library_name, "Saved Library");
        assert_eq!(loaded.recent_log_limit, 5);
    }
}
