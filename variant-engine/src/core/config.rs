use crate::store::SnapshotSelection;
use crate::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the user options file under the tool home
pub const OPTIONS_FILE: &str = "options.json";

/// Tool configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | SKU_TOOL_HOME | current directory | where `options.json` lives |
/// | SKU_DATA_DIR | (unset) | database folder, overrides `options.json` |
/// | CLOUD_SERVICE_URL | http://localhost:5000 | helper service address |
/// | CLOUD_TIMEOUT_SECS | 30 | helper request timeout |
/// | LOG_LEVEL | info | tracing filter |
/// | LOG_DIR | (unset) | daily rolling log directory |
/// | SNAPSHOT_SELECTION | timestamp | `timestamp` or `mtime` |
/// | WRITE_BACKUP | true | keep `<file>.backup` during a save |
///
/// # Example
///
/// ```ignore
/// SKU_DATA_DIR=/srv/sku/data LOG_LEVEL=debug variant-engine recalc
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Tool home; holds `options.json`, default database folder is `<home>/data`
    pub home_dir: PathBuf,
    /// Explicit database folder, wins over `options.json`
    pub data_dir: Option<PathBuf>,
    /// Cloud helper service base URL
    pub cloud_service_url: String,
    /// Cloud helper request timeout (seconds)
    pub cloud_timeout_secs: u64,
    /// Log filter
    pub log_level: String,
    /// Log directory (file logging only when it exists)
    pub log_dir: Option<String>,
    /// How "newest snapshot" is decided
    pub snapshot_selection: SnapshotSelection,
    /// Keep a `.backup` copy of the previous file while replacing it
    pub write_backup: bool,
}

impl Config {
    /// Load configuration from environment variables, with defaults
    pub fn from_env() -> Self {
        Self {
            home_dir: std::env::var("SKU_TOOL_HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))),
            data_dir: std::env::var("SKU_DATA_DIR")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            cloud_service_url: std::env::var("CLOUD_SERVICE_URL")
                .unwrap_or_else(|_| cloud_client::config::DEFAULT_BASE_URL.into()),
            cloud_timeout_secs: std::env::var("CLOUD_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok(),
            snapshot_selection: std::env::var("SNAPSHOT_SELECTION")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
            write_backup: std::env::var("WRITE_BACKUP")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }

    /// Configuration rooted at `home` with every other value defaulted
    ///
    /// Used by tests and embedding callers that must not read the process
    /// environment.
    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        Self {
            home_dir: home.into(),
            data_dir: None,
            cloud_service_url: cloud_client::config::DEFAULT_BASE_URL.into(),
            cloud_timeout_secs: 30,
            log_level: "info".into(),
            log_dir: None,
            snapshot_selection: SnapshotSelection::default(),
            write_backup: true,
        }
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    pub fn options_file(&self) -> PathBuf {
        self.home_dir.join(OPTIONS_FILE)
    }

    /// Resolve the database folder: `SKU_DATA_DIR`, then `options.json`,
    /// then `<home>/data`
    pub fn database_folder(&self) -> AppResult<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        let options = UserOptions::load(&self.options_file())?;
        Ok(options
            .database_folder
            .filter(|f| !f.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| self.home_dir.join("data")))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

/// `options.json`: user choices that persist between runs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_folder: Option<String>,
}

impl UserOptions {
    /// Missing file is the default; an unreadable file is a config error
    pub fn load(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&text)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn save(&self, path: &Path) -> AppResult<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(path, json)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_database_folder_defaults_to_home_data() {
        let home = TempDir::new().unwrap();
        let config = Config::with_home(home.path());
        assert_eq!(config.database_folder().unwrap(), home.path().join("data"));
    }

    #[test]
    fn test_database_folder_from_options_file() {
        let home = TempDir::new().unwrap();
        let config = Config::with_home(home.path());
        let options = UserOptions {
            database_folder: Some("/srv/sku".to_string()),
        };
        options.save(&config.options_file()).unwrap();

        assert_eq!(config.database_folder().unwrap(), PathBuf::from("/srv/sku"));
        assert_eq!(UserOptions::load(&config.options_file()).unwrap(), options);
    }

    #[test]
    fn test_explicit_data_dir_wins() {
        let home = TempDir::new().unwrap();
        UserOptions {
            database_folder: Some("/ignored".to_string()),
        }
        .save(&home.path().join(OPTIONS_FILE))
        .unwrap();
        let config = Config::with_home(home.path()).with_data_dir("/explicit");
        assert_eq!(config.database_folder().unwrap(), PathBuf::from("/explicit"));
    }

    #[test]
    fn test_bad_options_file_is_config_error() {
        let home = TempDir::new().unwrap();
        std::fs::write(home.path().join(OPTIONS_FILE), "{not json").unwrap();
        let err = Config::with_home(home.path()).database_folder().unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
