use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::habits::ActivityMode;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct VibitsConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub app: AppConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the Memos server, e.g. `https://memos.example.com`.
    pub base_url: String,
    pub access_token: String,
    pub log_level: String,
    pub page_size: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
    /// JSON file used by the offline repository.
    pub offline_file: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub mode: AppMode,
    pub default_activity_mode: ActivityMode,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    /// Entries kept in the in-memory log ring buffer.
    pub buffer_capacity: usize,
}

/// Where memos come from.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AppMode {
    /// Local SQLite cache, filled by `vibits sync` from the server.
    #[default]
    Remote,
    /// A single JSON file, no server.
    Offline,
    /// In-memory sample data.
    Demo,
}

impl AppMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Offline => "offline",
            Self::Demo => "demo",
        }
    }
}

impl std::str::FromStr for AppMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "remote" => Ok(Self::Remote),
            "offline" => Ok(Self::Offline),
            "demo" => Ok(Self::Demo),
            _ => Err(format!("unknown app mode: {s}")),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            access_token: String::new(),
            log_level: "warn".into(),
            page_size: 200,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let dir = default_vibits_dir();
        Self {
            db_path: dir.join("vibits.db").to_string_lossy().into_owned(),
            offline_file: dir.join("memos.json").to_string_lossy().into_owned(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mode: AppMode::Remote,
            default_activity_mode: ActivityMode::Habits,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: 500,
        }
    }
}

/// Returns `~/.vibits/`
pub fn default_vibits_dir() -> PathBuf {
    dirs::home_dir()
        .expect("home directory must exist")
        .join(".vibits")
}

/// Returns the default config file path: `~/.vibits/config.toml`
pub fn default_config_path() -> PathBuf {
    default_vibits_dir().join("config.toml")
}

impl VibitsConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            VibitsConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    /// (VIBITS_DB, VIBITS_SERVER_URL, VIBITS_TOKEN, VIBITS_LOG_LEVEL, VIBITS_MODE).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("VIBITS_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("VIBITS_SERVER_URL") {
            self.server.base_url = val;
        }
        if let Ok(val) = std::env::var("VIBITS_TOKEN") {
            self.server.access_token = val;
        }
        if let Ok(val) = std::env::var("VIBITS_LOG_LEVEL") {
            self.server.log_level = val;
        }
        if let Ok(val) = std::env::var("VIBITS_MODE") {
            match val.parse() {
                Ok(mode) => self.app.mode = mode,
                Err(e) => tracing::warn!(error = %e, "ignoring VIBITS_MODE"),
            }
        }
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }

    pub fn resolved_offline_file(&self) -> PathBuf {
        expand_tilde(&self.storage.offline_file)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir()
            .expect("home directory must exist")
            .join(rest)
    } else {
        PathBuf::from(path)
    }
}
