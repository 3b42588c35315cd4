use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{AppError, Result};
use crate::sync::SyncOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConverterKind {
    /// HTTP turndown service at `converter_url`.
    #[default]
    Remote,
    /// In-process html2text conversion.
    Local,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: String,

    #[serde(default)]
    pub converter: ConverterKind,

    #[serde(default = "default_converter_url")]
    pub converter_url: String,

    #[serde(default = "default_converter_timeout")]
    pub converter_timeout_secs: u64,

    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,

    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_minutes: u32,

    #[serde(default = "default_refresh_concurrency")]
    pub refresh_concurrency: usize,

    #[serde(default = "default_true")]
    pub case_sensitive_search: bool,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_db_path() -> String {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("feedsync");
    std::fs::create_dir_all(&data_dir).ok();
    data_dir.join("feeds.db").to_string_lossy().to_string()
}

fn default_converter_url() -> String {
    "http://localhost:5010".to_string()
}

fn default_converter_timeout() -> u64 {
    30
}

fn default_fetch_timeout() -> u64 {
    10
}

fn default_refresh_interval() -> u32 {
    1
}

fn default_refresh_concurrency() -> usize {
    5
}

fn default_true() -> bool {
    true
}

fn default_user_agent() -> String {
    format!("feedsync/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            converter: ConverterKind::default(),
            converter_url: default_converter_url(),
            converter_timeout_secs: default_converter_timeout(),
            fetch_timeout_secs: default_fetch_timeout(),
            refresh_interval_minutes: default_refresh_interval(),
            refresh_concurrency: default_refresh_concurrency(),
            case_sensitive_search: default_true(),
            user_agent: default_user_agent(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Read the config at `path`, writing the defaults there first if the
    /// file does not exist yet.
    pub fn load_from(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str::<Config>(&content)?
        } else {
            let config = Config::default();
            config.save_to(path)?;
            config
        };
        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("feedsync")
            .join("config.toml")
    }

    fn validate(&self) -> Result<()> {
        if self.fetch_timeout_secs == 0 {
            return Err(AppError::Config("fetch_timeout_secs must be positive".to_string()));
        }
        if self.refresh_interval_minutes == 0 {
            return Err(AppError::Config(
                "refresh_interval_minutes must be positive".to_string(),
            ));
        }
        if self.refresh_concurrency == 0 {
            return Err(AppError::Config("refresh_concurrency must be positive".to_string()));
        }
        Ok(())
    }

    pub fn sync_options(&self) -> SyncOptions {
        SyncOptions {
            fetch_timeout: Duration::from_secs(self.fetch_timeout_secs),
            case_sensitive_search: self.case_sensitive_search,
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.refresh_interval_minutes) * 60)
    }
}
