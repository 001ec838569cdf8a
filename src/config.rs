//! App configuration: `~/.rankscope/config.json`.
//!
//! Only transport-level knobs live here. Everything the dashboard renders
//! comes from the remote service; nothing user-visible is configured
//! locally.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::util::atomic_write_str;

const DEFAULT_API_BASE_URL: &str = "https://api.rankscope.io/v1";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Applies to every remote call, including the slow analysis endpoint.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// The state directory (`~/.rankscope`), created on demand.
pub fn config_dir() -> Result<PathBuf, CoreError> {
    let home = dirs::home_dir().ok_or_else(|| {
        CoreError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "home directory not found",
        ))
    })?;
    let dir = home.join(".rankscope");
    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
    }
    Ok(dir)
}

pub fn config_path() -> Result<PathBuf, CoreError> {
    Ok(config_dir()?.join("config.json"))
}

/// Load configuration, falling back to defaults when the file is absent.
pub fn load_config() -> Result<AppConfig, CoreError> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(path: &std::path::Path) -> Result<AppConfig, CoreError> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = serde_json::from_str(&content)?;
    Ok(config)
}

/// Persist configuration atomically.
pub fn save_config(config: &AppConfig) -> Result<(), CoreError> {
    save_config_to(config, &config_path()?)
}

pub fn save_config_to(config: &AppConfig, path: &std::path::Path) -> Result<(), CoreError> {
    let content = serde_json::to_string_pretty(config)?;
    atomic_write_str(path, &content)?;
    Ok(())
}
