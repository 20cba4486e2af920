// src/config/settings.rs
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::outage::extract::{
    MarkerError, TableMarkers, DEFAULT_CONTAINER_SELECTOR, DEFAULT_TABLE_SELECTOR,
};
use crate::outage::fetch::{default_user_agent, FetchOptions, DEFAULT_TIMEOUT_SECS};

pub const ENV_CONFIG_PATH: &str = "OUTAGE_WATCH_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_accept_invalid_certs() -> bool {
    true
}
fn default_max_failures() -> u32 {
    5
}
fn default_container_selector() -> String {
    DEFAULT_CONTAINER_SELECTOR.to_string()
}
fn default_table_selector() -> String {
    DEFAULT_TABLE_SELECTOR.to_string()
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration file not found at: {}", .0.display())]
    NotFound(PathBuf),
    #[error("reading configuration from {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing configuration {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl From<MarkerError> for ConfigError {
    fn from(e: MarkerError) -> Self {
        ConfigError::Invalid(e.to_string())
    }
}

/// Top-level configuration file shape.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub settings: Settings,
    /// Notification targets, literal or `env:VAR_NAME`. Resolve with
    /// [`super::resolve_apprise_urls`].
    #[serde(default)]
    pub apprise_urls: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// source name -> page URL
    pub outage_page_urls: BTreeMap<String, String>,
    /// Seconds between cycle starts.
    pub check_interval: u64,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_accept_invalid_certs")]
    pub accept_invalid_certs: bool,
    /// Consecutive failed cycles before the watcher gives up. 0 = never.
    #[serde(default = "default_max_failures")]
    pub max_consecutive_failures: u32,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub metrics_addr: Option<SocketAddr>,
    #[serde(default = "default_container_selector")]
    pub container_selector: String,
    #[serde(default = "default_table_selector")]
    pub table_selector: String,
}

impl Settings {
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval)
    }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            timeout: Duration::from_secs(self.request_timeout_secs),
            accept_invalid_certs: self.accept_invalid_certs,
            user_agent: self
                .user_agent
                .clone()
                .unwrap_or_else(default_user_agent),
        }
    }

    pub fn table_markers(&self) -> Result<TableMarkers, ConfigError> {
        Ok(TableMarkers::new(
            &self.container_selector,
            &self.table_selector,
        )?)
    }
}

impl Config {
    pub fn from_yaml_str(s: &str, origin: &Path) -> Result<Self, ConfigError> {
        let cfg: Config = serde_yaml::from_str(s).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.settings;
        if s.outage_page_urls.is_empty() {
            return Err(ConfigError::Invalid(
                "settings.outage_page_urls must name at least one page".into(),
            ));
        }
        if let Some((name, _)) = s
            .outage_page_urls
            .iter()
            .find(|(_, url)| reqwest::Url::parse(url).is_err())
        {
            return Err(ConfigError::Invalid(format!(
                "settings.outage_page_urls.{name} is not a valid URL"
            )));
        }
        if s.check_interval == 0 {
            return Err(ConfigError::Invalid(
                "settings.check_interval must be greater than 0".into(),
            ));
        }
        if s.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "settings.request_timeout_secs must be greater than 0".into(),
            ));
        }
        s.table_markers()?;
        Ok(())
    }
}

/// Load configuration from an explicit path.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Config::from_yaml_str(&content, path)
}

/// Config path resolution:
/// 1) explicit argument
/// 2) $OUTAGE_WATCH_CONFIG
/// 3) config/config.yaml
pub fn config_path(explicit: Option<&str>) -> PathBuf {
    if let Some(p) = explicit {
        return PathBuf::from(p);
    }
    std::env::var(ENV_CONFIG_PATH)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}
