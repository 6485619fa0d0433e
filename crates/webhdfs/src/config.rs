//! Connection settings for a WebHDFS service.
//!
//! Values are layered: built-in defaults, then an optional JSON file, then
//! `WEBHDFS_*` environment variables.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WebhdfsError};

pub const DEFAULT_PORT: u16 = 50070;
pub const DEFAULT_PROTOCOL: &str = "http";
pub const DEFAULT_PATH_PREFIX: &str = "webhdfs/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhdfsConfig {
    /// NameNode hosts, tried in order (HA).
    pub hosts: Vec<String>,
    pub port: u16,
    /// Full base URL; takes precedence over `hosts` and `port`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub protocol: String,
    pub path_prefix: String,
    /// Sent as `user.name`. Falls back to the login user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    pub timeout_secs: u64,
}

impl Default for WebhdfsConfig {
    fn default() -> Self {
        Self {
            hosts: Vec::new(),
            port: DEFAULT_PORT,
            url: None,
            protocol: DEFAULT_PROTOCOL.to_string(),
            path_prefix: DEFAULT_PATH_PREFIX.to_string(),
            user: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl WebhdfsConfig {
    /// Config for a single host on the default port.
    pub fn for_host(host: impl Into<String>) -> Self {
        Self {
            hosts: vec![host.into()],
            ..Self::default()
        }
    }

    /// Defaults, overlaid with `path` when it exists, overlaid with the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) if path.exists() => Self::from_file(path)?,
            Some(path) => {
                log::debug!("config file not found, using defaults path={}", path.display());
                Self::default()
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Reads a JSON config file. Missing fields keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        serde_json::from_str(&data).map_err(|error| {
            WebhdfsError::Config(format!("{}: {error}", path.display()))
        })
    }

    /// Applies `WEBHDFS_*` overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(hosts) = read("WEBHDFS_HOSTS") {
            self.hosts = split_hosts(&hosts);
        }
        if let Some(port) = read("WEBHDFS_PORT") {
            self.port = port.trim().parse().map_err(|_| {
                WebhdfsError::Config(format!("WEBHDFS_PORT is not a port number: {port}"))
            })?;
        }
        if let Some(url) = read("WEBHDFS_URL") {
            self.url = Some(url);
        }
        if let Some(protocol) = read("WEBHDFS_PROTOCOL") {
            self.protocol = protocol;
        }
        if let Some(prefix) = read("WEBHDFS_PATH_PREFIX") {
            self.path_prefix = prefix;
        }
        if let Some(user) = read("WEBHDFS_USER") {
            self.user = Some(user);
        }
        if let Some(timeout) = read("WEBHDFS_TIMEOUT_SECS") {
            self.timeout_secs = timeout.trim().parse().map_err(|_| {
                WebhdfsError::Config(format!(
                    "WEBHDFS_TIMEOUT_SECS is not a number of seconds: {timeout}"
                ))
            })?;
        }
        if self.user.is_none() {
            self.user = read("USER").or_else(|| read("USERNAME"));
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let has_url = self.url.as_deref().is_some_and(|url| !url.is_empty());
        let has_hosts = self.hosts.iter().any(|host| !host.is_empty()) && self.port != 0;
        if !has_url && !has_hosts {
            return Err(WebhdfsError::MissingArgument(
                "either url or a combination of hosts and port".to_string(),
            ));
        }
        if self.protocol.is_empty() {
            return Err(WebhdfsError::MissingArgument("protocol".to_string()));
        }
        if self.path_prefix.is_empty() {
            return Err(WebhdfsError::MissingArgument("path_prefix".to_string()));
        }
        Ok(())
    }

    /// Candidate service URLs in the order they should be tried.
    pub fn base_urls(&self) -> Vec<String> {
        if let Some(url) = self.url.as_deref().filter(|url| !url.is_empty()) {
            return vec![url.trim_end_matches('/').to_string()];
        }
        self.hosts
            .iter()
            .filter(|host| !host.is_empty())
            .map(|host| format!("{}://{}:{}", self.protocol, host, self.port))
            .collect()
    }

    /// User name sent with each request.
    pub fn effective_user(&self) -> String {
        self.user.clone().unwrap_or_else(|| "hdfs".to_string())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Splits a comma-separated host list, dropping blanks.
pub fn split_hosts(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|host| !host.is_empty())
        .map(ToString::to_string)
        .collect()
}
