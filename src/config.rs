use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Error, Result};

pub const USERNAME_ENV: &str = "TICK_USER";
pub const PASSWORD_ENV: &str = "TICK_PASS";

fn default_api_url() -> String {
    "https://api.ticktick.com/api/v2/".into()
}

fn default_origin() -> String {
    "https://ticktick.com".into()
}

fn default_completed_limit() -> u32 {
    50
}

fn default_fetch_lists() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ClientConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_origin")]
    pub origin: String,
    /// Page size used for the completed-task fetch that follows every task fetch.
    #[serde(default = "default_completed_limit")]
    pub completed_limit: u32,
    /// Pull list metadata during login so inbox and title lookups resolve.
    #[serde(default = "default_fetch_lists")]
    pub fetch_lists_on_login: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            origin: default_origin(),
            completed_limit: default_completed_limit(),
            fetch_lists_on_login: default_fetch_lists(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ClientConfig {
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("ticktick")
            .join("config.json")
    }

    /// Load the config file if it exists, falling back to defaults.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_json(&raw)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    pub fn from_json(raw: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Absolute URL for a path relative to the API root.
    pub fn endpoint_url(&self, path: &str) -> String {
        format!("{}/{}", self.api_url.trim_end_matches('/'), path)
    }
}

#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Read `TICK_USER` / `TICK_PASS`. Returns `None` unless both are set and non-empty.
    pub fn from_env() -> Option<Self> {
        let username = std::env::var(USERNAME_ENV).ok()?;
        let password = std::env::var(PASSWORD_ENV).ok()?;
        if username.is_empty() || password.is_empty() {
            return None;
        }
        Some(Self { username, password })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let cfg = ClientConfig::from_json(r#"{"completed_limit": 10}"#).unwrap();
        assert_eq!(cfg.completed_limit, 10);
        assert_eq!(cfg.api_url, "https://api.ticktick.com/api/v2/");
        assert!(cfg.fetch_lists_on_login);
    }

    #[test]
    fn endpoint_url_joins_single_slash() {
        let cfg = ClientConfig::default();
        assert_eq!(
            cfg.endpoint_url("batch/check/0"),
            "https://api.ticktick.com/api/v2/batch/check/0"
        );
    }

    #[test]
    fn debug_hides_password() {
        let creds = Credentials::new("me@example.com", "hunter2");
        let shown = format!("{:?}", creds);
        assert!(shown.contains("me@example.com"));
        assert!(!shown.contains("hunter2"));
    }
}
