//! Client configuration.
//!
//! # Responsibility
//! - Carry every tunable the store, editor and HTTP client need as one
//!   explicit value passed at construction.
//! - Load the optional TOML config file and apply environment overrides.
//!
//! # Invariants
//! - A missing config file yields defaults, never an error.
//! - `api_base_url` and `share_origin` are bare `http`/`https` origins once
//!   validated: a host, an optional port, no path, query or fragment.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_SHARE_ORIGIN: &str = "http://localhost:3000";
pub const DEFAULT_AUTOSAVE_DELAY_MS: u64 = 2000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 20;

pub const ENV_API_URL: &str = "NOTESYNC_API_URL";
pub const ENV_SHARE_ORIGIN: &str = "NOTESYNC_SHARE_ORIGIN";

const NOTES_PATH: &str = "api/notes";
const CONFIG_DIR_NAME: &str = "notesync";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file `{}`: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file `{}`: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid url `{0}`; expected an absolute http:// or https:// origin")]
    InvalidUrl(String),

    #[error("failed to build http client: {0}")]
    HttpClient(String),
}

/// Explicit configuration for one notes client instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Origin of the REST backend, e.g. `http://localhost:5000`.
    pub api_base_url: String,
    /// Origin prefixed to share links.
    pub share_origin: String,
    /// Quiet period before an autosave fires.
    pub autosave_delay_ms: u64,
    pub request_timeout_secs: u64,
    pub log_level: Option<String>,
    /// Rolling log directory. Logs go to stderr when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            share_origin: DEFAULT_SHARE_ORIGIN.to_string(),
            autosave_delay_ms: DEFAULT_AUTOSAVE_DELAY_MS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            log_level: None,
            log_dir: None,
        }
    }
}

impl ClientConfig {
    /// Loads the config file from its default location, then applies
    /// environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path)?,
            _ => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Loads one explicit config file without environment overrides.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Default: `~/.config/notesync/config.toml`
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Applies `NOTESYNC_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL).filter(|value| !value.trim().is_empty()) {
            self.api_base_url = url.trim().to_string();
        }
        if let Some(origin) = lookup(ENV_SHARE_ORIGIN).filter(|value| !value.trim().is_empty()) {
            self.share_origin = origin.trim().to_string();
        }
    }

    /// Collection endpoint, `{api_base_url}/api/notes`.
    pub fn notes_endpoint(&self) -> Result<String, ConfigError> {
        let base = parse_origin(&self.api_base_url)?;
        base.join(NOTES_PATH)
            .map(String::from)
            .map_err(|_| ConfigError::InvalidUrl(self.api_base_url.clone()))
    }

    /// Share origin without a trailing slash.
    pub fn share_origin(&self) -> Result<String, ConfigError> {
        let origin = parse_origin(&self.share_origin)?;
        Ok(origin.as_str().trim_end_matches('/').to_string())
    }

    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_origin(value: &str) -> Result<Url, ConfigError> {
    let invalid = || ConfigError::InvalidUrl(value.to_string());
    let url = Url::parse(value.trim()).map_err(|_| invalid())?;
    let is_origin = matches!(url.scheme(), "http" | "https")
        && url.host_str().is_some_and(|host| !host.is_empty())
        && url.username().is_empty()
        && url.password().is_none()
        && url.path() == "/"
        && url.query().is_none()
        && url.fragment().is_none();
    if is_origin {
        Ok(url)
    } else {
        Err(invalid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_reference_deployment() {
        let config = ClientConfig::default();
        assert_eq!(
            config.notes_endpoint().unwrap(),
            "http://localhost:5000/api/notes"
        );
        assert_eq!(config.autosave_delay(), Duration::from_millis(2000));
    }

    #[test]
    fn notes_endpoint_strips_trailing_slash() {
        let config = ClientConfig {
            api_base_url: "https://notes.example.com/".to_string(),
            ..ClientConfig::default()
        };
        assert_eq!(
            config.notes_endpoint().unwrap(),
            "https://notes.example.com/api/notes"
        );
    }

    #[test]
    fn notes_endpoint_rejects_non_http_urls() {
        for bad in [
            "",
            "localhost:5000",
            "ftp://host",
            "http://",
            "http://host:5000?debug=1",
            "http://host#frag",
            "http://[::1",
            "http://:::",
            "http://host/base",
            "http://user:pw@host",
        ] {
            let config = ClientConfig {
                api_base_url: bad.to_string(),
                ..ClientConfig::default()
            };
            assert!(
                matches!(config.notes_endpoint(), Err(ConfigError::InvalidUrl(_))),
                "accepted `{bad}`"
            );
        }
    }

    #[test]
    fn origins_with_port_or_ipv6_host_are_accepted() {
        let config = ClientConfig {
            api_base_url: " http://[::1]:5000 ".to_string(),
            share_origin: "https://share.example.com:8443/".to_string(),
            ..ClientConfig::default()
        };
        assert_eq!(
            config.notes_endpoint().unwrap(),
            "http://[::1]:5000/api/notes"
        );
        assert_eq!(
            config.share_origin().unwrap(),
            "https://share.example.com:8443"
        );
    }

    #[test]
    fn load_from_fills_missing_keys_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api_base_url = \"http://10.0.0.5:8080\"").unwrap();
        writeln!(file, "autosave_delay_ms = 500").unwrap();

        let config = ClientConfig::load_from(file.path()).unwrap();
        assert_eq!(config.api_base_url, "http://10.0.0.5:8080");
        assert_eq!(config.autosave_delay_ms, 500);
        assert_eq!(config.share_origin, DEFAULT_SHARE_ORIGIN);
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
    }

    #[test]
    fn load_from_reports_parse_errors_with_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "autosave_delay_ms = \"soon\"").unwrap();

        let err = ClientConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("failed to parse config file"));
    }

    #[test]
    fn env_overrides_replace_urls_and_ignore_blank_values() {
        let mut config = ClientConfig::default();
        config.apply_overrides(|key| match key {
            ENV_API_URL => Some(" https://api.example.com ".to_string()),
            ENV_SHARE_ORIGIN => Some("   ".to_string()),
            _ => None,
        });
        assert_eq!(config.api_base_url, "https://api.example.com");
        assert_eq!(config.share_origin, DEFAULT_SHARE_ORIGIN);
    }
}
