//! `GeocoderConfig`: the options a host supplies when it builds the widget.
//!
//! Covers:
//! - the serde-backed struct with per-field defaults
//! - `with_*` builder methods for hosts that configure in code
//! - YAML persistence (`load_from`, `load_or_default`, `save_to`)
//! - path resolution (`config_dir`, `config_path`)
//! - semantic validation (`validate`)

use crate::error::ConfigError;
use crate::types::LogLevel;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Options recognised by the address search widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocoderConfig {
    /// Placeholder text shown in the empty input
    #[serde(default = "crate::defaults::placeholder")]
    pub placeholder: String,

    /// Quiet period in milliseconds before a query fires
    #[serde(default = "crate::defaults::debounce_ms")]
    pub debounce_ms: u64,

    /// Upper bound in milliseconds on how long continuous typing may postpone a query.
    /// Unset keeps plain trailing debounce: a user who never pauses never queries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debounce_max_wait_ms: Option<u64>,

    /// Comma-separated ISO 3166-1 alpha-2 codes restricting results (empty = worldwide)
    #[serde(default = "crate::defaults::countrycodes")]
    pub countrycodes: String,

    /// Preferred language for display names (`accept-language` query parameter)
    #[serde(default = "crate::defaults::accept_language")]
    pub accept_language: String,

    /// Optional `x1,y1,x2,y2` box; when set, results are bounded to it
    #[serde(default)]
    pub viewbox: String,

    /// Base URL of the Nominatim instance
    #[serde(default = "crate::defaults::endpoint")]
    pub endpoint: String,

    /// User-Agent header sent with every request
    #[serde(default = "crate::defaults::user_agent")]
    pub user_agent: String,

    /// Global timeout for a single search request, in seconds
    #[serde(default = "crate::defaults::request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Log verbosity for the CLI host
    #[serde(default)]
    pub log_level: LogLevel,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            placeholder: crate::defaults::placeholder(),
            debounce_ms: crate::defaults::debounce_ms(),
            debounce_max_wait_ms: None,
            countrycodes: crate::defaults::countrycodes(),
            accept_language: crate::defaults::accept_language(),
            viewbox: String::new(),
            endpoint: crate::defaults::endpoint(),
            user_agent: crate::defaults::user_agent(),
            request_timeout_secs: crate::defaults::request_timeout_secs(),
            log_level: LogLevel::default(),
        }
    }
}

impl GeocoderConfig {
    /// Create a config with every field at its default.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    pub fn with_debounce_max_wait_ms(mut self, max_wait_ms: Option<u64>) -> Self {
        self.debounce_max_wait_ms = max_wait_ms;
        self
    }

    pub fn with_countrycodes(mut self, countrycodes: impl Into<String>) -> Self {
        self.countrycodes = countrycodes.into();
        self
    }

    pub fn with_accept_language(mut self, accept_language: impl Into<String>) -> Self {
        self.accept_language = accept_language.into();
        self
    }

    pub fn with_viewbox(mut self, viewbox: impl Into<String>) -> Self {
        self.viewbox = viewbox.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Quiet period as a `Duration`.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Max wait as a `Duration`, if configured.
    pub fn debounce_max_wait(&self) -> Option<Duration> {
        self.debounce_max_wait_ms.map(Duration::from_millis)
    }

    /// Request timeout as a `Duration`.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Get the configuration directory path (XDG convention outside Windows)
    pub fn config_dir() -> PathBuf {
        #[cfg(target_os = "windows")]
        {
            if let Some(config_dir) = dirs::config_dir() {
                config_dir.join("osm-geocoding")
            } else {
                PathBuf::from(".")
            }
        }
        #[cfg(not(target_os = "windows"))]
        {
            if let Some(home_dir) = dirs::home_dir() {
                home_dir.join(".config").join("osm-geocoding")
            } else {
                PathBuf::from(".")
            }
        }
    }

    /// Default config file location: `<config_dir>/config.yaml`
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.yaml")
    }

    /// Load and validate a config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Parse`] for malformed YAML and
    /// [`ConfigError::Validation`] if a field is out of range.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        log::info!("Loading config from {:?}", path);

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_yaml_ng::from_str(&contents).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    ///
    /// A file that exists but fails to load is still an error; only absence
    /// falls back.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load_from(path)
        } else {
            log::info!("Config file not found at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Save configuration to `path`, creating parent directories as needed.
    ///
    /// Writes to a temp file first and renames it into place so a crash
    /// mid-write never leaves a truncated config behind.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let yaml = serde_yaml_ng::to_string(self).map_err(ConfigError::Serialize)?;

        let temp_path = path.with_extension("yaml.tmp");
        fs::write(&temp_path, &yaml).map_err(io_err)?;
        fs::rename(&temp_path, path).map_err(io_err)?;

        log::info!("Config saved to {:?}", path);
        Ok(())
    }

    /// Check field values that serde alone cannot enforce.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_endpoint(&self.endpoint)?;

        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::Validation(
                "user_agent must not be empty (Nominatim rejects anonymous clients)".to_string(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }

        for code in self.countrycodes.split(',').map(str::trim) {
            if code.is_empty() && self.countrycodes.trim().is_empty() {
                break;
            }
            if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(ConfigError::Validation(format!(
                    "countrycodes entry '{code}' is not a two-letter country code"
                )));
            }
        }

        if !self.viewbox.is_empty() {
            let parts: Vec<&str> = self.viewbox.split(',').map(str::trim).collect();
            if parts.len() != 4 || parts.iter().any(|p| p.parse::<f64>().is_err()) {
                return Err(ConfigError::Validation(format!(
                    "viewbox '{}' must be four comma-separated numbers: x1,y1,x2,y2",
                    self.viewbox
                )));
            }
        }

        Ok(())
    }
}

fn validate_endpoint(endpoint: &str) -> Result<(), ConfigError> {
    let parsed = url::Url::parse(endpoint)
        .map_err(|e| ConfigError::Validation(format!("endpoint '{endpoint}' is invalid: {e}")))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::Validation(format!(
            "endpoint scheme '{}' is not supported; use http or https",
            parsed.scheme()
        )));
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(ConfigError::Validation(format!(
            "endpoint '{endpoint}' has no host"
        )));
    }

    // Same rules as the client's `validate_endpoint_url`, which runs again on
    // every client construction.
    if parsed.cannot_be_a_base() {
        return Err(ConfigError::Validation(format!(
            "endpoint '{endpoint}' cannot be used as a base URL"
        )));
    }

    Ok(())
}
