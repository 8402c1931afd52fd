//! Typed error variants for the osm-geocoding-config crate.
//!
//! Callers match on these instead of opaque strings when they need to tell
//! a missing file from a malformed one or from a rejected value.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when loading, saving or validating configuration.
///
/// # Example
///
/// ```rust,no_run
/// use osm_geocoding_config::{ConfigError, GeocoderConfig};
///
/// match GeocoderConfig::load_from(std::path::Path::new("config.yaml")) {
///     Ok(config) => println!("debounce: {}ms", config.debounce_ms),
///     Err(ConfigError::Validation(msg)) => eprintln!("bad value: {msg}"),
///     Err(e) => eprintln!("{e}"),
/// }
/// ```
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An I/O error occurred reading or writing the config file.
    #[error("I/O error on config file '{}': {source}", path.display())]
    Io {
        /// File that could not be read or written.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file contained invalid YAML that could not be parsed.
    #[error("YAML parse error in config: {0}")]
    Parse(#[source] serde_yaml_ng::Error),

    /// The config could not be serialized for saving.
    #[error("failed to serialize config: {0}")]
    Serialize(#[source] serde_yaml_ng::Error),

    /// A field value failed semantic validation.
    ///
    /// The inner string names the field and why it was rejected.
    #[error("config validation error: {0}")]
    Validation(String),
}
