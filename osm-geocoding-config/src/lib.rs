//! Configuration system for the osm-geocoding address search widget.
//!
//! This crate provides configuration loading, saving, validation and default
//! values for the widget. It includes:
//!
//! - [`GeocoderConfig`]: the options a host supplies at construction
//! - [`LogLevel`]: log verbosity used by the CLI host
//! - [`ConfigError`]: typed I/O, parse and validation failures
//! - [`defaults`]: the `serde` default functions for every field

pub mod config;
pub mod defaults;
pub mod error;
mod types;

pub use config::GeocoderConfig;
pub use error::ConfigError;
pub use types::LogLevel;
