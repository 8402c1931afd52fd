//! Default value functions for configuration.
//!
//! Each function backs a `#[serde(default = "crate::defaults::...")]`
//! attribute on a [`crate::GeocoderConfig`] field, so a partial YAML file
//! fills in the rest from here.

/// Public Nominatim instance.
pub const NOMINATIM_ENDPOINT: &str = "https://nominatim.openstreetmap.org";

pub fn placeholder() -> String {
    "Enter address".to_string()
}

pub fn debounce_ms() -> u64 {
    1000
}

pub fn countrycodes() -> String {
    "tr".to_string()
}

pub fn accept_language() -> String {
    "tr".to_string()
}

pub fn endpoint() -> String {
    NOMINATIM_ENDPOINT.to_string()
}

/// Nominatim's usage policy requires an identifying User-Agent.
pub fn user_agent() -> String {
    format!("osm-geocoding/{}", env!("CARGO_PKG_VERSION"))
}

pub fn request_timeout_secs() -> u64 {
    30
}
