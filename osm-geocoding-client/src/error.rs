//! Typed errors for geocoding requests.

use thiserror::Error;

/// Everything that can go wrong between building a search URL and holding
/// parsed results.
///
/// None of these are fatal to the widget: the controller logs them and keeps
/// its previous results.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// The configured endpoint is not a usable http(s) base URL.
    #[error("invalid geocoding endpoint '{url}': {reason}")]
    InvalidEndpoint {
        /// Endpoint as configured.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// DNS, connect, TLS, timeout or other transport-level failure.
    #[error("geocoding request failed: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("geocoding server returned HTTP {0}")]
    Status(u16),

    /// The response body could not be read (truncated, oversized, bad encoding).
    #[error("failed to read geocoding response: {0}")]
    Body(String),

    /// The body was not the expected JSON array of results.
    #[error("failed to parse geocoding response: {0}")]
    Parse(#[from] serde_json::Error),
}

impl From<ureq::Error> for GeocodeError {
    fn from(e: ureq::Error) -> Self {
        match e {
            ureq::Error::StatusCode(code) => GeocodeError::Status(code),
            other => GeocodeError::Transport(other.to_string()),
        }
    }
}
