//! HTTP client helper with native-tls support.

use crate::error::GeocodeError;
use std::time::Duration;
use ureq::Agent;
use ureq::tls::{RootCerts, TlsConfig, TlsProvider};

/// Maximum response body size for search responses (2 MB).
///
/// A Nominatim page holds at most 40 results, well under this.
pub const MAX_RESPONSE_SIZE: u64 = 2 * 1024 * 1024;

/// Validate that a URL can serve as a geocoding endpoint.
///
/// Enforces:
/// - http or https scheme (plain http is allowed for self-hosted instances)
/// - a non-empty host
/// - a base that can carry path segments (rejects `mailto:`-style URLs)
///
/// Returns the parsed URL on success.
pub fn validate_endpoint_url(endpoint: &str) -> Result<url::Url, GeocodeError> {
    let invalid = |reason: String| GeocodeError::InvalidEndpoint {
        url: endpoint.to_string(),
        reason,
    };

    let parsed = url::Url::parse(endpoint).map_err(|e| invalid(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(invalid(format!(
                "scheme '{}' is not supported; only http and https are allowed",
                scheme
            )));
        }
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(invalid("URL has no host".to_string()));
    }

    if parsed.cannot_be_a_base() {
        return Err(invalid("URL cannot be used as a base".to_string()));
    }

    Ok(parsed)
}

/// Create a new HTTP agent configured with native-tls and a global timeout.
///
/// The timeout covers the whole exchange, so a server that never answers
/// surfaces as a transport error instead of leaving the widget loading.
pub fn agent(timeout: Duration) -> Agent {
    let tls_config = TlsConfig::builder()
        .provider(TlsProvider::NativeTls)
        .root_certs(RootCerts::PlatformVerifier)
        .build();

    Agent::config_builder()
        .tls_config(tls_config)
        .timeout_global(Some(timeout))
        .build()
        .into()
}
