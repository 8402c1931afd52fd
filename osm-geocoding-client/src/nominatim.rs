//! Nominatim `/search` requests.
//!
//! Builds the request URL the widget sends, performs it through the shared
//! [`crate::http::agent`] and parses the JSON array that comes back.

use crate::error::GeocodeError;
use crate::http::{self, MAX_RESPONSE_SIZE};
use crate::types::{GeocodeProvider, GeocodeQuery, GeocodeResult};
use osm_geocoding_config::GeocoderConfig;
use std::time::Duration;
use ureq::Agent;
use url::Url;

/// Build `{endpoint}/search?format=json&q=..&countrycodes=..&accept-language=..[&viewbox=..&bounded=1]`.
///
/// Values are form-urlencoded. Any query string already on `endpoint` is
/// replaced.
pub fn search_url(endpoint: &Url, query: &GeocodeQuery) -> Url {
    let mut url = endpoint.clone();
    url.set_query(None);
    url.set_fragment(None);

    // validate_endpoint_url rejects cannot-be-a-base URLs, so this succeeds
    // for every endpoint that reached a client.
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push("search");
    }

    {
        let mut pairs = url.query_pairs_mut();
        pairs
            .append_pair("format", "json")
            .append_pair("q", &query.address)
            .append_pair("countrycodes", &query.countrycodes)
            .append_pair("accept-language", &query.accept_language);
        if !query.viewbox.is_empty() {
            pairs
                .append_pair("viewbox", &query.viewbox)
                .append_pair("bounded", "1");
        }
    }

    url
}

/// Parse a `/search?format=json` body. Fields other than the four the widget
/// uses are ignored.
pub fn parse_results(body: &str) -> Result<Vec<GeocodeResult>, GeocodeError> {
    Ok(serde_json::from_str(body)?)
}

/// Blocking Nominatim client.
pub struct NominatimClient {
    agent: Agent,
    endpoint: Url,
    user_agent: String,
}

impl std::fmt::Debug for NominatimClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NominatimClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

impl NominatimClient {
    /// Create a client for `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::InvalidEndpoint`] if the endpoint fails
    /// [`http::validate_endpoint_url`].
    pub fn new(
        endpoint: &str,
        user_agent: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GeocodeError> {
        let endpoint = http::validate_endpoint_url(endpoint)?;
        Ok(Self {
            agent: http::agent(timeout),
            endpoint,
            user_agent: user_agent.into(),
        })
    }

    /// Create a client from the widget configuration.
    pub fn from_config(config: &GeocoderConfig) -> Result<Self, GeocodeError> {
        Self::new(
            &config.endpoint,
            config.user_agent.clone(),
            config.request_timeout(),
        )
    }

    /// Base URL requests are sent to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Perform a search request (blocking).
    pub fn search(&self, query: &GeocodeQuery) -> Result<Vec<GeocodeResult>, GeocodeError> {
        let url = search_url(&self.endpoint, query);
        log::debug!("Nominatim request: {}", url);

        let mut body = self
            .agent
            .get(url.as_str())
            .header("User-Agent", self.user_agent.as_str())
            .header("Accept", "application/json")
            .call()?
            .into_body();

        let body_str = body
            .with_config()
            .limit(MAX_RESPONSE_SIZE)
            .read_to_string()
            .map_err(|e| GeocodeError::Body(e.to_string()))?;

        let results = parse_results(&body_str)?;
        log::debug!(
            "Nominatim returned {} result(s) for {:?}",
            results.len(),
            query.address
        );
        Ok(results)
    }
}

impl GeocodeProvider for NominatimClient {
    fn search(&self, query: &GeocodeQuery) -> Result<Vec<GeocodeResult>, GeocodeError> {
        NominatimClient::search(self, query)
    }
}
