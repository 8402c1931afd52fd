//! Nominatim search client for the osm-geocoding widget.
//!
//! Provides:
//! - `http`: configured ureq agent, endpoint validation, body size limits
//! - `nominatim`: search URL construction, request execution, response parsing
//! - `types`: [`GeocodeResult`], [`GeocodeQuery`] and the [`GeocodeProvider`] seam
//! - `error`: [`GeocodeError`]

pub mod error;
pub mod http;
pub mod nominatim;
pub mod types;

pub use error::GeocodeError;
pub use nominatim::{NominatimClient, parse_results, search_url};
pub use types::{GeocodeProvider, GeocodeQuery, GeocodeResult};
