//! Request and response types shared by the client and the widget controller.

use crate::error::GeocodeError;
use osm_geocoding_config::GeocoderConfig;
use serde::{Deserialize, Serialize};

/// One candidate match returned by the geocoding provider.
///
/// Coordinates stay as the strings the provider sent; the `*_f64` helpers
/// parse on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeocodeResult {
    /// South, north, west, east (Nominatim order)
    #[serde(rename = "boundingbox")]
    pub bounding_box: [String; 4],
    pub display_name: String,
    pub lat: String,
    pub lon: String,
}

impl GeocodeResult {
    /// Latitude as a float, or `None` if the provider sent something unparsable.
    pub fn lat_f64(&self) -> Option<f64> {
        self.lat.trim().parse().ok()
    }

    /// Longitude as a float, or `None` if the provider sent something unparsable.
    pub fn lon_f64(&self) -> Option<f64> {
        self.lon.trim().parse().ok()
    }

    /// Bounding box as `[south, north, west, east]` floats.
    pub fn bounding_box_f64(&self) -> Option<[f64; 4]> {
        let mut out = [0.0; 4];
        for (slot, raw) in out.iter_mut().zip(&self.bounding_box) {
            *slot = raw.trim().parse().ok()?;
        }
        Some(out)
    }
}

/// Parameters of a single search request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GeocodeQuery {
    pub address: String,
    pub countrycodes: String,
    pub accept_language: String,
    /// Empty means unbounded.
    pub viewbox: String,
}

impl GeocodeQuery {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Self::default()
        }
    }

    /// Build a query for `address` using the filters from `config`.
    pub fn from_config(address: impl Into<String>, config: &GeocoderConfig) -> Self {
        Self::new(address)
            .countrycodes(config.countrycodes.clone())
            .accept_language(config.accept_language.clone())
            .viewbox(config.viewbox.clone())
    }

    pub fn countrycodes(mut self, countrycodes: impl Into<String>) -> Self {
        self.countrycodes = countrycodes.into();
        self
    }

    pub fn accept_language(mut self, accept_language: impl Into<String>) -> Self {
        self.accept_language = accept_language.into();
        self
    }

    pub fn viewbox(mut self, viewbox: impl Into<String>) -> Self {
        self.viewbox = viewbox.into();
        self
    }
}

/// Source of geocoding results.
///
/// Implementations are called from a blocking worker thread, so they may do
/// synchronous I/O. They must be `Send + Sync` to be shared with that worker.
pub trait GeocodeProvider: Send + Sync {
    /// Resolve `query` into candidate matches, in provider order.
    fn search(&self, query: &GeocodeQuery) -> Result<Vec<GeocodeResult>, GeocodeError>;
}
