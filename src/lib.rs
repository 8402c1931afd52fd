// Library exports for testing and host embedding.
//
// # Mutex Usage Policy
//
//   - `parking_lot::Mutex`:   sync-only state touched from both runtime tasks
//                               and host threads (debounce slot, listener
//                               registry, root bounds). Never held across `.await`.
//
//   - `tokio::sync::watch`:   widget state. Hosts render from a receiver;
//                               every mutation goes through the sender so
//                               subscribers are notified exactly when it changes.

/// Application version (root crate version, for use by sub-crates).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod debounce;
pub mod debug;
pub mod events;
pub mod lifecycle;

pub use debounce::Debouncer;
pub use events::{Bounds, HostEvent, HostEvents, Key, ListenerGuard, OwnerId};
pub use lifecycle::{
    BuildError, ControllerBuilder, GeocodingController, LifecycleState, MountGuard, Phase,
    SelectCallback,
};
pub use osm_geocoding_client::{
    GeocodeError, GeocodeProvider, GeocodeQuery, GeocodeResult, NominatimClient,
};
pub use osm_geocoding_config::{ConfigError, GeocoderConfig, LogLevel};
