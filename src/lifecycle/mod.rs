//! Query and dropdown lifecycle of the address search widget.
//!
//! [`GeocodingController`] owns the widget state and exposes the handlers a
//! host wires to its input: text changes, focus, selection and dismissal.
//! Text changes pass through a [`Debouncer`]; when it fires the controller
//! runs the [`GeocodeProvider`] on tokio's blocking pool and publishes the
//! outcome through a `watch` channel the host renders from.
//!
//! Every dispatched request carries a generation number. Only the response
//! to the most recent dispatch is applied, so a slow early response can
//! never overwrite results for a later query.

mod state;

pub use state::{LifecycleState, Phase};

use crate::debounce::Debouncer;
use crate::events::{Bounds, HostEvent, HostEvents, Key, ListenerGuard, OwnerId};
use osm_geocoding_client::{
    GeocodeError, GeocodeProvider, GeocodeQuery, GeocodeResult, NominatimClient,
};
use osm_geocoding_config::GeocoderConfig;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};

/// Host callback receiving the result the user picked.
pub type SelectCallback = Arc<dyn Fn(&GeocodeResult) + Send + Sync>;

/// Errors from [`ControllerBuilder::build`].
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// No runtime handle was supplied and the caller is not inside a tokio runtime.
    #[error("no tokio runtime available: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
    /// The default Nominatim client could not be created from the config.
    #[error(transparent)]
    Client(#[from] GeocodeError),
}

/// State shared between the controller, its timer task, in-flight requests
/// and the host-event listener.
struct Shared {
    owner: OwnerId,
    config: GeocoderConfig,
    provider: Arc<dyn GeocodeProvider>,
    callback: Option<SelectCallback>,
    runtime: Handle,
    state: watch::Sender<LifecycleState>,
    generation: AtomicU64,
    root_bounds: Mutex<Option<Bounds>>,
}

impl Shared {
    fn dispatch(self: &Arc<Self>, address: String) -> JoinHandle<()> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(LifecycleState::begin_request);
        log::debug!("Dispatching query #{} {:?}", generation, address);

        let query = GeocodeQuery::from_config(address, &self.config);
        let in_flight = InFlight {
            shared: Arc::clone(self),
            finished: false,
        };

        self.runtime.spawn(async move {
            let provider = Arc::clone(&in_flight.shared.provider);
            let outcome = tokio::task::spawn_blocking(move || {
                let results = provider.search(&query);
                (query, results)
            })
            .await;
            in_flight.finish(generation, outcome);
        })
    }

    fn hide(&self) {
        self.state.send_if_modified(|s| {
            let changed = s.is_visible;
            s.is_visible = false;
            changed
        });
    }

    fn handle_host_event(&self, event: &HostEvent) {
        match *event {
            HostEvent::PointerDown { x, y } => {
                // Unknown bounds count as outside.
                let bounds = *self.root_bounds.lock();
                let inside = bounds.is_some_and(|b| b.contains(x, y));
                if !inside {
                    log::trace!("Pointer-down outside widget, dismissing");
                    self.hide();
                }
            }
            HostEvent::KeyUp(Key::Escape) => {
                log::trace!("Escape released, dismissing");
                self.hide();
            }
            HostEvent::KeyUp(_) => {}
        }
    }
}

type Outcome = Result<(GeocodeQuery, Result<Vec<GeocodeResult>, GeocodeError>), JoinError>;

/// Marks one request in flight; the mark is cleared when this is finished or
/// dropped, including when the request task is aborted.
struct InFlight {
    shared: Arc<Shared>,
    finished: bool,
}

impl InFlight {
    fn finish(mut self, generation: u64, outcome: Outcome) {
        self.finished = true;
        let latest = self.shared.generation.load(Ordering::SeqCst);

        self.shared.state.send_modify(|s| {
            match outcome {
                Ok((_, Ok(results))) if generation == latest => {
                    log::debug!("Query #{} returned {} result(s)", generation, results.len());
                    s.results = results;
                    s.is_visible = true;
                }
                Ok((query, Ok(_))) => {
                    log::debug!(
                        "Discarding stale response #{} for {:?} (latest is #{})",
                        generation,
                        query.address,
                        latest
                    );
                }
                Ok((query, Err(e))) => {
                    log::warn!("Geocoding query {:?} failed: {}", query.address, e);
                }
                Err(e) => {
                    log::warn!("Geocoding worker for query #{} failed: {}", generation, e);
                }
            }
            s.end_request();
        });
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if !self.finished {
            self.shared.state.send_modify(LifecycleState::end_request);
        }
    }
}

/// Builder for [`GeocodingController`].
pub struct ControllerBuilder {
    config: GeocoderConfig,
    provider: Option<Arc<dyn GeocodeProvider>>,
    callback: Option<SelectCallback>,
    runtime: Option<Handle>,
}

impl ControllerBuilder {
    /// Use `provider` instead of a [`NominatimClient`] built from the config.
    pub fn provider(mut self, provider: Arc<dyn GeocodeProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Call `callback` with the chosen result on selection.
    pub fn on_select<F>(mut self, callback: F) -> Self
    where
        F: Fn(&GeocodeResult) + Send + Sync + 'static,
    {
        self.callback = Some(Arc::new(callback));
        self
    }

    /// Spawn timers and requests on `runtime` instead of the current one.
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn build(self) -> Result<GeocodingController, BuildError> {
        let runtime = match self.runtime {
            Some(handle) => handle,
            None => Handle::try_current()?,
        };
        let provider: Arc<dyn GeocodeProvider> = match self.provider {
            Some(provider) => provider,
            None => Arc::new(NominatimClient::from_config(&self.config)?),
        };

        let (state, _) = watch::channel(LifecycleState::default());
        let shared = Arc::new(Shared {
            owner: OwnerId::next(),
            config: self.config,
            provider,
            callback: self.callback,
            runtime: runtime.clone(),
            state,
            generation: AtomicU64::new(0),
            root_bounds: Mutex::new(None),
        });

        let dispatcher = Arc::clone(&shared);
        let debouncer = Debouncer::new(runtime, shared.config.debounce(), move |address: String| {
            // Detached; completion is observed through the state channel.
            let _ = dispatcher.dispatch(address);
        })
        .with_max_wait(shared.config.debounce_max_wait());

        Ok(GeocodingController { shared, debouncer })
    }
}

/// Headless controller for one address search input.
pub struct GeocodingController {
    shared: Arc<Shared>,
    debouncer: Debouncer<String>,
}

impl std::fmt::Debug for GeocodingController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeocodingController")
            .field("owner", &self.shared.owner)
            .field("state", &*self.shared.state.borrow())
            .field("debouncer", &self.debouncer)
            .finish_non_exhaustive()
    }
}

impl GeocodingController {
    pub fn builder(config: GeocoderConfig) -> ControllerBuilder {
        ControllerBuilder {
            config,
            provider: None,
            callback: None,
            runtime: None,
        }
    }

    pub fn config(&self) -> &GeocoderConfig {
        &self.shared.config
    }

    /// Identity used for this controller's host-event registration.
    pub fn owner(&self) -> OwnerId {
        self.shared.owner
    }

    /// Current state snapshot.
    pub fn state(&self) -> LifecycleState {
        self.shared.state.borrow().clone()
    }

    /// Receiver that is notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.shared.state.subscribe()
    }

    /// The input text changed.
    ///
    /// Stores the text and (re)starts the quiet period. Blank text cancels any
    /// pending query and never dispatches one.
    pub fn on_text_changed(&self, text: &str) {
        self.shared.state.send_if_modified(|s| {
            if s.query == text {
                return false;
            }
            s.query = text.to_string();
            true
        });

        let address = text.trim();
        if address.is_empty() {
            self.debouncer.cancel();
            return;
        }
        self.debouncer.invoke(address.to_string());
    }

    /// Run a query now, bypassing the debouncer (e.g. a search button).
    ///
    /// Returns the request task so callers can await completion. Blank text
    /// is ignored and yields `None`.
    pub fn dispatch_query(&self, text: &str) -> Option<JoinHandle<()>> {
        let address = text.trim();
        if address.is_empty() {
            return None;
        }
        self.debouncer.cancel();
        Some(self.shared.dispatch(address.to_string()))
    }

    /// The input gained focus: re-open the dropdown if results are held.
    pub fn on_focus(&self) {
        self.shared.state.send_if_modified(|s| {
            if s.results.is_empty() || s.is_visible {
                return false;
            }
            s.is_visible = true;
            true
        });
    }

    /// The user picked `result`.
    pub fn on_select(&self, result: &GeocodeResult) {
        if let Some(callback) = &self.shared.callback {
            callback(result);
        }
        self.shared.hide();
    }

    /// Select the result at `index` in the current list.
    ///
    /// Returns the selected result, or `None` (and changes nothing) if the
    /// index is out of range.
    pub fn select_index(&self, index: usize) -> Option<GeocodeResult> {
        let result = self.shared.state.borrow().results.get(index).cloned()?;
        self.on_select(&result);
        Some(result)
    }

    /// Close the dropdown without touching results or loading state.
    pub fn on_dismiss(&self) {
        self.shared.hide();
    }

    /// Route a document-level event: outside pointer-down or Escape dismisses.
    pub fn on_host_event(&self, event: &HostEvent) {
        self.shared.handle_host_event(event);
    }

    /// Report where the widget's root region is on screen.
    pub fn set_root_bounds(&self, bounds: Option<Bounds>) {
        *self.shared.root_bounds.lock() = bounds;
    }

    pub fn root_bounds(&self) -> Option<Bounds> {
        *self.shared.root_bounds.lock()
    }

    /// Attach to `events` for the lifetime of the returned guard.
    ///
    /// Mounting again on the same registry replaces the earlier listener.
    pub fn mount(&self, events: &HostEvents) -> MountGuard {
        let weak: Weak<Shared> = Arc::downgrade(&self.shared);
        let listener = events.subscribe(self.shared.owner, move |event| {
            if let Some(shared) = weak.upgrade() {
                shared.handle_host_event(event);
            }
        });
        log::debug!("Widget {:?} mounted", self.shared.owner);
        MountGuard { _listener: listener }
    }
}

/// Keeps a controller attached to a [`HostEvents`] registry.
#[derive(Debug)]
#[must_use = "the widget is unmounted as soon as the guard is dropped"]
pub struct MountGuard {
    _listener: ListenerGuard,
}
