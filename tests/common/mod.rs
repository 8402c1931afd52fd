//! Shared integration test helpers for osm-geocoding.
//!
//! Include this module at the top of each test file that needs it:
//!
//! ```ignore
//! mod common;
//! use common::{MockProvider, result};
//! ```
//!
//! The `#[allow(dead_code)]` attribute suppresses warnings when only a subset
//! of helpers is used per file.

#![allow(dead_code)]

use osm_geocoding::{GeocodeError, GeocodeProvider, GeocodeQuery, GeocodeResult};
use parking_lot::{Condvar, Mutex};
use std::collections::HashMap;
use std::sync::Arc;

/// Build a result with the given display name.
pub fn result(name: &str) -> GeocodeResult {
    GeocodeResult {
        bounding_box: [
            "40.8".to_string(),
            "41.3".to_string(),
            "28.5".to_string(),
            "29.4".to_string(),
        ],
        display_name: name.to_string(),
        lat: "41.0".to_string(),
        lon: "28.9".to_string(),
    }
}

/// Two results in provider order, as returned for "Istanbul".
pub fn istanbul_results() -> Vec<GeocodeResult> {
    vec![result("İstanbul, Türkiye"), result("İstanbul Caddesi, Bursa")]
}

/// A latch that holds provider calls until opened.
#[derive(Default)]
pub struct Gate {
    open: Mutex<bool>,
    cv: Condvar,
}

impl Gate {
    pub fn open(&self) {
        *self.open.lock() = true;
        self.cv.notify_all();
    }

    fn wait(&self) {
        let mut open = self.open.lock();
        while !*open {
            self.cv.wait(&mut open);
        }
    }
}

enum Script {
    Results(Vec<GeocodeResult>),
    Fail,
    Panic,
}

/// Scripted [`GeocodeProvider`] that records every query it receives.
///
/// Addresses without a script return an empty result list.
#[derive(Default)]
pub struct MockProvider {
    calls: Mutex<Vec<GeocodeQuery>>,
    scripts: Mutex<HashMap<String, Script>>,
    gates: Mutex<HashMap<String, Arc<Gate>>>,
}

impl MockProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Answer `address` with `results`.
    pub fn respond(&self, address: &str, results: Vec<GeocodeResult>) {
        self.scripts
            .lock()
            .insert(address.to_string(), Script::Results(results));
    }

    /// Fail `address` with a transport error.
    pub fn fail(&self, address: &str) {
        self.scripts.lock().insert(address.to_string(), Script::Fail);
    }

    /// Panic inside the provider for `address`.
    pub fn panic_on(&self, address: &str) {
        self.scripts.lock().insert(address.to_string(), Script::Panic);
    }

    /// Hold calls for `address` until the returned gate is opened.
    pub fn gate(&self, address: &str) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        self.gates
            .lock()
            .insert(address.to_string(), Arc::clone(&gate));
        gate
    }

    /// Addresses searched so far, in call order.
    pub fn addresses(&self) -> Vec<String> {
        self.calls.lock().iter().map(|q| q.address.clone()).collect()
    }

    pub fn queries(&self) -> Vec<GeocodeQuery> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

impl GeocodeProvider for MockProvider {
    fn search(&self, query: &GeocodeQuery) -> Result<Vec<GeocodeResult>, GeocodeError> {
        self.calls.lock().push(query.clone());

        let gate = self.gates.lock().get(&query.address).cloned();
        if let Some(gate) = gate {
            gate.wait();
        }

        match self.scripts.lock().get(&query.address) {
            Some(Script::Results(results)) => Ok(results.clone()),
            Some(Script::Fail) => Err(GeocodeError::Transport(format!(
                "simulated network failure for {}",
                query.address
            ))),
            Some(Script::Panic) => panic!("simulated provider panic for {}", query.address),
            None => Ok(Vec::new()),
        }
    }
}
