//! Observable state of the address search widget.

use osm_geocoding_client::GeocodeResult;

/// Coarse phase derived from [`LifecycleState`], for hosts that render by phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing loaded and nothing shown.
    Idle,
    /// At least one request is in flight.
    Loading,
    /// Dropdown open with results.
    Open,
    /// Results held but the dropdown is dismissed.
    Closed,
}

/// Snapshot published to the host after every change.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LifecycleState {
    /// Raw input text as last reported by the host.
    pub query: String,
    /// True while any dispatched request has not completed.
    pub is_loading: bool,
    /// True after a successful response (or a focus re-open) with no dismissal since.
    pub is_visible: bool,
    /// Results of the latest applied response, in provider order.
    pub results: Vec<GeocodeResult>,
    in_flight: usize,
}

impl LifecycleState {
    pub fn phase(&self) -> Phase {
        if self.is_loading {
            Phase::Loading
        } else if self.is_visible {
            Phase::Open
        } else if !self.results.is_empty() {
            Phase::Closed
        } else {
            Phase::Idle
        }
    }

    /// Whether a renderer should draw the dropdown list.
    ///
    /// An applied response with zero matches leaves the dropdown logically
    /// open but with nothing to draw.
    pub fn dropdown_visible(&self) -> bool {
        self.is_visible && !self.results.is_empty()
    }

    /// Number of requests dispatched but not yet completed.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub(crate) fn begin_request(&mut self) {
        self.in_flight += 1;
        self.is_loading = true;
    }

    pub(crate) fn end_request(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.is_loading = self.in_flight > 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str) -> GeocodeResult {
        GeocodeResult {
            bounding_box: Default::default(),
            display_name: name.to_string(),
            lat: "0".to_string(),
            lon: "0".to_string(),
        }
    }

    #[test]
    fn test_phase_transitions() {
        let mut state = LifecycleState::default();
        assert_eq!(state.phase(), Phase::Idle);

        state.begin_request();
        assert_eq!(state.phase(), Phase::Loading);

        state.results = vec![result("Moda")];
        state.is_visible = true;
        state.end_request();
        assert_eq!(state.phase(), Phase::Open);
        assert!(state.dropdown_visible());

        state.is_visible = false;
        assert_eq!(state.phase(), Phase::Closed);
    }

    #[test]
    fn test_overlapping_requests_keep_loading() {
        let mut state = LifecycleState::default();
        state.begin_request();
        state.begin_request();
        assert_eq!(state.in_flight(), 2);

        state.end_request();
        assert!(state.is_loading, "One request is still outstanding");

        state.end_request();
        assert!(!state.is_loading);

        // Extra completions never underflow.
        state.end_request();
        assert_eq!(state.in_flight(), 0);
    }

    #[test]
    fn test_empty_results_render_nothing() {
        let state = LifecycleState {
            is_visible: true,
            ..LifecycleState::default()
        };
        assert!(!state.dropdown_visible());
    }
}
