mod common;

use common::{ISTANBUL_BODY, accept_and_stall, serve_once};
use osm_geocoding_client::http::{MAX_RESPONSE_SIZE, validate_endpoint_url};
use osm_geocoding_client::{GeocodeError, GeocodeProvider, GeocodeQuery, NominatimClient};
use osm_geocoding_config::GeocoderConfig;
use std::time::{Duration, Instant};

fn client(base: &str) -> NominatimClient {
    NominatimClient::new(base, "osm-geocoding-tests", Duration::from_secs(5))
        .expect("Loopback endpoint should be valid")
}

#[test]
fn test_search_parses_results_in_response_order() {
    let (base, server) = serve_once(200, "application/json", ISTANBUL_BODY);

    let query = GeocodeQuery::new("Istanbul")
        .countrycodes("tr")
        .accept_language("tr");
    let results = client(&base).search(&query).expect("Search should succeed");

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].display_name, "İstanbul, Marmara Bölgesi, Türkiye");
    assert_eq!(results[0].lat, "41.0091982");
    assert_eq!(
        results[1].display_name,
        "İstanbul Havalimanı, Arnavutköy, İstanbul, Türkiye"
    );

    let head = server.join().expect("Server thread panicked");
    let request_line = head.lines().next().unwrap_or_default();
    assert!(
        request_line.starts_with(
            "GET /search?format=json&q=Istanbul&countrycodes=tr&accept-language=tr "
        ),
        "Unexpected request line: {request_line}"
    );
    assert!(
        head.to_ascii_lowercase()
            .contains("user-agent: osm-geocoding-tests"),
        "User-Agent header should be sent: {head}"
    );
}

#[test]
fn test_search_through_provider_trait() {
    let (base, server) = serve_once(200, "application/json", "[]");

    let provider: Box<dyn GeocodeProvider> = Box::new(client(&base));
    let results = provider
        .search(&GeocodeQuery::new("nowhere"))
        .expect("Empty array is a valid response");
    assert!(results.is_empty());

    server.join().expect("Server thread panicked");
}

#[test]
fn test_search_maps_http_status() {
    let (base, server) = serve_once(503, "text/plain", "overloaded");

    let err = client(&base)
        .search(&GeocodeQuery::new("Istanbul"))
        .unwrap_err();
    assert!(matches!(err, GeocodeError::Status(503)), "got {err:?}");

    server.join().expect("Server thread panicked");
}

#[test]
fn test_search_maps_malformed_body() {
    let (base, server) = serve_once(200, "text/html", "<html>maintenance</html>");

    let err = client(&base)
        .search(&GeocodeQuery::new("Istanbul"))
        .unwrap_err();
    assert!(matches!(err, GeocodeError::Parse(_)), "got {err:?}");

    server.join().expect("Server thread panicked");
}

#[test]
fn test_search_maps_connection_refused() {
    // Bind then drop to get a port nothing listens on.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .and_then(|l| l.local_addr())
        .map(|a| a.port())
        .expect("Failed to reserve a port");

    let err = client(&format!("http://127.0.0.1:{port}"))
        .search(&GeocodeQuery::new("Istanbul"))
        .unwrap_err();
    assert!(matches!(err, GeocodeError::Transport(_)), "got {err:?}");
}

#[test]
fn test_search_rejects_oversized_body() {
    // Valid JSON so only the size limit can reject it.
    let body = format!("[\"{}\"]", "x".repeat(MAX_RESPONSE_SIZE as usize + 1024));
    let (base, server) = serve_once(200, "application/json", &body);

    let err = client(&base)
        .search(&GeocodeQuery::new("Istanbul"))
        .unwrap_err();
    assert!(matches!(err, GeocodeError::Body(_)), "got {err:?}");

    // The client hangs up mid-body, so the server's write may fail.
    let _ = server.join();
}

#[test]
fn test_search_times_out() {
    let (base, server) = accept_and_stall();
    let client = NominatimClient::new(&base, "osm-geocoding-tests", Duration::from_millis(300))
        .expect("Loopback endpoint should be valid");

    let started = Instant::now();
    let err = client.search(&GeocodeQuery::new("Istanbul")).unwrap_err();
    let elapsed = started.elapsed();

    assert!(matches!(err, GeocodeError::Transport(_)), "got {err:?}");
    assert!(
        elapsed < Duration::from_secs(5),
        "Timeout should fire near 300 ms, took {elapsed:?}"
    );

    let head = server.join().expect("Server thread panicked");
    assert!(head.starts_with("GET /search?"), "Unexpected request: {head}");
}

#[test]
fn test_config_and_client_agree_on_endpoints() {
    for endpoint in [
        "https://nominatim.openstreetmap.org",
        "http://localhost:8080/nominatim/",
        "ftp://nominatim.example",
        "mailto:maps@example.com",
        "data:text/plain,hello",
        "https://",
        "not a url",
    ] {
        let client_ok = validate_endpoint_url(endpoint).is_ok();
        let config_ok = GeocoderConfig::default()
            .with_endpoint(endpoint)
            .validate()
            .is_ok();
        assert_eq!(
            client_ok, config_ok,
            "Validators disagree on {endpoint:?}: client {client_ok}, config {config_ok}"
        );
    }
}
