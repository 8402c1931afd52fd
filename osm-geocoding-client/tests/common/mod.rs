//! Shared integration test helpers for osm-geocoding-client.
//!
//! Include with `mod common;` at the top of a test file.

#![allow(dead_code)]

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::JoinHandle;

/// Serve exactly one canned HTTP response on a loopback port.
///
/// Returns the base URL to point a client at and a handle that yields the
/// raw request head (request line plus headers) once the exchange is done.
pub fn serve_once(status: u16, content_type: &str, body: &str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind loopback listener");
    let addr = listener.local_addr().expect("Listener has no local address");

    let response = format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Type: {content_type}\r\nContent-Length: {len}\r\nConnection: close\r\n\r\n{body}",
        reason = if status == 200 { "OK" } else { "Error" },
        len = body.len(),
    );

    let handle = std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("Failed to accept connection");
        let mut reader = BufReader::new(stream.try_clone().expect("Failed to clone stream"));

        let mut head = String::new();
        loop {
            let mut line = String::new();
            let n = reader.read_line(&mut line).expect("Failed to read request");
            if n == 0 || line == "\r\n" {
                break;
            }
            head.push_str(&line);
        }

        stream
            .write_all(response.as_bytes())
            .expect("Failed to write response");
        stream.flush().expect("Failed to flush response");
        head
    });

    (format!("http://{addr}"), handle)
}

/// Accept one connection, read the request and never answer.
///
/// The connection is held until the client gives up and closes it; the
/// handle then yields the raw request head.
pub fn accept_and_stall() -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind loopback listener");
    let addr = listener.local_addr().expect("Listener has no local address");

    let handle = std::thread::spawn(move || {
        let (stream, _) = listener.accept().expect("Failed to accept connection");
        let mut reader = BufReader::new(stream);

        let mut head = String::new();
        loop {
            let mut line = String::new();
            match reader.read_line(&mut line) {
                Ok(0) | Err(_) => return head,
                Ok(_) if line == "\r\n" => break,
                Ok(_) => head.push_str(&line),
            }
        }

        // Wait for EOF (client closed) without ever replying.
        let mut sink = [0u8; 64];
        while matches!(reader.read(&mut sink), Ok(n) if n > 0) {}
        head
    });

    (format!("http://{addr}"), handle)
}

/// A two-result Nominatim body with extra fields the client must ignore.
pub const ISTANBUL_BODY: &str = r#"[
  {"place_id": 1, "licence": "ODbL", "osm_type": "relation",
   "boundingbox": ["40.8027", "41.3201", "28.5000", "29.4500"],
   "lat": "41.0091982", "lon": "28.9662187",
   "display_name": "İstanbul, Marmara Bölgesi, Türkiye", "importance": 0.84},
  {"place_id": 2,
   "boundingbox": ["40.9", "41.2", "28.6", "29.3"],
   "lat": "41.06", "lon": "28.98",
   "display_name": "İstanbul Havalimanı, Arnavutköy, İstanbul, Türkiye"}
]"#;
