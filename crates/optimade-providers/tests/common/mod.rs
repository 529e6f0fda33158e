// crates/optimade-providers/tests/common/mod.rs
// ============================================================================
// Module: Provider Directory Test Fixtures
// Description: Shared helpers for provider directory integration tests.
// Purpose: Local HTTP servers, unreachable URLs, and links documents.
// ============================================================================

#![allow(
    dead_code,
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Shared helpers are not used by every test crate."
)]

use std::collections::BTreeMap;
use std::net::TcpListener;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use optimade_providers::DirectoryConfig;
use optimade_providers::FetchError;
use optimade_providers::FetchResponse;
use optimade_providers::Fetcher;
use serde_json::Value;
use serde_json::json;
use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;
use url::Url;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Config with short timeouts and no bundled fallback.
pub fn test_config(registry_urls: Vec<String>) -> DirectoryConfig {
    DirectoryConfig {
        registry_urls,
        timeout_ms: 2_000,
        connect_timeout_ms: 1_000,
        bundled_fallback: false,
        ..DirectoryConfig::default()
    }
}

// ============================================================================
// SECTION: Links Documents
// ============================================================================

/// Builds a typed links resource entry.
pub fn link(id: &str, link_type: &str, base_url: Option<&str>) -> Value {
    json!({
        "id": id,
        "type": "links",
        "attributes": {
            "name": format!("{id} database"),
            "description": format!("Description of {id}"),
            "base_url": base_url,
            "homepage": null,
            "link_type": link_type
        }
    })
}

/// Wraps entries in a links response envelope.
pub fn links_doc(entries: Vec<Value>) -> Value {
    json!({
        "data": entries,
        "meta": {
            "api_version": "1.1.0",
            "query": {"representation": "/links"},
            "more_data_available": false
        }
    })
}

// ============================================================================
// SECTION: Local HTTP Server
// ============================================================================

/// Route table entry: status and body served for a path.
pub type Route = (u16, String);

/// Local HTTP server answering a fixed number of requests.
pub struct TestServer {
    /// Base URL of the server, without trailing slash.
    pub url: String,
    /// Handle returning the request paths in arrival order.
    handle: thread::JoinHandle<Vec<String>>,
}

impl TestServer {
    /// Waits for the server thread and returns the requested paths.
    pub fn finish(self) -> Vec<String> {
        self.handle.join().unwrap()
    }
}

/// Spawns a server routing paths to canned responses; unknown paths get 404.
pub fn spawn_server(routes: Vec<(&str, Route)>, expected_requests: usize) -> TestServer {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let routes: BTreeMap<String, Route> =
        routes.into_iter().map(|(path, route)| (path.to_string(), route)).collect();
    let handle = thread::spawn(move || {
        let mut seen = Vec::new();
        while seen.len() < expected_requests {
            let Ok(Some(request)) = server.recv_timeout(Duration::from_secs(5)) else {
                break;
            };
            let path = request.url().to_string();
            let (status, body) =
                routes.get(&path).cloned().unwrap_or((404, "{\"detail\": \"not found\"}".into()));
            let header =
                Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap();
            let response = Response::from_string(body).with_status_code(status).with_header(header);
            let _ = request.respond(response);
            seen.push(path);
        }
        seen
    });
    TestServer {
        url: format!("http://{addr}"),
        handle,
    }
}

/// Returns a URL on a local port with nothing listening.
pub fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

// ============================================================================
// SECTION: Recording Fetcher
// ============================================================================

/// Fetcher answering from a table and recording every requested URL.
#[derive(Default)]
pub struct RecordingFetcher {
    /// Canned outcomes keyed by full URL; unknown URLs fail to connect.
    responses: BTreeMap<String, Result<FetchResponse, FetchError>>,
    /// URLs requested, in order.
    calls: Mutex<Vec<String>>,
}

impl RecordingFetcher {
    /// Registers a `200 OK` JSON body for a URL.
    pub fn ok(mut self, url: &str, body: &Value) -> Self {
        self.responses.insert(
            url.to_string(),
            Ok(FetchResponse {
                status: 200,
                body: body.to_string().into_bytes(),
            }),
        );
        self
    }

    /// Registers a raw response for a URL.
    pub fn status(mut self, url: &str, status: u16, body: &str) -> Self {
        self.responses.insert(
            url.to_string(),
            Ok(FetchResponse {
                status,
                body: body.as_bytes().to_vec(),
            }),
        );
        self
    }

    /// Returns the URLs requested so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Fetcher for RecordingFetcher {
    fn get(&self, url: &Url) -> Result<FetchResponse, FetchError> {
        self.calls.lock().unwrap().push(url.as_str().to_string());
        self.responses
            .get(url.as_str())
            .cloned()
            .unwrap_or_else(|| Err(FetchError::Request("connection refused".to_string())))
    }
}
