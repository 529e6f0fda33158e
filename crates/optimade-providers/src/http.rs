// crates/optimade-providers/src/http.rs
// ============================================================================
// Module: HTTP Fetcher
// Description: Blocking HTTP GET with explicit timeouts and size limits.
// Purpose: Retrieve links documents from registries and provider endpoints.
// Dependencies: reqwest, url
// ============================================================================

//! ## Overview
//! [`Fetcher`] is the seam between the directory logic and the network.
//! [`HttpFetcher`] implements it with a blocking `reqwest` client whose
//! timeouts, redirect limit, and user agent come from [`DirectoryConfig`].
//! Invariants:
//! - Response bodies larger than `max_response_bytes` are rejected.
//! - Non-success statuses are returned, not treated as transport errors.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::blocking::Response;
use reqwest::redirect::Policy;
use url::Url;

use crate::config::DirectoryConfig;
use crate::error::FetchError;

// ============================================================================
// SECTION: Fetcher Trait
// ============================================================================

/// Status and body of a completed GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: Vec<u8>,
}

impl FetchResponse {
    /// Returns true for a `200 OK` response.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// Returns the body decoded as UTF-8, replacing invalid sequences.
    #[must_use]
    pub fn body_lossy(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Performs GET requests on behalf of the provider directory.
pub trait Fetcher: Send + Sync {
    /// Fetches the URL and returns its status and body.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when the request cannot be completed.
    fn get(&self, url: &Url) -> Result<FetchResponse, FetchError>;
}

// ============================================================================
// SECTION: Blocking HTTP Fetcher
// ============================================================================

/// Blocking `reqwest` implementation of [`Fetcher`].
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    /// HTTP client used for outbound requests.
    client: Client,
    /// Maximum response size allowed, in bytes.
    max_response_bytes: usize,
}

impl HttpFetcher {
    /// Builds a fetcher from directory configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Client`] when the HTTP client cannot be created.
    pub fn new(config: &DirectoryConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .user_agent(config.user_agent.clone())
            .redirect(Policy::limited(config.max_redirects))
            .build()
            .map_err(|err| FetchError::Client(err.to_string()))?;
        Ok(Self {
            client,
            max_response_bytes: config.max_response_bytes,
        })
    }
}

impl Fetcher for HttpFetcher {
    fn get(&self, url: &Url) -> Result<FetchResponse, FetchError> {
        let mut response = self
            .client
            .get(url.as_str())
            .send()
            .map_err(|err| FetchError::Request(err.to_string()))?;
        let status = response.status().as_u16();
        let body = read_response_limited(&mut response, self.max_response_bytes)?;
        Ok(FetchResponse {
            status,
            body,
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads the response body while enforcing a byte limit.
fn read_response_limited(
    response: &mut Response,
    max_bytes: usize,
) -> Result<Vec<u8>, FetchError> {
    let max_bytes_u64 = u64::try_from(max_bytes).map_err(|_| FetchError::TooLarge {
        max_bytes,
    })?;
    if let Some(expected) = response.content_length()
        && expected > max_bytes_u64
    {
        return Err(FetchError::TooLarge {
            max_bytes,
        });
    }
    let mut buf = Vec::new();
    let mut handle = response.take(max_bytes_u64.saturating_add(1));
    handle.read_to_end(&mut buf).map_err(|err| FetchError::Body(err.to_string()))?;
    if buf.len() > max_bytes {
        return Err(FetchError::TooLarge {
            max_bytes,
        });
    }
    Ok(buf)
}
