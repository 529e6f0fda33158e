// crates/optimade-providers/src/error.rs
// ============================================================================
// Module: Provider Directory Errors
// Description: Error taxonomy for provider resolution and child discovery.
// Purpose: Give callers stable, programmatically matchable failure variants.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! [`ProviderError`] is returned by every public operation in this crate.
//! Recoverable failures inside the candidate chain are captured as
//! [`AttemptFailure`] values and only surface through [`ResolutionError`] once
//! every candidate has been exhausted.
//! Invariants:
//! - Variants are stable for programmatic handling.
//! - No operation returns partial results alongside an error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use thiserror::Error;

use crate::config::ConfigError;

// ============================================================================
// SECTION: Fetch Errors
// ============================================================================

/// Errors emitted by a [`crate::Fetcher`] while retrieving a URL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// HTTP client could not be constructed.
    #[error("http client build failed: {0}")]
    Client(String),
    /// Connection, timeout, or other transport failure.
    #[error("http request failed: {0}")]
    Request(String),
    /// Response body could not be read.
    #[error("failed to read response body: {0}")]
    Body(String),
    /// Response body exceeded the configured limit.
    #[error("response exceeds size limit of {max_bytes} bytes")]
    TooLarge {
        /// Configured byte limit.
        max_bytes: usize,
    },
}

// ============================================================================
// SECTION: Resolution Errors
// ============================================================================

/// A single failed attempt within the candidate chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptFailure {
    /// URL (or source label) that was attempted.
    pub source: String,
    /// Human-readable reason the attempt was skipped.
    pub reason: String,
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.source, self.reason)
    }
}

/// No provider source could be resolved.
///
/// # Invariants
/// - `attempts` lists every candidate in the order it was tried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionError {
    /// Every attempted candidate with its failure reason.
    pub attempts: Vec<AttemptFailure>,
}

impl ResolutionError {
    /// Returns the attempted sources in trial order.
    #[must_use]
    pub fn attempted_sources(&self) -> Vec<&str> {
        self.attempts.iter().map(|attempt| attempt.source.as_str()).collect()
    }
}

impl fmt::Display for ResolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unable to retrieve providers list; tried: ")?;
        if self.attempts.is_empty() {
            return f.write_str("no sources");
        }
        for (index, attempt) in self.attempts.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{attempt}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ResolutionError {}

// ============================================================================
// SECTION: Provider Errors
// ============================================================================

/// Errors returned by provider directory operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// No candidate source produced a valid providers list.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    /// Directory configuration is invalid.
    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),
    /// Provider record is missing data required for the operation.
    #[error("provider configuration error: {0}")]
    Configuration(String),
    /// Remote endpoint answered with a non-success status.
    #[error("invalid response from {url} for provider {provider_id}: status {status}: {body}")]
    Remote {
        /// Endpoint that was queried.
        url: String,
        /// Provider whose endpoint was queried.
        provider_id: String,
        /// HTTP status code returned.
        status: u16,
        /// Response body, decoded lossily.
        body: String,
    },
    /// Transport failure outside the candidate chain.
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// Payload was not valid JSON.
    #[error("malformed json: {0}")]
    Parse(String),
    /// Payload did not satisfy the links schema.
    #[error("links schema validation failed: {0}")]
    Validation(String),
    /// Local file could not be read.
    #[error("io error: {0}")]
    Io(String),
    /// URL could not be parsed.
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    /// Typed entry could not be converted into its canonical object.
    #[error("serialization failed: {0}")]
    Serialization(String),
}
