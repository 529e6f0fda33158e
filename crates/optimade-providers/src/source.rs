// crates/optimade-providers/src/source.rs
// ============================================================================
// Module: Provider Sources
// Description: Source selection and candidate-chain construction.
// Purpose: Turn a caller-supplied source into an ordered list of candidates.
// Dependencies: std
// ============================================================================

//! ## Overview
//! A [`ProviderSource`] is either a URL or a local file. URL sources expand
//! into up to three candidates so a bare host such as
//! `https://providers.optimade.org` reaches its links endpoint. When no source
//! is given the configured registry URLs are tried, followed by the bundled
//! list.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Path suffix that marks a URL as already pointing at a links endpoint.
const LINKS_SUFFIX: &str = "/links";
/// Versioned links path appended to bare URLs.
pub(crate) const VERSIONED_LINKS_PATH: &str = "/v1/links";
/// Label used for the bundled list in attempt reports.
pub const BUNDLED_SOURCE_LABEL: &str = "bundled providers list";

// ============================================================================
// SECTION: Provider Source
// ============================================================================

/// Caller-selected source for the providers list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderSource {
    /// Remote links endpoint or base URL.
    Url(String),
    /// Local JSON file holding a links response.
    File(PathBuf),
}

impl ProviderSource {
    /// Classifies a raw string: `http://` and `https://` are URLs, anything
    /// else is a file path.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let lowered = raw.trim_start().to_ascii_lowercase();
        if lowered.starts_with("http://") || lowered.starts_with("https://") {
            Self::Url(raw.trim().to_string())
        } else {
            Self::File(PathBuf::from(raw))
        }
    }
}

impl FromStr for ProviderSource {
    type Err = std::convert::Infallible;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(raw))
    }
}

impl fmt::Display for ProviderSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => f.write_str(url),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

// ============================================================================
// SECTION: Candidates
// ============================================================================

/// One step in the resolution chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    /// Remote URL to fetch.
    Remote(String),
    /// Providers list compiled into the crate.
    Bundled,
}

impl Candidate {
    /// Returns the label used in logs and attempt reports.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Remote(url) => url,
            Self::Bundled => BUNDLED_SOURCE_LABEL,
        }
    }
}

/// Expands an explicit URL source into the candidates tried for it.
#[must_use]
pub fn url_candidates(source: &str) -> Vec<Candidate> {
    let mut candidates = vec![Candidate::Remote(source.to_string())];
    let trimmed = source.trim_end_matches('/');
    if !trimmed.ends_with(LINKS_SUFFIX) {
        candidates.push(Candidate::Remote(format!("{trimmed}{VERSIONED_LINKS_PATH}")));
        candidates.push(Candidate::Remote(format!("{trimmed}{LINKS_SUFFIX}")));
    }
    candidates
}

/// Builds the default chain: registry URLs, then optionally the bundled list.
#[must_use]
pub fn default_candidates(registry_urls: &[String], bundled_fallback: bool) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> =
        registry_urls.iter().map(|url| Candidate::Remote(url.clone())).collect();
    if bundled_fallback {
        candidates.push(Candidate::Bundled);
    }
    candidates
}

/// Joins the versioned links path onto a provider base URL.
pub(crate) fn links_endpoint(base_url: &str) -> String {
    format!("{}{VERSIONED_LINKS_PATH}", base_url.trim_end_matches('/'))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
