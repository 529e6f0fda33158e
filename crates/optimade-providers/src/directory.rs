// crates/optimade-providers/src/directory.rs
// ============================================================================
// Module: Provider Directory
// Description: Provider-list resolution and child-link discovery.
// Purpose: Fetch, validate, and normalize the federated providers registry.
// Dependencies: serde_json, tracing, url
// ============================================================================

//! ## Overview
//! [`ProviderDirectory`] resolves the providers registry through an ordered
//! chain of [`Candidate`] sources and discovers the child databases a
//! provider advertises on its own links endpoint.
//! Invariants:
//! - Candidates are tried strictly in order; the first valid payload wins.
//! - Transport, decode, and schema failures inside the chain are recorded and
//!   skipped; anything else propagates immediately.
//! - Explicit file sources never fall back.
//! - Explicit URL sources never reach the bundled list.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;

use url::Url;

use crate::bundled::bundled_providers;
use crate::config::DirectoryConfig;
use crate::error::AttemptFailure;
use crate::error::FetchError;
use crate::error::ProviderError;
use crate::error::ResolutionError;
use crate::http::Fetcher;
use crate::http::HttpFetcher;
use crate::links::LinkEntry;
use crate::links::LinksResponse;
use crate::record::ProviderLink;
use crate::record::ProviderRecord;
use crate::record::unpack_providers;
use crate::source::Candidate;
use crate::source::ProviderSource;
use crate::source::default_candidates;
use crate::source::links_endpoint;
use crate::source::url_candidates;

// ============================================================================
// SECTION: Attempt Outcome
// ============================================================================

/// Result of a single recoverable attempt within the chain.
enum AttemptOutcome {
    /// Candidate produced a valid links response.
    Resolved(LinksResponse),
    /// Candidate failed recoverably; the reason is kept for diagnostics.
    Skipped(String),
}

// ============================================================================
// SECTION: Provider Directory
// ============================================================================

/// Resolves the providers registry and provider child links.
///
/// # Invariants
/// - `config` has passed [`DirectoryConfig::validate`].
#[derive(Debug, Clone)]
pub struct ProviderDirectory<F = HttpFetcher> {
    /// Validated directory configuration.
    config: DirectoryConfig,
    /// Network seam used for every GET.
    fetcher: F,
}

impl ProviderDirectory<HttpFetcher> {
    /// Creates a directory backed by the blocking HTTP fetcher.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when the configuration is invalid or the
    /// HTTP client cannot be built.
    pub fn new(config: DirectoryConfig) -> Result<Self, ProviderError> {
        config.validate()?;
        let fetcher = HttpFetcher::new(&config)?;
        Ok(Self {
            config,
            fetcher,
        })
    }
}

impl<F: Fetcher> ProviderDirectory<F> {
    /// Creates a directory with a caller-supplied fetcher.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::InvalidConfig`] when the configuration is invalid.
    pub fn with_fetcher(config: DirectoryConfig, fetcher: F) -> Result<Self, ProviderError> {
        config.validate()?;
        Ok(Self {
            config,
            fetcher,
        })
    }

    /// Returns the fetcher used for outbound requests.
    #[must_use]
    pub const fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &DirectoryConfig {
        &self.config
    }

    /// Resolves the providers registry and flattens it into records.
    ///
    /// With `add_identifier` set, each record gains a synthesized `_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Resolution`] when no candidate succeeds, or the
    /// first non-recoverable error encountered.
    pub fn resolve_providers(
        &self,
        add_identifier: bool,
        source: Option<&ProviderSource>,
    ) -> Result<Vec<ProviderRecord>, ProviderError> {
        let providers = self.resolve_links(source)?;
        unpack_providers(&providers, add_identifier)
    }

    /// Resolves the providers registry without normalizing it.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Resolution`] when no candidate succeeds, or the
    /// first non-recoverable error encountered.
    pub fn resolve_links(
        &self,
        source: Option<&ProviderSource>,
    ) -> Result<LinksResponse, ProviderError> {
        let candidates = match source {
            Some(ProviderSource::File(path)) => return self.load_file(path),
            Some(ProviderSource::Url(url)) => url_candidates(url),
            None => default_candidates(&self.config.registry_urls, self.config.bundled_fallback),
        };
        self.resolve_chain(&candidates)
    }

    /// Lists the child databases advertised by a provider.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Configuration`] when the provider has no base
    /// URL, [`ProviderError::Remote`] on a non-200 answer, and propagates
    /// transport, decode, and schema errors.
    pub fn discover_children<P>(&self, provider: &P) -> Result<Vec<LinkEntry>, ProviderError>
    where
        P: ProviderLink + ?Sized,
    {
        let provider_id = provider.provider_id().unwrap_or_default();
        let Some(base_url) = provider.provider_base_url() else {
            return Err(ProviderError::Configuration(format!(
                "provider {provider_id} provides no base URL"
            )));
        };
        let endpoint = links_endpoint(&base_url);
        let url = Url::parse(&endpoint)
            .map_err(|err| ProviderError::InvalidUrl(format!("{endpoint}: {err}")))?;
        tracing::debug!(provider_id = %provider_id, url = %endpoint, "fetching provider links");
        let response = self.fetcher.get(&url)?;
        if !response.is_ok() {
            return Err(ProviderError::Remote {
                url: endpoint,
                provider_id,
                status: response.status,
                body: response.body_lossy(),
            });
        }
        let links = LinksResponse::from_slice(&response.body)?;
        let children: Vec<LinkEntry> =
            links.data.into_iter().filter(LinkEntry::is_child_with_base_url).collect();
        tracing::debug!(provider_id = %provider_id, count = children.len(), "child links found");
        Ok(children)
    }

    /// Drives the candidate chain until one candidate resolves.
    fn resolve_chain(&self, candidates: &[Candidate]) -> Result<LinksResponse, ProviderError> {
        let mut attempts = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if matches!(candidate, Candidate::Bundled) {
                tracing::info!("remote providers lists unavailable; using bundled list");
            }
            tracing::debug!(source = candidate.label(), "trying providers source");
            match self.attempt(candidate)? {
                AttemptOutcome::Resolved(response) => {
                    tracing::debug!(
                        source = candidate.label(),
                        entries = response.data.len(),
                        "providers list resolved"
                    );
                    return Ok(response);
                }
                AttemptOutcome::Skipped(reason) => {
                    tracing::warn!(
                        source = candidate.label(),
                        reason = %reason,
                        "providers source failed"
                    );
                    attempts.push(AttemptFailure {
                        source: candidate.label().to_string(),
                        reason,
                    });
                }
            }
        }
        Err(ResolutionError {
            attempts,
        }
        .into())
    }

    /// Tries one candidate, classifying failures as recoverable or fatal.
    fn attempt(&self, candidate: &Candidate) -> Result<AttemptOutcome, ProviderError> {
        let body = match candidate {
            Candidate::Bundled => {
                return Ok(match bundled_providers() {
                    Ok(response) => AttemptOutcome::Resolved(response),
                    Err(err) => AttemptOutcome::Skipped(err.to_string()),
                });
            }
            Candidate::Remote(raw) => {
                let url = Url::parse(raw)
                    .map_err(|err| ProviderError::InvalidUrl(format!("{raw}: {err}")))?;
                match self.fetcher.get(&url) {
                    Ok(response) if response.is_ok() => response.body,
                    Ok(response) => {
                        return Ok(AttemptOutcome::Skipped(format!(
                            "http status {}",
                            response.status
                        )));
                    }
                    Err(err @ FetchError::Client(_)) => return Err(err.into()),
                    Err(err) => return Ok(AttemptOutcome::Skipped(err.to_string())),
                }
            }
        };
        match LinksResponse::from_slice(&body) {
            Ok(response) => Ok(AttemptOutcome::Resolved(response)),
            Err(err @ (ProviderError::Parse(_) | ProviderError::Validation(_))) => {
                Ok(AttemptOutcome::Skipped(err.to_string()))
            }
            Err(err) => Err(err),
        }
    }

    /// Loads an explicit file source; every failure is fatal.
    fn load_file(&self, path: &Path) -> Result<LinksResponse, ProviderError> {
        tracing::debug!(path = %path.display(), "loading providers list from file");
        let metadata = fs::metadata(path)
            .map_err(|err| ProviderError::Io(format!("{}: {err}", path.display())))?;
        let max_bytes = u64::try_from(self.config.max_response_bytes).unwrap_or(u64::MAX);
        if metadata.len() > max_bytes {
            return Err(ProviderError::Io(format!(
                "{}: file exceeds size limit of {} bytes",
                path.display(),
                self.config.max_response_bytes
            )));
        }
        let bytes =
            fs::read(path).map_err(|err| ProviderError::Io(format!("{}: {err}", path.display())))?;
        LinksResponse::from_slice(&bytes)
    }
}
