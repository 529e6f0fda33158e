// crates/optimade-providers/src/lib.rs
// ============================================================================
// Module: OPTIMADE Providers
// Description: Federated provider registry resolution and child-link discovery.
// Purpose: Give servers and tooling a validated, flat view of OPTIMADE providers.
// Dependencies: reqwest, serde, serde_json, thiserror, toml, tracing, url
// ============================================================================

//! ## Overview
//! This crate resolves the registry of federated OPTIMADE providers from a
//! remote endpoint, a local file, or a bundled snapshot, validates it against
//! the links-resource schema, and flattens each entry into a
//! [`ProviderRecord`]. [`ProviderDirectory::discover_children`] queries a
//! provider's own links endpoint for the child databases it serves.
//! Invariants:
//! - Resolution is first-success-wins over an ordered candidate chain.
//! - Normalized records never include the reserved `exmpl` provider.
//! - Failures never yield partial results.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod bundled;
pub mod config;
pub mod directory;
pub mod error;
pub mod http;
pub mod identifier;
pub mod links;
pub mod record;
pub mod source;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use bundled::bundled_providers;
pub use config::ConfigError;
pub use config::DEFAULT_REGISTRY_URLS;
pub use config::DirectoryConfig;
pub use directory::ProviderDirectory;
pub use error::AttemptFailure;
pub use error::FetchError;
pub use error::ProviderError;
pub use error::ResolutionError;
pub use http::FetchResponse;
pub use http::Fetcher;
pub use http::HttpFetcher;
pub use identifier::ObjectId;
pub use links::LinkEntry;
pub use links::LinkType;
pub use links::LinksResource;
pub use links::LinksResponse;
pub use record::ProviderLink;
pub use record::ProviderRecord;
pub use record::unpack_providers;
pub use source::Candidate;
pub use source::ProviderSource;
