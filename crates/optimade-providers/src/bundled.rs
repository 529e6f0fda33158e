// crates/optimade-providers/src/bundled.rs
// ============================================================================
// Module: Bundled Providers List
// Description: Static providers snapshot compiled into the crate.
// Purpose: Last-resort data when every registry URL is unreachable.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! The snapshot in `data/providers.json` is embedded at compile time and
//! validated exactly like a remote payload before use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::error::ProviderError;
use crate::links::LinksResponse;

// ============================================================================
// SECTION: Bundled Data
// ============================================================================

/// Raw JSON of the bundled providers snapshot.
pub const BUNDLED_PROVIDERS_JSON: &str = include_str!("../data/providers.json");

/// Parses and validates the bundled providers snapshot.
///
/// # Errors
///
/// Returns [`ProviderError`] when the snapshot fails to parse or validate.
pub fn bundled_providers() -> Result<LinksResponse, ProviderError> {
    LinksResponse::from_json_str(BUNDLED_PROVIDERS_JSON)
}
