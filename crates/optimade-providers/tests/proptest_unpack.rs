//! Normalization property-based tests.
//!
//! ## Purpose
//! These tests feed randomized provider lists through [`unpack_providers`] to
//! prove the reserved entry is always dropped and attributes never remain
//! nested, whatever mix of typed and raw entries arrives.
//!
//! ## What is covered
//! - Output ids are the input ids minus every `exmpl` entry, in order.
//! - Raw attributes named `id` or `attributes` never leak into the record,
//!   even when the response was assembled without validation.
//! - Validation rejects entries whose attributes shadow entry members.
// crates/optimade-providers/tests/proptest_unpack.rs
// ============================================================================
// Module: Normalization Property-Based Tests
// Description: Randomized checks for provider-list normalization.
// Purpose: Ensure the output invariants hold for arbitrary entry mixes.
// ============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions and helpers are permitted."
)]

use optimade_providers::LinkEntry;
use optimade_providers::LinksResponse;
use optimade_providers::unpack_providers;
use proptest::prelude::*;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;

/// Extra member smuggled into a raw entry's attributes.
#[derive(Debug, Clone)]
enum Shadow {
    /// Attributes are well formed.
    None,
    /// Attributes carry their own `id`.
    Id(String),
    /// Attributes carry a nested `attributes` object.
    Nested,
}

/// Builds either a typed or a raw entry for the given id.
fn entry(id: &str, typed: bool, shadow: &Shadow) -> Value {
    if typed {
        return json!({
            "id": id,
            "type": "links",
            "attributes": {
                "name": id,
                "description": "generated",
                "base_url": null,
                "homepage": null,
                "link_type": "external"
            }
        });
    }
    let mut attributes = Map::new();
    attributes.insert("note".to_string(), json!(id));
    match shadow {
        Shadow::None => {}
        Shadow::Id(inner) => {
            attributes.insert("id".to_string(), json!(inner));
        }
        Shadow::Nested => {
            attributes.insert("attributes".to_string(), json!({"deep": true}));
        }
    }
    json!({"id": id, "type": "provider", "attributes": attributes})
}

/// Ids drawn from a small pool so the reserved one shows up often.
fn id_strategy() -> impl Strategy<Value = String> {
    prop_oneof![Just("exmpl".to_string()), "[a-z]{2,8}",]
}

/// Shadowing members, absent most of the time.
fn shadow_strategy() -> impl Strategy<Value = Shadow> {
    prop_oneof![
        2 => Just(Shadow::None),
        1 => id_strategy().prop_map(Shadow::Id),
        1 => Just(Shadow::Nested),
    ]
}

/// Assembles a response directly, skipping validation.
fn unvalidated_response(data: Vec<Value>) -> LinksResponse {
    LinksResponse {
        data: data
            .into_iter()
            .map(|value| serde_json::from_value::<LinkEntry>(value).unwrap())
            .collect(),
        meta: Map::new(),
        links: None,
        included: None,
    }
}

proptest! {
    #[test]
    fn reserved_entries_are_dropped_and_order_kept(
        entries in prop::collection::vec((id_strategy(), any::<bool>()), 0..24),
        add_identifier in any::<bool>(),
    ) {
        let data: Vec<Value> =
            entries.iter().map(|(id, typed)| entry(id, *typed, &Shadow::None)).collect();
        let response = LinksResponse::from_value(json!({"data": data, "meta": {}})).unwrap();

        let records = unpack_providers(&response, add_identifier).unwrap();

        let expected: Vec<&str> = entries
            .iter()
            .map(|(id, _)| id.as_str())
            .filter(|id| *id != "exmpl")
            .collect();
        let actual: Vec<&str> = records.iter().map(|record| record.id().unwrap()).collect();
        prop_assert_eq!(actual, expected);
        for record in &records {
            prop_assert!(record.get("attributes").is_none());
            prop_assert_eq!(record.get("_id").is_some(), add_identifier);
        }
    }

    #[test]
    fn shadowing_attributes_never_leak(
        entries in prop::collection::vec((id_strategy(), any::<bool>(), shadow_strategy()), 0..24),
    ) {
        let data: Vec<Value> =
            entries.iter().map(|(id, typed, shadow)| entry(id, *typed, shadow)).collect();
        let response = unvalidated_response(data);

        let records = unpack_providers(&response, false).unwrap();

        let expected: Vec<&str> = entries
            .iter()
            .map(|(id, _, _)| id.as_str())
            .filter(|id| *id != "exmpl")
            .collect();
        let actual: Vec<&str> = records.iter().map(|record| record.id().unwrap()).collect();
        prop_assert_eq!(actual, expected);
        for record in &records {
            prop_assert!(record.get("attributes").is_none());
            prop_assert_ne!(record.id(), Some("exmpl"));
        }
    }

    #[test]
    fn validation_rejects_shadowing_attributes(
        entries in prop::collection::vec((id_strategy(), any::<bool>(), shadow_strategy()), 1..12),
    ) {
        let shadowed = entries
            .iter()
            .any(|(_, typed, shadow)| !*typed && !matches!(shadow, Shadow::None));
        let data: Vec<Value> =
            entries.iter().map(|(id, typed, shadow)| entry(id, *typed, shadow)).collect();

        let result = LinksResponse::from_value(json!({"data": data, "meta": {}}));

        prop_assert_eq!(result.is_err(), shadowed);
    }
}
