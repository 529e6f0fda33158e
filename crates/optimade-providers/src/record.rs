// crates/optimade-providers/src/record.rs
// ============================================================================
// Module: Provider Records
// Description: Flat provider records and links-response normalization.
// Purpose: Reshape registry entries into records ready for storage or serving.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! [`unpack_providers`] turns a validated [`LinksResponse`] into flat
//! [`ProviderRecord`] values: attributes are merged to the top level, the
//! reserved `exmpl` entry is dropped, and an optional `_id` is attached.
//! [`ProviderLink`] abstracts over every shape a provider can arrive in so
//! child discovery accepts records, typed resources and raw objects alike.
//! Invariants:
//! - Output records never carry a nested `attributes` key.
//! - Output records never have `id == "exmpl"`.
//! - Output order matches input order with skipped entries omitted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::error::ProviderError;
use crate::identifier::ObjectId;
use crate::links::LinkEntry;
use crate::links::LinksResource;
use crate::links::LinksResponse;
use crate::links::RESERVED_ATTRIBUTE_NAMES;
use crate::links::object_attribute;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Identifier of the placeholder provider excluded from every listing.
pub const RESERVED_PROVIDER_ID: &str = "exmpl";
/// Key holding the synthesized storage identifier.
pub const OBJECT_ID_KEY: &str = "_id";
/// Key of the nested attributes object merged away during normalization.
const ATTRIBUTES_KEY: &str = "attributes";

// ============================================================================
// SECTION: Provider Record
// ============================================================================

/// Flat provider record.
///
/// # Invariants
/// - Has string `id` and `type` fields when produced by [`unpack_providers`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderRecord(Map<String, Value>);

impl ProviderRecord {
    /// Wraps an already flat object.
    #[must_use]
    pub const fn from_object(object: Map<String, Value>) -> Self {
        Self(object)
    }

    /// Returns the provider identifier.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.0.get("id").and_then(Value::as_str)
    }

    /// Returns the resource type.
    #[must_use]
    pub fn record_type(&self) -> Option<&str> {
        self.0.get("type").and_then(Value::as_str)
    }

    /// Returns the top-level base URL, if non-null.
    #[must_use]
    pub fn base_url(&self) -> Option<&str> {
        self.0.get("base_url").and_then(Value::as_str)
    }

    /// Returns a field by name.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns the underlying object.
    #[must_use]
    pub const fn as_object(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consumes the record and returns the underlying object.
    #[must_use]
    pub fn into_object(self) -> Map<String, Value> {
        self.0
    }
}

// ============================================================================
// SECTION: Normalization
// ============================================================================

/// Flattens a links response into provider records.
///
/// Attributes named `id`, `type`, or `attributes` are dropped rather than
/// merged, so a record keeps the identity of the entry it came from.
///
/// # Errors
///
/// Returns [`ProviderError::Serialization`] when a typed entry cannot be
/// canonicalized.
pub fn unpack_providers(
    providers: &LinksResponse,
    add_identifier: bool,
) -> Result<Vec<ProviderRecord>, ProviderError> {
    let mut records = Vec::with_capacity(providers.data.len());
    for entry in &providers.data {
        let mut object = entry.to_object()?;
        if let Some(Value::Object(attributes)) = object.remove(ATTRIBUTES_KEY) {
            object.extend(
                attributes
                    .into_iter()
                    .filter(|(key, _)| !RESERVED_ATTRIBUTE_NAMES.contains(&key.as_str())),
            );
        }
        if object.get("id").and_then(Value::as_str) == Some(RESERVED_PROVIDER_ID) {
            continue;
        }
        if add_identifier {
            let id = object.get("id").and_then(Value::as_str).unwrap_or_default();
            let record_type = object.get("type").and_then(Value::as_str).unwrap_or_default();
            let oid = ObjectId::for_database(id, record_type);
            object.insert(OBJECT_ID_KEY.to_string(), oid.to_extended_json());
        }
        records.push(ProviderRecord(object));
    }
    Ok(records)
}

// ============================================================================
// SECTION: Provider Link Capability
// ============================================================================

/// Anything that names a provider and where its implementation lives.
pub trait ProviderLink {
    /// Returns the provider identifier, if known.
    fn provider_id(&self) -> Option<String>;

    /// Returns the provider base URL, if non-null.
    fn provider_base_url(&self) -> Option<String>;
}

impl ProviderLink for ProviderRecord {
    fn provider_id(&self) -> Option<String> {
        self.id().map(str::to_string)
    }

    fn provider_base_url(&self) -> Option<String> {
        self.base_url().map(str::to_string)
    }
}

impl ProviderLink for LinksResource {
    fn provider_id(&self) -> Option<String> {
        Some(self.id.clone())
    }

    fn provider_base_url(&self) -> Option<String> {
        self.attributes.base_url.as_ref().map(|url| url.as_str().to_string())
    }
}

impl ProviderLink for Map<String, Value> {
    fn provider_id(&self) -> Option<String> {
        self.get("id").and_then(Value::as_str).map(str::to_string)
    }

    fn provider_base_url(&self) -> Option<String> {
        self.get("base_url")
            .or_else(|| object_attribute(self, "base_url"))
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

impl ProviderLink for LinkEntry {
    fn provider_id(&self) -> Option<String> {
        self.id().map(str::to_string)
    }

    fn provider_base_url(&self) -> Option<String> {
        self.base_url().map(str::to_string)
    }
}
