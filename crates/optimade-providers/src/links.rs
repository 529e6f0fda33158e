// crates/optimade-providers/src/links.rs
// ============================================================================
// Module: Links Schema
// Description: Typed links-resource models with JSON parsing and validation.
// Purpose: Validate provider registry and child-link payloads.
// Dependencies: serde, serde_json, url
// ============================================================================

//! ## Overview
//! A links endpoint answers with a [`LinksResponse`] whose `data` entries are
//! either fully typed [`LinksResource`] values or raw JSON objects that do
//! not match the typed shape. Both collapse to one canonical object through
//! [`LinkEntry::to_object`]; accessors read typed fields directly and borrow
//! from raw objects.
//! Invariants:
//! - Parsing distinguishes malformed JSON ([`ProviderError::Parse`]) from
//!   schema violations ([`ProviderError::Validation`]).
//! - A validated response has a `meta` object and every entry has a non-empty
//!   string `id` and a string `type`.
//! - Attributes never use the names `id`, `type`, or `attributes`, so merging
//!   them into the entry cannot shadow its identity.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde_json::Map;
use serde_json::Value;
use url::Url;

use crate::error::ProviderError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Attribute names that would collide with entry-level members once merged.
pub(crate) const RESERVED_ATTRIBUTE_NAMES: [&str; 3] = ["id", "type", "attributes"];

// ============================================================================
// SECTION: Enumerations
// ============================================================================

/// Relationship of a link to the provider that advertises it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    /// Database served under the provider.
    Child,
    /// Root index of the provider.
    Root,
    /// Link to another provider.
    External,
    /// Registry of providers.
    Providers,
}

impl LinkType {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Child => "child",
            Self::Root => "root",
            Self::External => "external",
            Self::Providers => "providers",
        }
    }

    /// Parses the wire representation.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "child" => Some(Self::Child),
            "root" => Some(Self::Root),
            "external" => Some(Self::External),
            "providers" => Some(Self::Providers),
            _ => None,
        }
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a linked database may be aggregated by clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregate {
    /// Aggregation is fine.
    Ok,
    /// Test database.
    Test,
    /// Staging database.
    Staging,
    /// Do not aggregate.
    No,
}

/// Resource type tag; only `"links"` matches the typed shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinksType {
    /// The `links` resource type.
    #[serde(rename = "links")]
    Links,
}

// ============================================================================
// SECTION: Base URL
// ============================================================================

/// Absolute URL kept verbatim so endpoint paths can be appended to it.
///
/// # Invariants
/// - The wrapped string parses as an absolute URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl(String);

impl BaseUrl {
    /// Validates and wraps a base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::InvalidUrl`] when the string is not an absolute URL.
    pub fn parse(raw: &str) -> Result<Self, ProviderError> {
        Url::parse(raw).map_err(|err| ProviderError::InvalidUrl(format!("{raw}: {err}")))?;
        Ok(Self(raw.to_string()))
    }

    /// Returns the URL exactly as supplied.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for BaseUrl {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for BaseUrl {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// SECTION: Typed Resource
// ============================================================================

/// Attributes of a typed links resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinksAttributes {
    /// Human-readable name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Base URL of the linked implementation, if any.
    pub base_url: Option<BaseUrl>,
    /// Homepage of the linked implementation, if any.
    #[serde(default)]
    pub homepage: Option<String>,
    /// Relationship of the link.
    pub link_type: LinkType,
    /// Aggregation hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregate: Option<Aggregate>,
    /// Reason aggregation is discouraged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_aggregate_reason: Option<String>,
    /// Additional attributes carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A fully typed links resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinksResource {
    /// Resource identifier.
    pub id: String,
    /// Resource type tag.
    #[serde(rename = "type")]
    pub resource_type: LinksType,
    /// Resource attributes.
    pub attributes: LinksAttributes,
    /// Resource-level metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
    /// Relationships to other resources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationships: Option<Value>,
    /// Resource links.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Value>,
}

// ============================================================================
// SECTION: Link Entries
// ============================================================================

/// One entry of a links response, typed when it matches the resource shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LinkEntry {
    /// Entry matching [`LinksResource`].
    Resource(LinksResource),
    /// Any other JSON object.
    Raw(Map<String, Value>),
}

impl LinkEntry {
    /// Returns the canonical JSON object for the entry.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Serialization`] when a typed entry cannot be
    /// rendered as an object.
    pub fn to_object(&self) -> Result<Map<String, Value>, ProviderError> {
        match self {
            Self::Raw(map) => Ok(map.clone()),
            Self::Resource(resource) => match serde_json::to_value(resource) {
                Ok(Value::Object(map)) => Ok(map),
                Ok(_) => Err(ProviderError::Serialization(
                    "links resource did not serialize to an object".to_string(),
                )),
                Err(err) => Err(ProviderError::Serialization(err.to_string())),
            },
        }
    }

    /// Returns the entry identifier.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Resource(resource) => Some(resource.id.as_str()),
            Self::Raw(map) => map.get("id").and_then(Value::as_str),
        }
    }

    /// Returns the declared link type, if it is a known value.
    #[must_use]
    pub fn link_type(&self) -> Option<LinkType> {
        match self {
            Self::Resource(resource) => Some(resource.attributes.link_type),
            Self::Raw(map) => {
                object_attribute(map, "link_type").and_then(Value::as_str).and_then(LinkType::parse)
            }
        }
    }

    /// Returns the declared base URL when it is a string.
    ///
    /// Null, missing, and non-string values all count as absent.
    #[must_use]
    pub fn base_url(&self) -> Option<&str> {
        match self {
            Self::Resource(resource) => resource.attributes.base_url.as_ref().map(BaseUrl::as_str),
            Self::Raw(map) => object_attribute(map, "base_url").and_then(Value::as_str),
        }
    }

    /// Returns true when the entry is a child link with a usable base URL.
    #[must_use]
    pub fn is_child_with_base_url(&self) -> bool {
        self.link_type() == Some(LinkType::Child) && self.base_url().is_some()
    }
}

/// Reads an attribute from a canonical entry object.
pub(crate) fn object_attribute<'a>(
    object: &'a Map<String, Value>,
    key: &str,
) -> Option<&'a Value> {
    object.get("attributes").and_then(Value::as_object).and_then(|attributes| attributes.get(key))
}

// ============================================================================
// SECTION: Response Envelope
// ============================================================================

/// Validated links response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinksResponse {
    /// Link entries in document order.
    pub data: Vec<LinkEntry>,
    /// Response metadata.
    pub meta: Map<String, Value>,
    /// Pagination and related links.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Value>,
    /// Included side-loaded resources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub included: Option<Value>,
}

impl LinksResponse {
    /// Parses and validates a links response from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Parse`] for malformed JSON and
    /// [`ProviderError::Validation`] for schema violations.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ProviderError> {
        let value: Value =
            serde_json::from_slice(bytes).map_err(|err| ProviderError::Parse(err.to_string()))?;
        Self::from_value(value)
    }

    /// Parses and validates a links response from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Parse`] for malformed JSON and
    /// [`ProviderError::Validation`] for schema violations.
    pub fn from_json_str(raw: &str) -> Result<Self, ProviderError> {
        Self::from_slice(raw.as_bytes())
    }

    /// Validates an already decoded JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Validation`] for schema violations.
    pub fn from_value(value: Value) -> Result<Self, ProviderError> {
        let response: Self = serde_json::from_value(value)
            .map_err(|err| ProviderError::Validation(err.to_string()))?;
        response.validate()?;
        Ok(response)
    }

    /// Checks the invariants serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Validation`] on the first invalid entry.
    pub fn validate(&self) -> Result<(), ProviderError> {
        for (index, entry) in self.data.iter().enumerate() {
            match entry {
                LinkEntry::Resource(resource) => {
                    if resource.id.is_empty() {
                        return Err(ProviderError::Validation(format!(
                            "data[{index}].id must be non-empty"
                        )));
                    }
                    validate_attribute_names(index, &resource.attributes.extra)?;
                }
                LinkEntry::Raw(map) => validate_raw_entry(index, map)?,
            }
        }
        Ok(())
    }
}

/// Validates an entry that did not match the typed resource shape.
fn validate_raw_entry(index: usize, map: &Map<String, Value>) -> Result<(), ProviderError> {
    match map.get("id") {
        Some(Value::String(id)) if !id.is_empty() => {}
        _ => {
            return Err(ProviderError::Validation(format!(
                "data[{index}].id must be a non-empty string"
            )));
        }
    }
    if !matches!(map.get("type"), Some(Value::String(_))) {
        return Err(ProviderError::Validation(format!("data[{index}].type must be a string")));
    }
    match map.get("attributes") {
        None => Ok(()),
        Some(Value::Object(attributes)) => validate_attribute_names(index, attributes),
        Some(_) => Err(ProviderError::Validation(format!(
            "data[{index}].attributes must be an object"
        ))),
    }
}

/// Rejects attributes named like entry-level members.
fn validate_attribute_names(
    index: usize,
    attributes: &Map<String, Value>,
) -> Result<(), ProviderError> {
    match RESERVED_ATTRIBUTE_NAMES.iter().find(|name| attributes.contains_key(**name)) {
        Some(name) => Err(ProviderError::Validation(format!(
            "data[{index}].attributes must not contain `{name}`"
        ))),
        None => Ok(()),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::panic,
        reason = "Test-only assertions are permitted."
    )]

    use serde_json::json;

    use super::*;

    fn resource_json(id: &str, link_type: &str, base_url: Value) -> Value {
        json!({
            "id": id,
            "type": "links",
            "attributes": {
                "name": id,
                "description": "test entry",
                "base_url": base_url,
                "homepage": null,
                "link_type": link_type
            }
        })
    }

    #[test]
    fn typed_entries_parse_as_resources() {
        let doc = json!({
            "data": [resource_json("mp", "external", json!("https://example.org"))],
            "meta": {}
        });
        let response = LinksResponse::from_value(doc).unwrap();
        assert!(matches!(response.data[0], LinkEntry::Resource(_)));
    }

    #[test]
    fn non_links_type_falls_back_to_raw() {
        let doc = json!({
            "data": [{"id": "x", "type": "child", "attributes": {"link_type": "child"}}],
            "meta": {}
        });
        let response = LinksResponse::from_value(doc).unwrap();
        assert!(matches!(response.data[0], LinkEntry::Raw(_)));
    }

    #[test]
    fn invalid_base_url_falls_back_to_raw() {
        let doc = json!({
            "data": [resource_json("bad", "child", json!("not a url"))],
            "meta": {}
        });
        let response = LinksResponse::from_value(doc).unwrap();
        assert!(matches!(response.data[0], LinkEntry::Raw(_)));
    }

    #[test]
    fn base_url_is_kept_verbatim() {
        let doc = json!({
            "data": [resource_json("mp", "child", json!("https://example.org"))],
            "meta": {}
        });
        let response = LinksResponse::from_value(doc).unwrap();
        assert_eq!(response.data[0].base_url(), Some("https://example.org"));
    }

    #[test]
    fn missing_meta_is_a_validation_error() {
        let err = LinksResponse::from_value(json!({"data": []})).unwrap_err();
        assert!(matches!(err, ProviderError::Validation(_)));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = LinksResponse::from_json_str("{\"data\": [").unwrap_err();
        assert!(matches!(err, ProviderError::Parse(_)));
    }

    #[test]
    fn raw_entry_without_id_is_rejected() {
        let doc = json!({"data": [{"type": "links"}], "meta": {}});
        let err = LinksResponse::from_value(doc).unwrap_err();
        match err {
            ProviderError::Validation(message) => assert!(message.contains("data[0].id")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn raw_entry_with_scalar_attributes_is_rejected() {
        let doc = json!({"data": [{"id": "a", "type": "links", "attributes": 3}], "meta": {}});
        assert!(LinksResponse::from_value(doc).is_err());
    }

    #[test]
    fn extra_attributes_survive_canonicalization() {
        let mut entry = resource_json("mp", "child", json!("https://example.org"));
        entry["attributes"]["custom"] = json!(7);
        let doc = json!({"data": [entry], "meta": {}});
        let response = LinksResponse::from_value(doc).unwrap();
        let object = response.data[0].to_object().unwrap();
        assert_eq!(object["attributes"]["custom"], json!(7));
        assert_eq!(object["type"], json!("links"));
    }

    #[test]
    fn attributes_shadowing_entry_members_are_rejected() {
        for name in RESERVED_ATTRIBUTE_NAMES {
            let mut attributes = Map::new();
            attributes.insert(name.to_string(), json!("exmpl"));
            let entry = json!({"id": "real", "type": "provider", "attributes": attributes});
            let err = LinksResponse::from_value(json!({"data": [entry], "meta": {}})).unwrap_err();
            assert!(matches!(err, ProviderError::Validation(_)), "raw entry with {name}");

            let mut typed = resource_json("real", "child", json!("https://example.org"));
            typed["attributes"][name] = json!("exmpl");
            let err = LinksResponse::from_value(json!({"data": [typed], "meta": {}})).unwrap_err();
            assert!(matches!(err, ProviderError::Validation(_)), "typed entry with {name}");
        }
    }

    #[test]
    fn non_string_base_url_is_not_usable() {
        let doc = json!({
            "data": [
                {
                    "id": "obj",
                    "type": "child",
                    "attributes": {"link_type": "child", "base_url": {"href": "https://x.org"}}
                },
                {"id": "num", "type": "child", "attributes": {"link_type": "child", "base_url": 7}},
                {
                    "id": "ok",
                    "type": "child",
                    "attributes": {"link_type": "child", "base_url": "https://x.org"}
                }
            ],
            "meta": {}
        });
        let response = LinksResponse::from_value(doc).unwrap();
        let usable: Vec<_> = response
            .data
            .iter()
            .filter(|entry| entry.is_child_with_base_url())
            .filter_map(LinkEntry::id)
            .collect();
        assert_eq!(usable, vec!["ok"]);
        assert_eq!(response.data[0].base_url(), None);
        assert_eq!(response.data[1].base_url(), None);
    }

    #[test]
    fn typed_and_raw_accessors_agree() {
        let typed = resource_json("t", "child", json!("https://t.org"));
        let raw = json!({
            "id": "r",
            "type": "child",
            "attributes": {"link_type": "child", "base_url": "https://t.org"}
        });
        let response =
            LinksResponse::from_value(json!({"data": [typed, raw], "meta": {}})).unwrap();
        assert!(matches!(response.data[0], LinkEntry::Resource(_)));
        assert!(matches!(response.data[1], LinkEntry::Raw(_)));
        for entry in &response.data {
            assert_eq!(entry.link_type(), Some(LinkType::Child));
            assert_eq!(entry.base_url(), Some("https://t.org"));
            assert!(entry.is_child_with_base_url());
        }
    }
}
