// crates/optimade-providers/src/identifier.rs
// ============================================================================
// Module: Storage Identifiers
// Description: Deterministic 12-byte identifiers for provider records.
// Purpose: Give provider records a stable `_id` for document stores.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! [`ObjectId`] is a 12-byte identifier synthesized from a database id and
//! type. The mapping is pure and infallible: the concatenated bytes are
//! truncated or right-padded with `'0'` to exactly [`OBJECT_ID_LEN`] bytes.
//! The rendered form is 24 lowercase hex characters, and records carry it in
//! extended-JSON shape (`{"$oid": "..."}`).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::fmt::Write as _;

use serde_json::Map;
use serde_json::Value;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Length of a storage identifier in bytes.
pub const OBJECT_ID_LEN: usize = 12;
/// Byte used to right-pad short identifiers.
const PAD_BYTE: u8 = b'0';
/// Extended-JSON key wrapping the hex identifier.
const OID_KEY: &str = "$oid";

// ============================================================================
// SECTION: Object Identifier
// ============================================================================

/// Deterministic 12-byte storage identifier.
///
/// # Invariants
/// - Always exactly [`OBJECT_ID_LEN`] bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId([u8; OBJECT_ID_LEN]);

impl ObjectId {
    /// Synthesizes the identifier for a database id and type.
    ///
    /// `"example"` + `"db"` becomes `b"exampledb000"`; inputs longer than 12
    /// bytes keep only their first 12 bytes.
    #[must_use]
    pub fn for_database(database_id: &str, database_type: &str) -> Self {
        let mut bytes = [PAD_BYTE; OBJECT_ID_LEN];
        let source = database_id.bytes().chain(database_type.bytes());
        for (slot, byte) in bytes.iter_mut().zip(source) {
            *slot = byte;
        }
        Self(bytes)
    }

    /// Returns the raw identifier bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; OBJECT_ID_LEN] {
        &self.0
    }

    /// Returns the lowercase hex rendering.
    #[must_use]
    pub fn to_hex(&self) -> String {
        let mut out = String::with_capacity(OBJECT_ID_LEN * 2);
        for byte in self.0 {
            let _ = write!(out, "{byte:02x}");
        }
        out
    }

    /// Returns the extended-JSON form stored under `_id`.
    #[must_use]
    pub fn to_extended_json(&self) -> Value {
        let mut map = Map::new();
        map.insert(OID_KEY.to_string(), Value::String(self.to_hex()));
        Value::Object(map)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
