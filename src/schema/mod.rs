//! Location schema validation
//!
//! This module provides the schema engine for the SDK: a parser for the
//! string-encoded field schema used by attestation registries, per-field
//! type and name validation, protocol conformance checking, and a
//! per-UID validation cache with strict/warn policy.

mod cache;
mod conformance;
mod parser;
mod validator;

pub use cache::{CacheEntry, SchemaValidationCache};
pub use conformance::{
    evaluate_schema, CURRENT_VERSION, LEGACY_VERSION, REQUIRED_FIELDS, VERSION_MARKER_FIELD,
};
pub use parser::parse_schema_string;
pub use validator::{check_fields, is_valid_field_name, is_valid_solidity_type};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SdkError};

/// A single typed, named field parsed from a schema string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaField {
    /// Solidity-style field type, optionally with a trailing `[]`
    pub field_type: String,

    /// Field name
    pub name: String,
}

impl SchemaField {
    /// Create a new schema field
    pub fn new(field_type: &str, name: &str) -> Self {
        SchemaField {
            field_type: field_type.to_string(),
            name: name.to_string(),
        }
    }
}

/// Runtime configuration for one registered schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Opaque identifier under which the schema is registered on-chain
    pub uid: String,

    /// Comma-separated `type name` field list
    pub raw_string: String,
}

impl SchemaConfig {
    /// Create a new schema configuration
    pub fn new(uid: &str, raw_string: &str) -> Self {
        SchemaConfig {
            uid: uid.to_string(),
            raw_string: raw_string.to_string(),
        }
    }

    /// Parse the raw string into its fields
    pub fn fields(&self) -> Result<Vec<SchemaField>> {
        parse_schema_string(&self.raw_string).ok_or_else(|| {
            SdkError::SchemaFormat(format!(
                "expected comma-separated 'type name' pairs, got {:?}",
                self.raw_string
            ))
        })
    }
}

/// Result of validating one schema string
///
/// `valid` and `conformant` are orthogonal: a schema can be well-typed and
/// well-named (`valid`) while still missing fields required by its protocol
/// version (not `conformant`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaValidationResult {
    /// Whether the string parsed and every field passed type/name rules
    pub valid: bool,

    /// Whether the field set covers the required set for `version`
    pub conformant: bool,

    /// Inferred protocol version (1 or 2)
    pub version: u8,

    /// Parsed fields, empty when parsing failed
    pub fields: Vec<SchemaField>,

    /// Required fields absent from the schema, in required-set order
    pub missing: Vec<String>,

    /// Format, type and name errors
    pub errors: Vec<String>,

    /// Advisory warnings; never affect `valid` or `conformant`
    pub warnings: Vec<String>,
}

impl SchemaValidationResult {
    /// Whether any field with the given name is present
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_config_fields() {
        let config = SchemaConfig::new("0x1", "string srs,string location");
        let fields = config.fields().unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0], SchemaField::new("string", "srs"));

        let config = SchemaConfig::new("0x2", "string");
        match config.fields().unwrap_err() {
            SdkError::SchemaFormat(message) => assert!(message.contains("type name")),
            other => panic!("Expected SchemaFormat error, got {:?}", other),
        }
    }
}
