//! Protocol conformance checking
//!
//! Infers the protocol version of a parsed schema, checks that the required
//! field set for that version is present, and emits advisory warnings for
//! type mismatches on well-known fields. Also hosts the full validation
//! pipeline that the cache runs on a miss.

use log::warn;

use super::parser::parse_schema_string;
use super::validator::check_fields;
use super::{SchemaField, SchemaValidationResult};

/// Fields every location schema must declare, regardless of version
pub const REQUIRED_FIELDS: [&str; 3] = ["srs", "locationType", "location"];

/// Presence of this field classifies a schema as version 2
pub const VERSION_MARKER_FIELD: &str = "specVersion";

/// Protocol version assigned to schemas without a version marker
pub const LEGACY_VERSION: u8 = 1;

/// Protocol version assigned to schemas carrying the version marker
pub const CURRENT_VERSION: u8 = 2;

/// Infer the protocol version from field names alone
fn infer_version(fields: &[SchemaField]) -> u8 {
    if fields.iter().any(|f| f.name == VERSION_MARKER_FIELD) {
        CURRENT_VERSION
    } else {
        LEGACY_VERSION
    }
}

/// Collect required fields absent from the schema, in required-set order
fn missing_required_fields(fields: &[SchemaField]) -> Vec<String> {
    REQUIRED_FIELDS
        .iter()
        .filter(|required| !fields.iter().any(|f| &f.name == *required))
        .map(|required| required.to_string())
        .collect()
}

/// Advisory type expectations for well-known fields
const EXPECTED_TYPES: [(&str, &str); 2] = [(VERSION_MARKER_FIELD, "uint8"), ("srs", "string")];

/// Collect advisory warnings; these never affect validity or conformance
fn collect_warnings(fields: &[SchemaField], version: u8) -> Vec<String> {
    let mut warnings = Vec::new();

    for (name, expected) in EXPECTED_TYPES {
        if let Some(field) = fields.iter().find(|f| f.name == name) {
            if field.field_type != expected {
                warnings.push(format!(
                    "Field '{}' is expected to be {}, found {}",
                    name, expected, field.field_type
                ));
            }
        }
    }

    if version == LEGACY_VERSION {
        warnings.push(format!(
            "Schema does not declare a '{}' field; treating it as a legacy version {} schema",
            VERSION_MARKER_FIELD, LEGACY_VERSION
        ));
    }

    warnings
}

/// Run the full parse, type/name-check and conformance pipeline
///
/// Unparseable input short-circuits to an invalid result with a format-level
/// error, reported under the legacy version number; version inference is
/// never reached in that case.
pub fn evaluate_schema(raw_string: &str) -> SchemaValidationResult {
    let fields = match parse_schema_string(raw_string) {
        Some(fields) => fields,
        None => {
            warn!("Schema string failed to parse: {:?}", raw_string);
            return SchemaValidationResult {
                valid: false,
                conformant: false,
                version: LEGACY_VERSION,
                fields: Vec::new(),
                missing: Vec::new(),
                errors: vec![format!(
                    "Invalid schema format: expected comma-separated 'type name' pairs, got {:?}",
                    raw_string
                )],
                warnings: Vec::new(),
            };
        }
    };

    let errors = check_fields(&fields);
    let version = infer_version(&fields);
    let missing = missing_required_fields(&fields);
    let warnings = collect_warnings(&fields, version);

    SchemaValidationResult {
        valid: errors.is_empty(),
        conformant: missing.is_empty(),
        version,
        fields,
        missing,
        errors,
        warnings,
    }
}
