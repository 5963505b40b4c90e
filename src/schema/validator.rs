//! Field type and name validation
//!
//! Checks parsed schema fields against the fixed Solidity scalar allow-list
//! and the identifier rule, and detects duplicate field names. These checks
//! are independent of protocol-version logic and run on every successful
//! parse.

use std::collections::HashSet;

use super::SchemaField;

/// Check whether a scalar type (no array suffix) is a legal Solidity type
fn is_valid_scalar_type(scalar: &str) -> bool {
    match scalar {
        "address" | "bool" | "string" | "bytes" => true,
        _ => {
            // uintN / intN in 8-bit steps up to 256
            if let Some(width) = scalar.strip_prefix("uint").or_else(|| scalar.strip_prefix("int"))
            {
                return matches!(width.parse::<u32>(), Ok(w) if w >= 8 && w <= 256 && w % 8 == 0);
            }
            // bytes1 .. bytes32
            if let Some(size) = scalar.strip_prefix("bytes") {
                return matches!(size.parse::<u32>(), Ok(n) if n >= 1 && n <= 32);
            }
            false
        }
    }
}

/// Check whether a field type is legal, allowing one trailing `[]`
pub fn is_valid_solidity_type(field_type: &str) -> bool {
    let scalar = field_type.strip_suffix("[]").unwrap_or(field_type);
    is_valid_scalar_type(scalar)
}

/// Check whether a field name is a legal identifier
///
/// First character in `[A-Za-z_]`, subsequent characters in `[A-Za-z0-9_]`,
/// non-empty.
pub fn is_valid_field_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Validate types and names of all fields, returning collected errors
///
/// Emits one error per illegal type, one error per illegal name, and a
/// single error listing all duplicated names.
pub fn check_fields(fields: &[SchemaField]) -> Vec<String> {
    let mut errors = Vec::new();

    for field in fields {
        if !is_valid_solidity_type(&field.field_type) {
            errors.push(format!("Invalid Solidity type: {}", field.field_type));
        }
        if !is_valid_field_name(&field.name) {
            errors.push(format!("Invalid field name: {}", field.name));
        }
    }

    // One error mentioning all duplicated names, not one per occurrence
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    for field in fields {
        if !seen.insert(field.name.as_str()) && !duplicates.contains(&field.name) {
            duplicates.push(field.name.clone());
        }
    }
    if !duplicates.is_empty() {
        errors.push(format!("Duplicate field names: {}", duplicates.join(", ")));
    }

    errors
}
