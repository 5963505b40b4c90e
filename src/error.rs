//! Error types for the SDK
//!
//! This module provides a consolidated error type for the crate, covering
//! schema validation policy failures, extension lookup failures, and
//! collaborator (signing/chain) failures.

use std::io;
use thiserror::Error;

/// SDK error type
#[derive(Error, Debug)]
pub enum SdkError {
    /// Schema rejected under strict validation policy
    #[error("Schema validation failed for {uid}: {message}")]
    SchemaValidation {
        /// UID of the offending schema
        uid: String,
        /// Summary of what went wrong
        message: String,
        /// Field-level errors collected during validation
        errors: Vec<String>,
        /// Required fields absent from the schema
        missing: Vec<String>,
    },

    /// Schema string could not be parsed at all
    #[error("Invalid schema string: {0}")]
    SchemaFormat(String),

    /// No extension recognizes the requested format or input
    #[error("Extension lookup failed: {0}")]
    ExtensionLookup(String),

    /// Location format conversion failure
    #[error("Failed to convert location from {from} to {to}: {reason}")]
    LocationConversion {
        /// Source format
        from: String,
        /// Target format
        to: String,
        /// Underlying cause
        reason: String,
    },

    /// Attestation builder input failed a precondition
    #[error("Invalid attestation input: {0}")]
    InvalidInput(String),

    /// Media attachment rejected by its extension
    #[error("Media validation failed: {0}")]
    MediaValidation(String),

    /// Operation requires credentials that were never configured
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    /// Local revocation precondition failure
    #[error("Revocation error: {0}")]
    Revocation(String),

    /// Signing operation failure
    #[error("Signing error: {0}")]
    Signing(String),

    /// Chain interaction failure
    #[error("Chain error: {0}")]
    Chain(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type for the SDK
pub type Result<T> = std::result::Result<T, SdkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SdkError::SchemaValidation {
            uid: "0x1".to_string(),
            message: "missing required fields".to_string(),
            errors: vec![],
            missing: vec!["location".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Schema validation failed for 0x1: missing required fields"
        );

        let err = SdkError::LocationConversion {
            from: "wkt".to_string(),
            to: "geojson".to_string(),
            reason: "unsupported geometry".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to convert location from wkt to geojson: unsupported geometry"
        );
    }

    #[test]
    fn test_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: SdkError = io_err.into();
        match err {
            SdkError::IoError(_) => {}
            _ => panic!("Expected IoError variant"),
        }

        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: SdkError = json_err.into();
        match err {
            SdkError::JsonError(_) => {}
            _ => panic!("Expected JsonError variant"),
        }
    }
}
