//! Attestation record builder
//!
//! Assembles an [`UnsignedAttestation`] from caller input: resolves the
//! location format through the extension registry, runs optional format
//! conversion, processes media attachments, and fills in timestamp and
//! spatial reference defaults. When a schema is supplied, the assembled
//! record's field set is checked against it before the record is returned.

use chrono::Utc;
use log::debug;

use crate::error::{Result, SdkError};
use crate::extensions::{convert_location_format, ExtensionRegistry, LocationInput};
use crate::models::{UnsignedAttestation, DEFAULT_SRS};
use crate::schema::SchemaField;

/// A media attachment supplied to the builder
#[derive(Debug, Clone, PartialEq)]
pub struct MediaInput {
    /// MIME type of the payload
    pub media_type: String,

    /// Raw payload as given by the caller
    pub data: String,
}

impl MediaInput {
    /// Create a new media attachment
    pub fn new(media_type: &str, data: &str) -> Self {
        MediaInput {
            media_type: media_type.to_string(),
            data: data.to_string(),
        }
    }
}

/// Caller input for building an attestation
#[derive(Debug, Clone, Default)]
pub struct AttestationInput {
    /// The location; required
    pub location: Option<LocationInput>,

    /// Explicit location format tag; auto-detected when absent
    pub location_type: Option<String>,

    /// Convert the location to this format before encoding
    pub target_location_format: Option<String>,

    /// Media attachments
    pub media: Vec<MediaInput>,

    /// Event time in seconds; wall clock when absent
    pub timestamp: Option<u64>,

    /// Spatial reference system; `EPSG:4326` when absent
    pub srs: Option<String>,

    /// Free-text memo
    pub memo: Option<String>,

    /// Recipient address
    pub recipient: Option<String>,

    /// Revocability flag for on-chain registration
    pub revocable: Option<bool>,

    /// Expiration time in seconds
    pub expiration_time: Option<u64>,
}

/// Names every assembled record exposes to its schema
const RECORD_FIELD_NAMES: [&str; 9] = [
    "eventTimestamp",
    "srs",
    "locationType",
    "location",
    "recipeType",
    "recipePayload",
    "mediaType",
    "mediaData",
    "memo",
];

/// Builds unsigned attestation records against an extension registry
pub struct AttestationBuilder<'a> {
    registry: &'a ExtensionRegistry,
    schema_fields: Option<&'a [SchemaField]>,
}

impl<'a> AttestationBuilder<'a> {
    /// Create a builder over the given registry
    pub fn new(registry: &'a ExtensionRegistry) -> Self {
        AttestationBuilder {
            registry,
            schema_fields: None,
        }
    }

    /// Check assembled records against this schema's field set
    pub fn with_schema(mut self, fields: &'a [SchemaField]) -> Self {
        self.schema_fields = Some(fields);
        self
    }

    /// Assemble an unsigned attestation from caller input
    pub fn build(&self, input: AttestationInput) -> Result<UnsignedAttestation> {
        let location = input
            .location
            .ok_or_else(|| SdkError::InvalidInput("location is required".to_string()))?;

        // Resolve the handling extension: explicit tag wins, otherwise the
        // first registered extension recognizing the input
        let mut extension = match &input.location_type {
            Some(tag) => self.registry.location_by_type(tag).ok_or_else(|| {
                SdkError::ExtensionLookup(format!("no location extension registered for {}", tag))
            })?,
            None => self.registry.detect_location(&location).ok_or_else(|| {
                SdkError::ExtensionLookup(format!(
                    "no location extension recognizes {}",
                    location.describe()
                ))
            })?,
        };
        let detected = extension.location_type().to_string();

        // Optional format conversion before encoding
        let location = match &input.target_location_format {
            Some(target) if *target != detected => {
                debug!("Converting location from {} to {}", detected, target);
                let converted =
                    convert_location_format(&location, &detected, target, self.registry)?;
                extension = self.registry.location_by_type(target).ok_or_else(|| {
                    SdkError::ExtensionLookup(format!(
                        "no location extension registered for {}",
                        target
                    ))
                })?;
                converted
            }
            _ => location,
        };
        let location_string = extension.location_to_string(&location)?;
        let location_type = extension.location_type().to_string();

        // Media attachments: any failure aborts the whole build
        let mut media_type = Vec::with_capacity(input.media.len());
        let mut media_data = Vec::with_capacity(input.media.len());
        for attachment in &input.media {
            let media_ext = self
                .registry
                .media_for(&attachment.media_type)
                .ok_or_else(|| {
                    SdkError::ExtensionLookup(format!(
                        "no media extension supports {}",
                        attachment.media_type
                    ))
                })?;
            if !media_ext.validate_media(&attachment.media_type, &attachment.data) {
                return Err(SdkError::MediaValidation(format!(
                    "invalid {} payload",
                    attachment.media_type
                )));
            }
            let processed = media_ext.process_media(&attachment.media_type, &attachment.data)?;
            media_type.push(attachment.media_type.clone());
            media_data.push(processed);
        }

        let event_timestamp = input
            .timestamp
            .unwrap_or_else(|| Utc::now().timestamp() as u64);

        let record = UnsignedAttestation {
            event_timestamp,
            srs: input.srs.unwrap_or_else(|| DEFAULT_SRS.to_string()),
            location_type,
            location: location_string,
            recipe_type: Vec::new(),
            recipe_payload: Vec::new(),
            media_type,
            media_data,
            memo: input.memo,
            recipient: input.recipient,
            revocable: input.revocable,
            expiration_time: input.expiration_time,
        };

        if let Some(fields) = self.schema_fields {
            self.check_against_schema(&record, fields)?;
        }

        Ok(record)
    }

    /// Ensure the schema declares every field the record carries
    fn check_against_schema(
        &self,
        record: &UnsignedAttestation,
        fields: &[SchemaField],
    ) -> Result<()> {
        let absent: Vec<&str> = RECORD_FIELD_NAMES
            .iter()
            .filter(|name| !fields.iter().any(|f| &f.name == *name))
            .copied()
            .collect();
        if !absent.is_empty() {
            return Err(SdkError::InvalidInput(format!(
                "record does not match schema; schema lacks fields: {} (record location type {})",
                absent.join(", "),
                record.location_type
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_SCHEMA_STRING;
    use crate::schema::parse_schema_string;

    fn registry() -> ExtensionRegistry {
        ExtensionRegistry::with_defaults()
    }

    fn point_input() -> AttestationInput {
        AttestationInput {
            location: Some(LocationInput::Coordinates { lon: 12.0, lat: 34.0 }),
            timestamp: Some(1_700_000_000),
            ..Default::default()
        }
    }

    #[test]
    fn test_build_minimal() {
        let registry = registry();
        let builder = AttestationBuilder::new(&registry);
        let record = builder.build(point_input()).unwrap();

        assert_eq!(record.event_timestamp, 1_700_000_000);
        assert_eq!(record.srs, DEFAULT_SRS);
        assert_eq!(record.location_type, "geojson");
        assert!(record.location.contains("Point"));
        assert!(record.recipe_type.is_empty());
        assert!(record.recipe_payload.is_empty());
        assert!(record.media_type.is_empty());
    }

    #[test]
    fn test_build_requires_location() {
        let registry = registry();
        let builder = AttestationBuilder::new(&registry);
        let err = builder.build(AttestationInput::default()).unwrap_err();
        match err {
            SdkError::InvalidInput(message) => assert!(message.contains("location")),
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_build_with_explicit_type() {
        let registry = registry();
        let builder = AttestationBuilder::new(&registry);
        let mut input = point_input();
        input.location = Some(LocationInput::Text("POINT(1 2)".into()));
        input.location_type = Some("wkt".to_string());
        let record = builder.build(input).unwrap();
        assert_eq!(record.location_type, "wkt");
        assert_eq!(record.location, "POINT(1 2)");
    }

    #[test]
    fn test_build_unresolvable_input() {
        let registry = registry();
        let builder = AttestationBuilder::new(&registry);
        let mut input = point_input();
        input.location = Some(LocationInput::Text("nowhere in particular".into()));
        let err = builder.build(input).unwrap_err();
        match err {
            SdkError::ExtensionLookup(message) => {
                assert!(message.contains("nowhere in particular"))
            }
            other => panic!("Expected ExtensionLookup, got {:?}", other),
        }
    }

    #[test]
    fn test_build_unknown_explicit_type() {
        let registry = registry();
        let builder = AttestationBuilder::new(&registry);
        let mut input = point_input();
        input.location_type = Some("h3".to_string());
        assert!(matches!(
            builder.build(input),
            Err(SdkError::ExtensionLookup(_))
        ));
    }

    #[test]
    fn test_build_with_format_conversion() {
        let registry = registry();
        let builder = AttestationBuilder::new(&registry);
        let mut input = point_input();
        input.location = Some(LocationInput::Text("POINT(10 20)".into()));
        input.target_location_format = Some("geojson".to_string());
        let record = builder.build(input).unwrap();
        assert_eq!(record.location_type, "geojson");
        assert!(record.location.contains("coordinates"));
    }

    #[test]
    fn test_conversion_failure_names_formats() {
        let registry = registry();
        let builder = AttestationBuilder::new(&registry);
        let mut input = point_input();
        // Only point WKT converts; a polygon fails inside the conversion
        input.location = Some(LocationInput::Text("POLYGON((0 0,1 0,1 1,0 0))".into()));
        input.target_location_format = Some("geojson".to_string());
        let err = builder.build(input).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("wkt"));
        assert!(message.contains("geojson"));
    }

    #[test]
    fn test_build_with_media() {
        let registry = registry();
        let builder = AttestationBuilder::new(&registry);
        let mut input = point_input();
        input.media = vec![MediaInput::new("image/jpeg", "/9j/4AAQSkZJRg==")];
        let record = builder.build(input).unwrap();
        assert_eq!(record.media_type, vec!["image/jpeg".to_string()]);
        assert_eq!(record.media_data, vec!["/9j/4AAQSkZJRg==".to_string()]);
    }

    #[test]
    fn test_media_failure_aborts_build() {
        let registry = registry();
        let builder = AttestationBuilder::new(&registry);

        // Unknown MIME type
        let mut input = point_input();
        input.media = vec![
            MediaInput::new("image/jpeg", "/9j/4AAQSkZJRg=="),
            MediaInput::new("application/x-unknown", "AAAA"),
        ];
        assert!(matches!(
            builder.build(input),
            Err(SdkError::ExtensionLookup(_))
        ));

        // Bad payload
        let mut input = point_input();
        input.media = vec![MediaInput::new("image/jpeg", "not base64!!")];
        assert!(matches!(
            builder.build(input),
            Err(SdkError::MediaValidation(_))
        ));
    }

    #[test]
    fn test_schema_shape_check() {
        let registry = registry();
        let fields = parse_schema_string(DEFAULT_SCHEMA_STRING).unwrap();
        let builder = AttestationBuilder::new(&registry).with_schema(&fields);
        assert!(builder.build(point_input()).is_ok());

        // A schema missing record fields rejects the assembled record
        let narrow = parse_schema_string("string srs,string locationType,string location").unwrap();
        let builder = AttestationBuilder::new(&registry).with_schema(&narrow);
        let err = builder.build(point_input()).unwrap_err();
        assert!(err.to_string().contains("eventTimestamp"));
    }

    #[test]
    fn test_wall_clock_timestamp_default() {
        let registry = registry();
        let builder = AttestationBuilder::new(&registry);
        let mut input = point_input();
        input.timestamp = None;
        let before = Utc::now().timestamp() as u64;
        let record = builder.build(input).unwrap();
        let after = Utc::now().timestamp() as u64;
        assert!(record.event_timestamp >= before && record.event_timestamp <= after);
    }
}
