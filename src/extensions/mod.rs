//! Location and media extensions
//!
//! Pluggable handlers for location geometry formats and media attachments.
//! Extensions are held in an explicit registry with deterministic
//! first-match-wins probing for auto-detection, so detection never depends
//! on hidden insertion-order behavior.

mod geojson;
mod media;
mod wkt;

pub use geojson::GeoJsonExtension;
pub use media::StandardMediaExtension;
pub use wkt::WktExtension;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SdkError};

/// A caller-supplied location, in one of the recognized input shapes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocationInput {
    /// Structured GeoJSON-style object
    GeoJson(serde_json::Value),

    /// Longitude/latitude coordinate pair
    Coordinates {
        /// Longitude in decimal degrees
        lon: f64,
        /// Latitude in decimal degrees
        lat: f64,
    },

    /// Raw text payload (WKT text, serialized GeoJSON, format-specific token)
    Text(String),
}

impl LocationInput {
    /// Short description of the input for error messages
    pub fn describe(&self) -> String {
        match self {
            LocationInput::GeoJson(value) => format!("GeoJSON object {}", value),
            LocationInput::Coordinates { lon, lat } => {
                format!("coordinates ({}, {})", lon, lat)
            }
            LocationInput::Text(text) => format!("text {:?}", text),
        }
    }
}

/// Handler for one location geometry format
pub trait LocationExtension: Send + Sync {
    /// Format tag this extension handles (e.g. "geojson")
    fn location_type(&self) -> &str;

    /// Whether this extension recognizes the input shape
    fn validate_location(&self, input: &LocationInput) -> bool;

    /// Encode the location as the canonical string for this format
    fn location_to_string(&self, input: &LocationInput) -> Result<String>;

    /// Convert the location to a GeoJSON value (the interchange format)
    fn location_to_geojson(&self, input: &LocationInput) -> Result<serde_json::Value>;

    /// Build a location from a GeoJSON value
    fn location_from_geojson(&self, value: &serde_json::Value) -> Result<LocationInput>;

    /// Parse this format's string encoding back into a location
    fn parse_location_string(&self, raw: &str) -> Result<LocationInput>;
}

/// Handler for one or more media MIME types
pub trait MediaExtension: Send + Sync {
    /// MIME types this extension handles
    fn supported_media_types(&self) -> Vec<String>;

    /// Whether this extension handles the given MIME type
    fn supports_media_type(&self, media_type: &str) -> bool {
        self.supported_media_types()
            .iter()
            .any(|t| t == media_type)
    }

    /// Whether the payload is well-formed for the given MIME type
    fn validate_media(&self, media_type: &str, data: &str) -> bool;

    /// Transform the payload into its stored representation
    fn process_media(&self, media_type: &str, data: &str) -> Result<String>;
}

/// Registry of location and media extensions
///
/// Probe order for auto-detection is registration order.
pub struct ExtensionRegistry {
    location: Vec<Box<dyn LocationExtension>>,
    media: Vec<Box<dyn MediaExtension>>,
}

impl ExtensionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        ExtensionRegistry {
            location: Vec::new(),
            media: Vec::new(),
        }
    }

    /// Create a registry populated with the built-in extensions
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_location(Box::new(GeoJsonExtension));
        registry.register_location(Box::new(WktExtension));
        registry.register_media(Box::new(StandardMediaExtension::new()));
        registry
    }

    /// Register a location extension at the end of the probe order
    pub fn register_location(&mut self, extension: Box<dyn LocationExtension>) {
        self.location.push(extension);
    }

    /// Register a media extension at the end of the probe order
    pub fn register_media(&mut self, extension: Box<dyn MediaExtension>) {
        self.media.push(extension);
    }

    /// Look up a location extension by its format tag
    pub fn location_by_type(&self, location_type: &str) -> Option<&dyn LocationExtension> {
        self.location
            .iter()
            .find(|e| e.location_type() == location_type)
            .map(|e| e.as_ref())
    }

    /// Find the first location extension that recognizes the input
    pub fn detect_location(&self, input: &LocationInput) -> Option<&dyn LocationExtension> {
        self.location
            .iter()
            .find(|e| e.validate_location(input))
            .map(|e| e.as_ref())
    }

    /// Find the first media extension that supports the MIME type
    pub fn media_for(&self, media_type: &str) -> Option<&dyn MediaExtension> {
        self.media
            .iter()
            .find(|e| e.supports_media_type(media_type))
            .map(|e| e.as_ref())
    }

    /// Registered location format tags, in probe order
    pub fn location_types(&self) -> Vec<String> {
        self.location
            .iter()
            .map(|e| e.location_type().to_string())
            .collect()
    }
}

impl Default for ExtensionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert a location from one registered format to another
///
/// Goes through GeoJSON as the interchange representation. Failures are
/// wrapped with both format names attached.
pub fn convert_location_format(
    input: &LocationInput,
    from: &str,
    to: &str,
    registry: &ExtensionRegistry,
) -> Result<LocationInput> {
    let wrap = |reason: String| SdkError::LocationConversion {
        from: from.to_string(),
        to: to.to_string(),
        reason,
    };

    let source = registry
        .location_by_type(from)
        .ok_or_else(|| wrap(format!("no extension registered for {}", from)))?;
    let target = registry
        .location_by_type(to)
        .ok_or_else(|| wrap(format!("no extension registered for {}", to)))?;

    let geojson = source
        .location_to_geojson(input)
        .map_err(|e| wrap(e.to_string()))?;
    target
        .location_from_geojson(&geojson)
        .map_err(|e| wrap(e.to_string()))
}
