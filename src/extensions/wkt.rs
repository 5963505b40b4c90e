//! Built-in WKT location extension
//!
//! Accepts well-known-text geometry strings. Only point geometries can be
//! converted to and from GeoJSON; other WKT kinds pass through validation
//! and string encoding untouched.

use serde_json::Value;

use crate::error::{Result, SdkError};

use super::{LocationExtension, LocationInput};

/// WKT geometry keywords this extension recognizes
const WKT_KEYWORDS: [&str; 7] = [
    "POINT",
    "LINESTRING",
    "POLYGON",
    "MULTIPOINT",
    "MULTILINESTRING",
    "MULTIPOLYGON",
    "GEOMETRYCOLLECTION",
];

/// Location extension for WKT geometry strings
pub struct WktExtension;

impl WktExtension {
    /// Whether the text looks like a WKT geometry
    fn is_wkt(text: &str) -> bool {
        let trimmed = text.trim();
        WKT_KEYWORDS.iter().any(|keyword| {
            trimmed
                .strip_prefix(keyword)
                .map_or(false, |rest| rest.trim_start().starts_with('('))
        })
    }

    /// Parse the coordinate pair out of a `POINT(x y)` string
    fn parse_point(text: &str) -> Option<(f64, f64)> {
        let trimmed = text.trim().strip_prefix("POINT")?.trim_start();
        let inner = trimmed.strip_prefix('(')?.strip_suffix(')')?;
        let mut parts = inner.split_whitespace();
        let lon = parts.next()?.parse().ok()?;
        let lat = parts.next()?.parse().ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some((lon, lat))
    }

    fn as_text(input: &LocationInput) -> Result<String> {
        match input {
            LocationInput::Text(text) if Self::is_wkt(text) => Ok(text.trim().to_string()),
            LocationInput::Coordinates { lon, lat } => Ok(format!("POINT({} {})", lon, lat)),
            other => Err(SdkError::InvalidInput(format!(
                "not a WKT geometry: {}",
                other.describe()
            ))),
        }
    }
}

impl LocationExtension for WktExtension {
    fn location_type(&self) -> &str {
        "wkt"
    }

    fn validate_location(&self, input: &LocationInput) -> bool {
        match input {
            LocationInput::Text(text) => Self::is_wkt(text),
            LocationInput::Coordinates { .. } => true,
            LocationInput::GeoJson(_) => false,
        }
    }

    fn location_to_string(&self, input: &LocationInput) -> Result<String> {
        Self::as_text(input)
    }

    fn location_to_geojson(&self, input: &LocationInput) -> Result<Value> {
        let text = Self::as_text(input)?;
        let (lon, lat) = Self::parse_point(&text).ok_or_else(|| {
            SdkError::InvalidInput(format!(
                "only WKT points can be converted to GeoJSON, got {:?}",
                text
            ))
        })?;
        Ok(serde_json::json!({
            "type": "Point",
            "coordinates": [lon, lat],
        }))
    }

    fn location_from_geojson(&self, value: &Value) -> Result<LocationInput> {
        let kind = value.get("type").and_then(Value::as_str);
        if kind != Some("Point") {
            return Err(SdkError::InvalidInput(format!(
                "only Point geometries can be converted to WKT, got {:?}",
                kind
            )));
        }
        let coordinates = value
            .get("coordinates")
            .and_then(Value::as_array)
            .ok_or_else(|| SdkError::InvalidInput("Point has no coordinates".to_string()))?;
        match (
            coordinates.first().and_then(Value::as_f64),
            coordinates.get(1).and_then(Value::as_f64),
        ) {
            (Some(lon), Some(lat)) => Ok(LocationInput::Text(format!("POINT({} {})", lon, lat))),
            _ => Err(SdkError::InvalidInput(
                "Point coordinates are not numeric".to_string(),
            )),
        }
    }

    fn parse_location_string(&self, raw: &str) -> Result<LocationInput> {
        if Self::is_wkt(raw) {
            Ok(LocationInput::Text(raw.trim().to_string()))
        } else {
            Err(SdkError::InvalidInput(format!(
                "not a WKT geometry: {:?}",
                raw
            )))
        }
    }
}
