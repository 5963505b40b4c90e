//! Built-in GeoJSON location extension

use serde_json::Value;

use crate::error::{Result, SdkError};

use super::{LocationExtension, LocationInput};

/// GeoJSON geometry types this extension accepts
const GEOMETRY_TYPES: [&str; 7] = [
    "Point",
    "MultiPoint",
    "LineString",
    "MultiLineString",
    "Polygon",
    "MultiPolygon",
    "GeometryCollection",
];

/// Location extension for GeoJSON geometries
pub struct GeoJsonExtension;

impl GeoJsonExtension {
    /// Check a JSON value for basic GeoJSON geometry shape
    fn is_geometry(value: &Value) -> bool {
        let Some(kind) = value.get("type").and_then(Value::as_str) else {
            return false;
        };
        if !GEOMETRY_TYPES.contains(&kind) {
            return false;
        }
        // GeometryCollection carries geometries, everything else coordinates
        if kind == "GeometryCollection" {
            value.get("geometries").map_or(false, Value::is_array)
        } else {
            value.get("coordinates").map_or(false, Value::is_array)
        }
    }

    /// Resolve any accepted input shape into a geometry value
    fn to_geometry(input: &LocationInput) -> Result<Value> {
        match input {
            LocationInput::GeoJson(value) if Self::is_geometry(value) => Ok(value.clone()),
            LocationInput::Coordinates { lon, lat } => Ok(serde_json::json!({
                "type": "Point",
                "coordinates": [lon, lat],
            })),
            LocationInput::Text(text) => {
                let value: Value = serde_json::from_str(text).map_err(|e| {
                    SdkError::InvalidInput(format!("not a GeoJSON string: {}", e))
                })?;
                if Self::is_geometry(&value) {
                    Ok(value)
                } else {
                    Err(SdkError::InvalidInput(
                        "JSON value is not a GeoJSON geometry".to_string(),
                    ))
                }
            }
            other => Err(SdkError::InvalidInput(format!(
                "not a GeoJSON geometry: {}",
                other.describe()
            ))),
        }
    }
}

impl LocationExtension for GeoJsonExtension {
    fn location_type(&self) -> &str {
        "geojson"
    }

    fn validate_location(&self, input: &LocationInput) -> bool {
        Self::to_geometry(input).is_ok()
    }

    fn location_to_string(&self, input: &LocationInput) -> Result<String> {
        let geometry = Self::to_geometry(input)?;
        Ok(geometry.to_string())
    }

    fn location_to_geojson(&self, input: &LocationInput) -> Result<Value> {
        Self::to_geometry(input)
    }

    fn location_from_geojson(&self, value: &Value) -> Result<LocationInput> {
        if Self::is_geometry(value) {
            Ok(LocationInput::GeoJson(value.clone()))
        } else {
            Err(SdkError::InvalidInput(
                "JSON value is not a GeoJSON geometry".to_string(),
            ))
        }
    }

    fn parse_location_string(&self, raw: &str) -> Result<LocationInput> {
        Self::to_geometry(&LocationInput::Text(raw.to_string())).map(LocationInput::GeoJson)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validates_geometry_object() {
        let ext = GeoJsonExtension;
        let input = LocationInput::GeoJson(serde_json::json!({
            "type": "Point",
            "coordinates": [102.0, 0.5]
        }));
        assert!(ext.validate_location(&input));
    }

    #[test]
    fn test_validates_coordinates() {
        let ext = GeoJsonExtension;
        assert!(ext.validate_location(&LocationInput::Coordinates { lon: 1.0, lat: 2.0 }));
    }

    #[test]
    fn test_rejects_non_geometry() {
        let ext = GeoJsonExtension;
        let input = LocationInput::GeoJson(serde_json::json!({"type": "Feature"}));
        assert!(!ext.validate_location(&input));
        assert!(!ext.validate_location(&LocationInput::Text("POINT(1 2)".into())));
        assert!(!ext.validate_location(&LocationInput::GeoJson(serde_json::json!({
            "type": "Point"
        }))));
    }

    #[test]
    fn test_coordinates_become_point() {
        let ext = GeoJsonExtension;
        let s = ext
            .location_to_string(&LocationInput::Coordinates { lon: 1.0, lat: 2.0 })
            .unwrap();
        let value: Value = serde_json::from_str(&s).unwrap();
        assert_eq!(value["type"], "Point");
    }

    #[test]
    fn test_parse_round_trip() {
        let ext = GeoJsonExtension;
        let raw = r#"{"type":"LineString","coordinates":[[0.0,0.0],[1.0,1.0]]}"#;
        let parsed = ext.parse_location_string(raw).unwrap();
        // Key order is not preserved, so compare parsed values
        let encoded: Value = serde_json::from_str(&ext.location_to_string(&parsed).unwrap()).unwrap();
        let expected: Value = serde_json::from_str(raw).unwrap();
        assert_eq!(encoded, expected);
    }
}
