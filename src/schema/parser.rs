//! Schema string grammar parser
//!
//! Turns a flat `type name, type name, ...` schema description into a list
//! of fields. Parsing is purely syntactic: type legality, name legality and
//! duplicate detection are layered on top by the validator so that error
//! messages can be field-specific.

use super::SchemaField;

/// Parse a raw schema string into its fields
///
/// Splits on commas, trims each segment, and splits the segment on internal
/// whitespace into exactly two tokens. A segment producing anything other
/// than two tokens fails the whole parse. Empty or whitespace-only input
/// returns `None`, never an empty list.
pub fn parse_schema_string(raw: &str) -> Option<Vec<SchemaField>> {
    if raw.trim().is_empty() {
        return None;
    }

    let mut fields = Vec::new();
    for segment in raw.split(',') {
        let mut tokens = segment.split_whitespace();
        match (tokens.next(), tokens.next(), tokens.next()) {
            (Some(field_type), Some(name), None) => {
                fields.push(SchemaField::new(field_type, name));
            }
            // Zero, one, or more than two tokens: fail fast
            _ => return None,
        }
    }

    Some(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_field() {
        let fields = parse_schema_string("uint8 specVersion").unwrap();
        assert_eq!(fields, vec![SchemaField::new("uint8", "specVersion")]);
    }

    #[test]
    fn test_parse_multiple_fields() {
        let fields =
            parse_schema_string("string srs,string locationType,string location").unwrap();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0], SchemaField::new("string", "srs"));
        assert_eq!(fields[1], SchemaField::new("string", "locationType"));
        assert_eq!(fields[2], SchemaField::new("string", "location"));
    }

    #[test]
    fn test_parse_insignificant_whitespace() {
        let fields = parse_schema_string("  string   srs ,  uint8    specVersion  ").unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0], SchemaField::new("string", "srs"));
        assert_eq!(fields[1], SchemaField::new("uint8", "specVersion"));
    }

    #[test]
    fn test_parse_empty_input() {
        assert_eq!(parse_schema_string(""), None);
        assert_eq!(parse_schema_string("   "), None);
        assert_eq!(parse_schema_string("\t\n"), None);
    }

    #[test]
    fn test_parse_malformed_segment_fails_whole_schema() {
        // One token
        assert_eq!(parse_schema_string("string"), None);
        // Three tokens
        assert_eq!(parse_schema_string("string srs extra"), None);
        // A single bad segment poisons an otherwise fine schema
        assert_eq!(parse_schema_string("string srs,uint8"), None);
        assert_eq!(parse_schema_string("string srs,,string location"), None);
        // Trailing comma produces an empty segment
        assert_eq!(parse_schema_string("string srs,"), None);
    }

    #[test]
    fn test_parse_does_no_semantic_checks() {
        // Nonsense types and duplicate names still parse; the validator
        // owns those rules.
        let fields = parse_schema_string("frob srs,string srs").unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].field_type, "frob");
    }
}
