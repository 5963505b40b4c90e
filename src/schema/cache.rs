//! Validation result cache
//!
//! Memoizes schema validation results per schema UID, keyed additionally by
//! the raw schema string so that a changed definition under the same UID
//! forces re-validation. The cache is also the policy boundary for strict
//! mode: under strict policy any invalid or non-conformant result raises
//! instead of being returned.
//!
//! The cache is an explicit instance owned by whoever constructed it (one
//! per SDK facade); it provides no internal locking, so callers in a
//! concurrent host must serialize access themselves.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use log::{debug, warn};

use crate::error::{Result, SdkError};

use super::conformance::evaluate_schema;
use super::{SchemaConfig, SchemaValidationResult};

/// A cached validation outcome for one schema UID
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Raw schema string the result was computed from
    pub raw_string: String,

    /// The validation result
    pub result: SchemaValidationResult,

    /// When the result was computed
    pub validated_at: DateTime<Utc>,
}

/// Per-UID schema validation cache with strict/warn policy
#[derive(Debug)]
pub struct SchemaValidationCache {
    /// Cached entries keyed by schema UID
    entries: HashMap<String, CacheEntry>,

    /// Whether validation failures raise instead of returning
    strict: bool,
}

impl SchemaValidationCache {
    /// Create a new cache with the given policy
    pub fn new(strict: bool) -> Self {
        SchemaValidationCache {
            entries: HashMap::new(),
            strict,
        }
    }

    /// Whether this cache raises on validation failures
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Validate a schema, reusing the cached result when possible
    ///
    /// A cache hit requires both the UID and the raw string to match; a hit
    /// with a different raw string recomputes and overwrites the entry. In
    /// strict mode any result with `valid == false` or `conformant == false`
    /// is converted into an error carrying the error and missing-field lists.
    pub fn validate(&mut self, config: &SchemaConfig) -> Result<SchemaValidationResult> {
        let result = match self.entries.get(&config.uid) {
            Some(entry) if entry.raw_string == config.raw_string => {
                debug!("Schema cache hit for {}", config.uid);
                entry.result.clone()
            }
            stale => {
                if stale.is_some() {
                    debug!(
                        "Schema definition changed for {}; revalidating",
                        config.uid
                    );
                } else {
                    debug!("Schema cache miss for {}", config.uid);
                }
                let result = evaluate_schema(&config.raw_string);
                if !result.valid || !result.conformant {
                    warn!(
                        "Schema {} failed validation: errors={:?} missing={:?}",
                        config.uid, result.errors, result.missing
                    );
                }
                self.entries.insert(
                    config.uid.clone(),
                    CacheEntry {
                        raw_string: config.raw_string.clone(),
                        result: result.clone(),
                        validated_at: Utc::now(),
                    },
                );
                result
            }
        };

        if self.strict && (!result.valid || !result.conformant) {
            let message = if !result.valid {
                "schema has validation errors".to_string()
            } else {
                format!("schema is missing required fields: {}", result.missing.join(", "))
            };
            return Err(SdkError::SchemaValidation {
                uid: config.uid.clone(),
                message,
                errors: result.errors,
                missing: result.missing,
            });
        }

        Ok(result)
    }

    /// Whether a UID has a cached entry
    pub fn has(&self, uid: &str) -> bool {
        self.entries.contains_key(uid)
    }

    /// Get the cached entry for a UID
    pub fn get(&self, uid: &str) -> Option<&CacheEntry> {
        self.entries.get(uid)
    }

    /// Remove the entry for a UID, returning whether one was removed
    pub fn invalidate(&mut self, uid: &str) -> bool {
        self.entries.remove(uid).is_some()
    }

    /// Remove all entries
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of the cached UIDs
    pub fn cached_uids(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFORMANT: &str = "string srs,string locationType,string location";
    const VERSIONED: &str = "uint8 specVersion,string srs,string locationType,string location";

    #[test]
    fn test_validate_miss_then_hit_is_deterministic() {
        let mut cache = SchemaValidationCache::new(false);
        let config = SchemaConfig::new("0x1", CONFORMANT);

        let first = cache.validate(&config).unwrap();
        assert!(first.valid);
        assert!(first.conformant);
        assert_eq!(first.version, 1);
        assert!(first.missing.is_empty());

        // Second call returns the identical cached result
        let second = cache.validate(&config).unwrap();
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_versioned_schema() {
        let mut cache = SchemaValidationCache::new(false);
        let result = cache
            .validate(&SchemaConfig::new("0x2", VERSIONED))
            .unwrap();
        assert_eq!(result.version, 2);
        assert!(result.conformant);
    }

    #[test]
    fn test_missing_field_reported() {
        let mut cache = SchemaValidationCache::new(false);
        let result = cache
            .validate(&SchemaConfig::new("0x3", "string srs,string locationType"))
            .unwrap();
        assert!(result.valid);
        assert!(!result.conformant);
        assert_eq!(result.missing, vec!["location".to_string()]);
    }

    #[test]
    fn test_duplicate_field_reported() {
        let mut cache = SchemaValidationCache::new(false);
        let result = cache
            .validate(&SchemaConfig::new("0x4", "string srs,string srs"))
            .unwrap();
        assert!(!result.valid);
        assert!(result.errors.iter().any(|e| e.contains("srs")));
    }

    #[test]
    fn test_change_detection_overwrites_entry() {
        let mut cache = SchemaValidationCache::new(false);
        let uid = "0x1";

        let first = cache
            .validate(&SchemaConfig::new(uid, "string srs,string locationType"))
            .unwrap();
        assert!(!first.conformant);

        // Same UID, new definition: result must reflect the new string
        let second = cache.validate(&SchemaConfig::new(uid, CONFORMANT)).unwrap();
        assert!(second.conformant);

        let entry = cache.get(uid).unwrap();
        assert_eq!(entry.raw_string, CONFORMANT);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_strict_mode_raises_on_invalid() {
        let mut cache = SchemaValidationCache::new(true);
        let err = cache
            .validate(&SchemaConfig::new("0x5", "invalidType field"))
            .unwrap_err();
        match err {
            SdkError::SchemaValidation { uid, errors, .. } => {
                assert_eq!(uid, "0x5");
                assert!(errors.iter().any(|e| e.contains("invalidType")));
            }
            other => panic!("Expected SchemaValidation error, got {:?}", other),
        }
    }

    #[test]
    fn test_strict_mode_raises_on_non_conformant() {
        let mut cache = SchemaValidationCache::new(true);
        let err = cache
            .validate(&SchemaConfig::new("0x6", "string srs,string locationType"))
            .unwrap_err();
        match err {
            SdkError::SchemaValidation { missing, .. } => {
                assert_eq!(missing, vec!["location".to_string()]);
            }
            other => panic!("Expected SchemaValidation error, got {:?}", other),
        }
        // The entry is still cached for introspection
        assert!(cache.has("0x6"));
    }

    #[test]
    fn test_strict_mode_raises_on_cached_hit_too() {
        let mut cache = SchemaValidationCache::new(true);
        let config = SchemaConfig::new("0x7", "string srs,string srs");
        assert!(cache.validate(&config).is_err());
        // Hit path must not leak the invalid result either
        assert!(cache.validate(&config).is_err());
    }

    #[test]
    fn test_warn_mode_always_returns() {
        let mut cache = SchemaValidationCache::new(false);
        let result = cache
            .validate(&SchemaConfig::new("0x8", "invalidType field"))
            .unwrap();
        assert!(!result.valid);
    }

    #[test]
    fn test_mapping_operations() {
        let mut cache = SchemaValidationCache::new(false);
        assert!(cache.is_empty());
        assert!(!cache.has("0x1"));
        assert!(cache.get("0x1").is_none());
        assert!(!cache.invalidate("0x1"));

        cache.validate(&SchemaConfig::new("0x1", CONFORMANT)).unwrap();
        cache.validate(&SchemaConfig::new("0x2", VERSIONED)).unwrap();
        assert_eq!(cache.len(), 2);
        assert!(cache.has("0x1"));

        let mut uids = cache.cached_uids();
        uids.sort();
        assert_eq!(uids, vec!["0x1".to_string(), "0x2".to_string()]);

        assert!(cache.invalidate("0x1"));
        assert!(!cache.has("0x1"));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }
}
