//! Content-addressed cache of analysis results.
//!
//! Keys are the SHA-256 hex digest of `namespace + "::" + canonical JSON` of
//! the payload. Entries live as long as the cache; there is no eviction.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{SecondsFormat, Utc};
use periop_risk_core::AnalysisPayload;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::normalizer::CanonicalResult;

/// One cached analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub result: CanonicalResult,
    /// Unmodified model output; empty when the model was unavailable.
    pub raw_text: String,
    /// RFC 3339 UTC timestamp.
    pub cached_at: String,
}

impl CacheEntry {
    pub fn new(key: String, result: CanonicalResult, raw_text: String) -> Self {
        Self {
            key,
            result,
            raw_text,
            cached_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Cache key for `payload` under `namespace`.
pub fn payload_hash(namespace: &str, payload: &AnalysisPayload) -> Result<String, serde_json::Error> {
    let canonical = payload.to_canonical_json()?;
    Ok(hash_key(namespace, &canonical))
}

fn hash_key(namespace: &str, canonical_json: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(namespace.as_bytes());
    hasher.update(b"::");
    hasher.update(canonical_json.as_bytes());
    hex::encode(hasher.finalize())
}

/// Shared map from key to entry. Clone the `Arc` to share between analyzers.
#[derive(Debug, Default)]
pub struct AnalysisCache {
    entries: Mutex<HashMap<String, Arc<CacheEntry>>>,
}

impl AnalysisCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Arc<CacheEntry>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).cloned()
    }

    /// Store `entry`, returning the shared handle. An existing entry under the
    /// same key is replaced.
    pub fn insert(&self, entry: CacheEntry) -> Arc<CacheEntry> {
        let entry = Arc::new(entry);
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        debug!(key = %entry.key, "cache store");
        entries.insert(entry.key.clone(), Arc::clone(&entry));
        entry
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::default_result;
    use crate::schema::AnalysisKind;

    #[test]
    fn test_hash_is_hex_sha256() {
        let key = payload_hash("general", &AnalysisPayload::default()).unwrap();
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_hash_covers_namespace_separator_and_json() {
        let expected = hex::encode(Sha256::digest(b"ns::{\"a\":1}"));
        assert_eq!(hash_key("ns", "{\"a\":1}"), expected);
    }

    #[test]
    fn test_namespace_separates_keys() {
        let payload = AnalysisPayload::default();
        assert_ne!(
            payload_hash("general", &payload).unwrap(),
            payload_hash("medications", &payload).unwrap()
        );
    }

    #[test]
    fn test_insert_and_get_share_arc() {
        let cache = AnalysisCache::new();
        assert!(cache.is_empty());

        let stored = cache.insert(CacheEntry::new(
            "k".into(),
            default_result(AnalysisKind::General),
            String::new(),
        ));
        let fetched = cache.get("k").unwrap();
        assert!(Arc::ptr_eq(&stored, &fetched));
        assert_eq!(cache.len(), 1);
        assert!(cache.get("other").is_none());

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cached_at_is_rfc3339() {
        let entry = CacheEntry::new("k".into(), default_result(AnalysisKind::General), String::new());
        assert!(chrono::DateTime::parse_from_rfc3339(&entry.cached_at).is_ok());
    }
}
