//! Cache entry type

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::fingerprint::Fingerprint;
use crate::domain::generation::GenerationResult;

/// A stored prompt with the results generated for it
///
/// Entries are immutable once built and are written to a store as one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    id: String,
    prompt: String,
    fingerprint: Fingerprint,
    embedding: Vec<f32>,
    results: Vec<GenerationResult>,
    created_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Create a new entry stamped with a fresh id and the current time
    pub fn new(
        prompt: impl Into<String>,
        fingerprint: Fingerprint,
        embedding: Vec<f32>,
        results: Vec<GenerationResult>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            prompt: prompt.into(),
            fingerprint,
            embedding,
            results,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    pub fn embedding(&self) -> &[f32] {
        &self.embedding
    }

    pub fn results(&self) -> &[GenerationResult] {
        &self.results
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn into_results(self) -> Vec<GenerationResult> {
        self.results
    }

    /// Check whether the entry has outlived a TTL
    pub fn is_expired(&self, ttl: Duration) -> bool {
        match chrono::Duration::from_std(ttl) {
            Ok(ttl) => Utc::now() >= self.created_at + ttl,
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entry() -> CacheEntry {
        CacheEntry::new(
            "How much is to call mars?",
            Fingerprint::new("fp"),
            vec![0.1, 0.2, 0.3],
            vec![GenerationResult::stop("$1,000 USD per minute.")],
        )
    }

    #[test]
    fn test_entry_creation() {
        let entry = sample_entry();

        assert!(!entry.id().is_empty());
        assert_eq!(entry.prompt(), "How much is to call mars?");
        assert_eq!(entry.fingerprint().as_str(), "fp");
        assert_eq!(entry.embedding(), &[0.1, 0.2, 0.3]);
        assert_eq!(entry.results().len(), 1);
    }

    #[test]
    fn test_entries_get_distinct_ids() {
        assert_ne!(sample_entry().id(), sample_entry().id());
    }

    #[test]
    fn test_expiry() {
        let mut entry = sample_entry();

        assert!(!entry.is_expired(Duration::from_secs(3600)));

        entry.created_at = Utc::now() - chrono::Duration::seconds(10);
        assert!(entry.is_expired(Duration::from_secs(5)));
    }

    #[test]
    fn test_entry_survives_json() {
        let entry = sample_entry();

        let json = serde_json::to_string(&entry).unwrap();
        let parsed: CacheEntry = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, entry);
    }
}
