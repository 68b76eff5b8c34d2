//! Semantic cache store trait and statistics

use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{CacheEntry, SemanticMatch, SimilarityQuery};
use crate::domain::DomainError;

/// Vector-searchable persistence for cache entries
///
/// Every operation is scoped to the namespace the store was built with.
/// Entries are written as a unit and never observed half-written.
#[async_trait]
pub trait SemanticCacheStore: Send + Sync + Debug {
    /// Store an entry; entries with identical content are kept side by side
    async fn upsert(&self, entry: CacheEntry) -> Result<(), DomainError>;

    /// Find the most similar entry within the query's fingerprint partition
    ///
    /// Returns `None` when the partition is empty or when the best score is
    /// below `query.score_threshold`.
    async fn query_nearest(
        &self,
        query: &SimilarityQuery,
    ) -> Result<Option<SemanticMatch>, DomainError>;

    /// Remove every entry in the namespace
    async fn clear(&self) -> Result<(), DomainError>;

    /// Number of entries currently held
    async fn len(&self) -> Result<usize, DomainError>;

    async fn is_empty(&self) -> Result<bool, DomainError> {
        Ok(self.len().await? == 0)
    }
}

/// Counters reported by the engine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SemanticCacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Entries written through `record`, including seeding
    pub records: u64,
}

impl SemanticCacheStats {
    /// Calculate hit rate
    pub fn hit_rate(&self) -> f32 {
        let total = self.hits + self.misses;

        if total == 0 {
            return 0.0;
        }

        self.hits as f32 / total as f32
    }
}
