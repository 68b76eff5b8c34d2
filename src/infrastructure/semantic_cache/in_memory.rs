//! In-memory semantic cache store

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::semantic_cache::{
    select_nearest, CacheEntry, SemanticCacheStore, SemanticMatch, SimilarityQuery,
};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct Entries {
    /// Entries by id, with their insertion sequence
    by_id: HashMap<String, (u64, CacheEntry)>,
    next_sequence: u64,
}

/// In-memory semantic cache store using linear search
///
/// Suitable for development, tests and single-process deployments.
#[derive(Debug)]
pub struct InMemorySemanticStore {
    entries: RwLock<Entries>,
    max_entries: Option<usize>,
    ttl: Option<Duration>,
}

impl Default for InMemorySemanticStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySemanticStore {
    /// Create an unbounded store whose entries never expire
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Entries::default()),
            max_entries: None,
            ttl: None,
        }
    }

    /// Bound the number of entries; the oldest entry is evicted first
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = Some(max_entries);
        self
    }

    /// Expire entries after a TTL
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    fn is_live(&self, entry: &CacheEntry) -> bool {
        self.ttl.is_none_or(|ttl| !entry.is_expired(ttl))
    }

    /// Drop expired entries, then the oldest ones until there is room
    fn evict_if_needed(&self, entries: &mut Entries) {
        if let Some(ttl) = self.ttl {
            entries.by_id.retain(|_, (_, entry)| !entry.is_expired(ttl));
        }

        let Some(max_entries) = self.max_entries else {
            return;
        };

        while !entries.by_id.is_empty() && entries.by_id.len() >= max_entries {
            let oldest_id = entries
                .by_id
                .iter()
                .min_by_key(|(_, (sequence, _))| *sequence)
                .map(|(id, _)| id.clone());

            if let Some(id) = oldest_id {
                entries.by_id.remove(&id);
                debug!("Evicted semantic cache entry {}", id);
            }
        }
    }
}

#[async_trait]
impl SemanticCacheStore for InMemorySemanticStore {
    async fn upsert(&self, entry: CacheEntry) -> Result<(), DomainError> {
        let mut entries = self.entries.write().await;

        self.evict_if_needed(&mut entries);

        let sequence = entries.next_sequence;
        entries.next_sequence += 1;
        entries
            .by_id
            .insert(entry.id().to_string(), (sequence, entry));

        Ok(())
    }

    async fn query_nearest(
        &self,
        query: &SimilarityQuery,
    ) -> Result<Option<SemanticMatch>, DomainError> {
        let entries = self.entries.read().await;

        let candidates = entries
            .by_id
            .values()
            .filter(|(_, entry)| self.is_live(entry))
            .map(|(sequence, entry)| (*sequence, entry));

        Ok(select_nearest(candidates, query)
            .map(|(entry, score)| SemanticMatch::new(entry.clone(), score)))
    }

    async fn clear(&self) -> Result<(), DomainError> {
        let mut entries = self.entries.write().await;
        entries.by_id.clear();

        Ok(())
    }

    async fn len(&self) -> Result<usize, DomainError> {
        let entries = self.entries.read().await;

        Ok(entries
            .by_id
            .values()
            .filter(|(_, entry)| self.is_live(entry))
            .count())
    }
}
