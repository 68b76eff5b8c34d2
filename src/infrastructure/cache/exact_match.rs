//! Exact-match response cache using moka

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache as MokaCache;

use crate::domain::cache::{ExactMatchKey, ResponseCache};
use crate::domain::fingerprint::Fingerprint;
use crate::domain::generation::GenerationResult;
use crate::domain::DomainError;

/// Configuration for the exact-match cache
#[derive(Debug, Clone)]
pub struct ExactMatchCacheConfig {
    /// Maximum number of entries
    pub max_capacity: u64,
    /// Entry TTL; entries live until evicted when unset
    pub ttl: Option<Duration>,
}

impl Default for ExactMatchCacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
            ttl: None,
        }
    }
}

impl ExactMatchCacheConfig {
    pub fn with_max_capacity(mut self, capacity: u64) -> Self {
        self.max_capacity = capacity;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }
}

/// Cache keyed by the literal prompt and fingerprint
///
/// Any change to the prompt text, even one character, is a miss.
#[derive(Debug)]
pub struct ExactMatchCache {
    cache: MokaCache<ExactMatchKey, Vec<GenerationResult>>,
}

impl ExactMatchCache {
    pub fn new() -> Self {
        Self::with_config(ExactMatchCacheConfig::default())
    }

    pub fn with_config(config: ExactMatchCacheConfig) -> Self {
        let mut builder = MokaCache::builder().max_capacity(config.max_capacity);

        if let Some(ttl) = config.ttl {
            builder = builder.time_to_live(ttl);
        }

        Self {
            cache: builder.build(),
        }
    }
}

impl Default for ExactMatchCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResponseCache for ExactMatchCache {
    async fn get(
        &self,
        prompt: &str,
        fingerprint: &Fingerprint,
    ) -> Result<Option<Vec<GenerationResult>>, DomainError> {
        Ok(self.cache.get(&ExactMatchKey::new(prompt, fingerprint)).await)
    }

    async fn set(
        &self,
        prompt: &str,
        fingerprint: &Fingerprint,
        results: Vec<GenerationResult>,
    ) -> Result<(), DomainError> {
        self.cache
            .insert(ExactMatchKey::new(prompt, fingerprint), results)
            .await;
        Ok(())
    }

    async fn clear(&self) -> Result<(), DomainError> {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
        Ok(())
    }
}
