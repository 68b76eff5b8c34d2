//! Store factory for runtime backend selection

use std::sync::Arc;

use tracing::info;

use crate::domain::semantic_cache::{SemanticCacheConfig, SemanticCacheStore, StoreBackend};
use crate::domain::DomainError;

use super::in_memory::InMemorySemanticStore;
use super::redis::{RedisSemanticStore, RedisStoreConfig};

/// Factory for creating semantic cache stores
pub struct SemanticStoreFactory;

impl SemanticStoreFactory {
    /// Create the store described by the configuration
    pub async fn create(
        config: &SemanticCacheConfig,
    ) -> Result<Arc<dyn SemanticCacheStore>, DomainError> {
        config.validate()?;

        info!(
            "Creating {} semantic cache store in namespace {}",
            config.backend, config.namespace
        );

        match config.backend {
            StoreBackend::InMemory => Ok(Arc::new(Self::create_in_memory(config))),
            StoreBackend::Redis => Ok(Arc::new(Self::create_redis(config).await?)),
        }
    }

    /// Create an in-memory store
    pub fn create_in_memory(config: &SemanticCacheConfig) -> InMemorySemanticStore {
        let mut store = InMemorySemanticStore::new();

        if let Some(max) = config.max_entries {
            store = store.with_max_entries(max);
        }

        if let Some(ttl) = config.ttl() {
            store = store.with_ttl(ttl);
        }

        store
    }

    /// Create a Redis store
    pub async fn create_redis(
        config: &SemanticCacheConfig,
    ) -> Result<RedisSemanticStore, DomainError> {
        let url = config.redis_url.as_ref().ok_or_else(|| {
            DomainError::configuration("Redis URL is required for the redis backend")
        })?;

        let mut redis_config = RedisStoreConfig::new(url, &config.namespace);

        if let Some(ttl) = config.ttl() {
            redis_config = redis_config.with_ttl(ttl);
        }

        RedisSemanticStore::new(redis_config).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_create_in_memory_store() {
        let config = SemanticCacheConfig::new().with_max_entries(10);

        let store = SemanticStoreFactory::create(&config).await.unwrap();

        assert_eq!(store.len().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_redis_requires_url() {
        let config = SemanticCacheConfig::new().with_backend(StoreBackend::Redis);

        let result = SemanticStoreFactory::create(&config).await;

        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }

    #[tokio::test]
    async fn test_zero_max_entries_rejected() {
        let config = SemanticCacheConfig::new().with_max_entries(0);

        let result = SemanticStoreFactory::create(&config).await;

        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }

    #[test]
    fn test_in_memory_applies_limits() {
        let config = SemanticCacheConfig::new()
            .with_max_entries(5)
            .with_ttl(Duration::from_secs(60));

        let store = SemanticStoreFactory::create_in_memory(&config);

        assert!(format!("{:?}", store).contains("max_entries: Some(5)"));
    }

    #[tokio::test]
    #[ignore = "Requires running Redis instance"]
    async fn test_create_redis_store() {
        let config = SemanticCacheConfig::new()
            .with_backend(StoreBackend::Redis)
            .with_redis_url("redis://127.0.0.1:6379")
            .with_namespace("test:factory");

        let store = SemanticStoreFactory::create(&config).await.unwrap();
        store.clear().await.unwrap();

        assert_eq!(store.len().await.unwrap(), 0);
    }
}
