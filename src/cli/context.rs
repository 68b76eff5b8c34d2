//! Wiring shared by the subcommands

use std::sync::Arc;

use crate::config::AppConfig;
use crate::domain::semantic_cache::{SemanticCacheConfig, StoreBackend};
use crate::domain::DomainError;
use crate::infrastructure::embedding::{EmbeddingAdapter, HttpClient, OpenAiEmbeddingProvider};
use crate::infrastructure::logging;
use crate::infrastructure::semantic_cache::SemanticStoreFactory;
use crate::infrastructure::services::SemanticCacheEngine;

/// Loaded configuration plus the engine built from it
pub struct CacheContext {
    pub config: AppConfig,
    pub engine: SemanticCacheEngine,
}

impl CacheContext {
    /// Load `.env` and configuration, start logging and build the engine
    pub async fn load() -> anyhow::Result<Self> {
        let config = load_config()?;
        let engine = build_engine(&config).await?;

        Ok(Self { config, engine })
    }

    /// Like `load`, but refuses a store that dies with the process
    ///
    /// Commands that only seed, or only read, a cache need it to outlive
    /// them.
    pub async fn load_shared() -> anyhow::Result<Self> {
        let config = load_config()?;
        require_shared_backend(&config.semantic_cache)?;
        let engine = build_engine(&config).await?;

        Ok(Self { config, engine })
    }
}

fn load_config() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging);

    Ok(config)
}

fn require_shared_backend(config: &SemanticCacheConfig) -> Result<(), DomainError> {
    match config.backend {
        StoreBackend::Redis => Ok(()),
        StoreBackend::InMemory => Err(DomainError::configuration(
            "the in_memory backend is emptied when this command exits; set \
             semantic_cache.backend = \"redis\" or run the `demo` command",
        )),
    }
}

async fn build_engine(config: &AppConfig) -> anyhow::Result<SemanticCacheEngine> {
    let store = SemanticStoreFactory::create(&config.semantic_cache).await?;

    let provider = OpenAiEmbeddingProvider::with_base_url(
        HttpClient::new(),
        &config.embedding.api_key,
        &config.embedding.base_url,
    );
    let embedder = EmbeddingAdapter::new(
        Arc::new(provider),
        &config.embedding.model,
        config.embedding.dimensions,
    )?;

    Ok(SemanticCacheEngine::new(
        store,
        embedder,
        &config.semantic_cache,
    ))
}
