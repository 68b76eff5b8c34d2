//! Semantic LLM response cache engine
//!
//! Returns a stored answer when a new prompt is close enough to one already
//! seen under the same generation parameters, otherwise falls through to the
//! generator and records what it produced.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::fingerprint::{FingerprintBuilder, ModelParams};
use crate::domain::generation::{CompletionProvider, GenerationResult};
use crate::domain::semantic_cache::{
    CacheEntry, SemanticCacheConfig, SemanticCacheStats, SemanticCacheStore, SimilarityQuery,
};
use crate::domain::DomainError;
use crate::infrastructure::embedding::EmbeddingAdapter;

/// Orchestrates lookup-before-generate and record-after-generate
///
/// The score threshold is fixed at construction. The engine keeps no
/// per-call state, so one instance can serve concurrent callers; concurrent
/// misses on the same prompt are not coalesced and may each record an entry.
#[derive(Debug)]
pub struct SemanticCacheEngine {
    store: Arc<dyn SemanticCacheStore>,
    embedder: EmbeddingAdapter,
    fingerprints: FingerprintBuilder,
    score_threshold: f32,
    hits: AtomicU64,
    misses: AtomicU64,
    records: AtomicU64,
}

impl SemanticCacheEngine {
    /// Create an engine over a store and an embedding adapter
    pub fn new(
        store: Arc<dyn SemanticCacheStore>,
        embedder: EmbeddingAdapter,
        config: &SemanticCacheConfig,
    ) -> Self {
        Self {
            store,
            embedder,
            fingerprints: FingerprintBuilder::new()
                .with_excludes_stop(config.fingerprint_excludes_stop),
            score_threshold: config.score_threshold.clamp(0.0, 1.0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            records: AtomicU64::new(0),
        }
    }

    pub fn score_threshold(&self) -> f32 {
        self.score_threshold
    }

    /// Look up results stored for a semantically similar prompt
    ///
    /// `Ok(None)` means nothing close enough is cached. Embedding and store
    /// failures are returned as errors, never as a miss.
    pub async fn lookup(
        &self,
        prompt: &str,
        params: &ModelParams,
    ) -> Result<Option<Vec<GenerationResult>>, DomainError> {
        let fingerprint = self.fingerprints.build(params)?;
        let embedding = self.embedder.embed(prompt).await?;

        let query = SimilarityQuery::new(embedding, fingerprint, self.score_threshold);

        match self.store.query_nearest(&query).await? {
            Some(found) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(
                    "Semantic cache hit with score {:.4} for entry {}",
                    found.score,
                    found.entry.id()
                );
                Ok(Some(found.entry.into_results()))
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!("Semantic cache miss for fingerprint {}", query.fingerprint.digest());
                Ok(None)
            }
        }
    }

    /// Store results for a prompt without invoking any generator
    ///
    /// Always embeds the prompt afresh and always writes a new entry, even
    /// when an identical one exists.
    pub async fn record(
        &self,
        prompt: &str,
        params: &ModelParams,
        results: Vec<GenerationResult>,
    ) -> Result<(), DomainError> {
        let fingerprint = self.fingerprints.build(params)?;
        let embedding = self.embedder.embed(prompt).await?;

        let entry = CacheEntry::new(prompt, fingerprint, embedding, results);
        let id = entry.id().to_string();

        self.store.upsert(entry).await?;
        self.records.fetch_add(1, Ordering::Relaxed);

        debug!("Recorded semantic cache entry {}", id);

        Ok(())
    }

    /// Return cached results or generate, record and return new ones
    ///
    /// A failing generator records nothing and its error is returned as is.
    pub async fn generate_or_cache<F, Fut>(
        &self,
        prompt: &str,
        params: &ModelParams,
        generate: F,
    ) -> Result<Vec<GenerationResult>, DomainError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<GenerationResult>, DomainError>>,
    {
        if let Some(results) = self.lookup(prompt, params).await? {
            return Ok(results);
        }

        let results = generate().await?;
        self.record(prompt, params, results.clone()).await?;

        Ok(results)
    }

    /// `generate_or_cache` with a completion provider as the generator
    pub async fn complete_with(
        &self,
        provider: &dyn CompletionProvider,
        prompt: &str,
        params: &ModelParams,
    ) -> Result<Vec<GenerationResult>, DomainError> {
        self.generate_or_cache(prompt, params, || provider.complete(prompt, params))
            .await
    }

    /// Remove every entry in the store's namespace
    pub async fn clear(&self) -> Result<(), DomainError> {
        self.store.clear().await?;
        info!("Cleared semantic cache");
        Ok(())
    }

    /// Number of entries currently stored
    pub async fn len(&self) -> Result<usize, DomainError> {
        self.store.len().await
    }

    pub fn stats(&self) -> SemanticCacheStats {
        SemanticCacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            records: self.records.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::ResponseCache;
    use crate::domain::embedding::MockEmbeddingProvider;
    use crate::domain::fingerprint::StopSequences;
    use crate::domain::generation::{FinishReason, MockCompletionProvider};
    use crate::domain::semantic_cache::UnavailableStore;
    use crate::domain::EmbeddingErrorKind;
    use crate::infrastructure::cache::ExactMatchCache;
    use crate::infrastructure::semantic_cache::InMemorySemanticStore;

    const DEMOCRATIC: &str = "Who is the 2024 Democratic VP Pick in the U.S.";
    const DEMOCRATIC_PARAPHRASE: &str =
        "Who was picked as the 2024 Democratic Vice Presidential candidate?";
    const REPUBLICAN: &str = "Who is the 2024 Republican VP Pick in the U.S.";

    fn params() -> ModelParams {
        ModelParams::new("gpt-3.5-turbo-instruct")
            .with_n(2)
            .with_best_of(2)
    }

    fn embeddings() -> MockEmbeddingProvider {
        MockEmbeddingProvider::new("mock", 3)
            .with_vector(DEMOCRATIC, vec![1.0, 0.0, 0.0])
            .with_vector(REPUBLICAN, vec![0.0, 1.0, 0.0])
    }

    fn create_engine(
        provider: MockEmbeddingProvider,
        config: SemanticCacheConfig,
    ) -> SemanticCacheEngine {
        let store = Arc::new(InMemorySemanticStore::new());
        let embedder = EmbeddingAdapter::with_default_model(Arc::new(provider)).unwrap();
        SemanticCacheEngine::new(store, embedder, &config)
    }

    fn answer(text: &str) -> Vec<GenerationResult> {
        vec![GenerationResult::stop(text)]
    }

    #[tokio::test]
    async fn test_record_then_lookup_round_trip() {
        let engine = create_engine(embeddings(), SemanticCacheConfig::default());

        engine
            .record(REPUBLICAN, &params(), answer("JD Vance."))
            .await
            .unwrap();

        let results = engine.lookup(REPUBLICAN, &params()).await.unwrap().unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].text, "JD Vance.");
        assert_eq!(results[0].finish_reason, FinishReason::Stop);
    }

    #[tokio::test]
    async fn test_lookup_on_empty_cache_misses() {
        let engine = create_engine(embeddings(), SemanticCacheConfig::default());

        assert!(engine.lookup(DEMOCRATIC, &params()).await.unwrap().is_none());

        let stats = engine.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 0);
    }

    #[tokio::test]
    async fn test_recording_twice_keeps_both_entries() {
        let engine = create_engine(embeddings(), SemanticCacheConfig::default());

        for _ in 0..2 {
            engine
                .record(DEMOCRATIC, &params(), answer("Kamala Harris."))
                .await
                .unwrap();
        }

        assert_eq!(engine.len().await.unwrap(), 2);
        assert_eq!(engine.stats().records, 2);
    }

    #[tokio::test]
    async fn test_exact_prompt_hits_without_generating() {
        let engine = create_engine(embeddings(), SemanticCacheConfig::default());
        let generator = MockCompletionProvider::new("should not be called");

        engine
            .record(DEMOCRATIC, &params(), answer("Kamala Harris."))
            .await
            .unwrap();

        let results = engine
            .complete_with(&generator, DEMOCRATIC, &params())
            .await
            .unwrap();

        assert_eq!(results[0].text, "Kamala Harris.");
        assert_eq!(generator.calls(), 0);
        assert_eq!(engine.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_close_paraphrase_hits() {
        // Similarity 0.95 with the seeded prompt
        let provider = embeddings().with_vector(
            DEMOCRATIC_PARAPHRASE,
            vec![0.95, (1.0f32 - 0.95 * 0.95).sqrt(), 0.0],
        );
        let engine = create_engine(provider, SemanticCacheConfig::default());
        let generator = MockCompletionProvider::new("should not be called");

        engine
            .record(DEMOCRATIC, &params(), answer("Kamala Harris."))
            .await
            .unwrap();

        let results = engine
            .complete_with(&generator, DEMOCRATIC_PARAPHRASE, &params())
            .await
            .unwrap();

        assert_eq!(results[0].text, "Kamala Harris.");
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_distant_paraphrase_generates_and_records() {
        // Similarity 0.6: nearest neighbor, but under the threshold
        let provider = embeddings().with_vector(DEMOCRATIC_PARAPHRASE, vec![0.6, 0.0, 0.8]);
        let engine = create_engine(provider, SemanticCacheConfig::default());
        let generator = MockCompletionProvider::new("Fresh answer.");

        engine
            .record(DEMOCRATIC, &params(), answer("Kamala Harris."))
            .await
            .unwrap();

        let results = engine
            .complete_with(&generator, DEMOCRATIC_PARAPHRASE, &params())
            .await
            .unwrap();

        // n=2 candidates from the generator
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].text, "Fresh answer.");
        assert_eq!(generator.calls(), 1);
        assert_eq!(engine.len().await.unwrap(), 2);

        // Second call is now served from the new entry
        engine
            .complete_with(&generator, DEMOCRATIC_PARAPHRASE, &params())
            .await
            .unwrap();
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_generation_is_not_recorded() {
        let engine = create_engine(embeddings(), SemanticCacheConfig::default());
        let generator = MockCompletionProvider::new("unused").with_error("rate limited");

        let result = engine.complete_with(&generator, DEMOCRATIC, &params()).await;

        assert!(matches!(result, Err(DomainError::Generation { .. })));
        assert_eq!(engine.len().await.unwrap(), 0);
        assert_eq!(engine.stats().records, 0);
    }

    #[tokio::test]
    async fn test_embedding_failure_is_not_a_miss() {
        let provider = embeddings().with_error(EmbeddingErrorKind::Transient, "throttled");
        let engine = create_engine(provider, SemanticCacheConfig::default());

        let lookup = engine.lookup(DEMOCRATIC, &params()).await;
        assert!(matches!(
            lookup,
            Err(DomainError::EmbeddingProvider {
                kind: EmbeddingErrorKind::Transient,
                ..
            })
        ));
        assert_eq!(engine.stats().misses, 0);

        let record = engine
            .record(DEMOCRATIC, &params(), answer("Kamala Harris."))
            .await;
        assert!(record.is_err());
        assert_eq!(engine.len().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_malformed_embedding_is_an_error_not_a_miss() {
        let provider = embeddings().with_vector("p", vec![f32::NAN, 0.0, 0.0]);
        let engine = create_engine(provider, SemanticCacheConfig::default());

        let record = engine.record("p", &params(), answer("x")).await;
        assert!(matches!(record, Err(DomainError::EmbeddingProvider { .. })));
        assert_eq!(engine.len().await.unwrap(), 0);

        let lookup = engine.lookup("p", &params()).await;
        assert!(matches!(lookup, Err(DomainError::EmbeddingProvider { .. })));
        assert_eq!(engine.stats().misses, 0);
    }

    #[tokio::test]
    async fn test_embedding_failure_skips_generator() {
        let provider = embeddings().with_error(EmbeddingErrorKind::Fatal, "bad input");
        let engine = create_engine(provider, SemanticCacheConfig::default());
        let generator = MockCompletionProvider::new("unused");

        let result = engine.complete_with(&generator, DEMOCRATIC, &params()).await;

        assert!(result.is_err());
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_store_unavailable_propagates() {
        let embedder = EmbeddingAdapter::with_default_model(Arc::new(embeddings())).unwrap();
        let engine = SemanticCacheEngine::new(
            Arc::new(UnavailableStore),
            embedder,
            &SemanticCacheConfig::default(),
        );

        let lookup = engine.lookup(DEMOCRATIC, &params()).await;
        assert!(matches!(lookup, Err(DomainError::StoreUnavailable { .. })));

        let record = engine
            .record(DEMOCRATIC, &params(), answer("Kamala Harris."))
            .await;
        assert!(matches!(record, Err(DomainError::StoreUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_clear_turns_hits_into_misses() {
        let engine = create_engine(embeddings(), SemanticCacheConfig::default());

        engine
            .record(REPUBLICAN, &params(), answer("JD Vance."))
            .await
            .unwrap();
        assert!(engine.lookup(REPUBLICAN, &params()).await.unwrap().is_some());

        engine.clear().await.unwrap();

        assert!(engine.lookup(REPUBLICAN, &params()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_different_params_do_not_share_entries() {
        let engine = create_engine(embeddings(), SemanticCacheConfig::default());

        engine
            .record(REPUBLICAN, &params(), answer("JD Vance."))
            .await
            .unwrap();

        let other = params().with_temperature(0.9);
        assert!(engine.lookup(REPUBLICAN, &other).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stop_sequence_shares_partition_by_default() {
        let engine = create_engine(embeddings(), SemanticCacheConfig::default());

        engine
            .record(REPUBLICAN, &params(), answer("JD Vance."))
            .await
            .unwrap();

        let with_stop = params().with_stop(StopSequences::Single("\n".to_string()));
        assert!(engine.lookup(REPUBLICAN, &with_stop).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_stop_sequence_partitions_when_included() {
        let config = SemanticCacheConfig::default().with_fingerprint_excludes_stop(false);
        let engine = create_engine(embeddings(), config);

        engine
            .record(REPUBLICAN, &params(), answer("JD Vance."))
            .await
            .unwrap();

        let with_stop = params().with_stop(StopSequences::Single("\n".to_string()));
        assert!(engine.lookup(REPUBLICAN, &with_stop).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_semantic_engine_beats_exact_match() {
        let provider = embeddings().with_vector(
            DEMOCRATIC_PARAPHRASE,
            vec![0.9, (1.0f32 - 0.9 * 0.9).sqrt(), 0.0],
        );
        let engine = create_engine(provider, SemanticCacheConfig::default());
        let exact = ExactMatchCache::new();
        let fingerprint = FingerprintBuilder::new().build(&params()).unwrap();

        engine
            .record(DEMOCRATIC, &params(), answer("Kamala Harris."))
            .await
            .unwrap();
        exact
            .set(DEMOCRATIC, &fingerprint, answer("Kamala Harris."))
            .await
            .unwrap();

        assert!(exact
            .get(DEMOCRATIC_PARAPHRASE, &fingerprint)
            .await
            .unwrap()
            .is_none());
        assert!(engine
            .lookup(DEMOCRATIC_PARAPHRASE, &params())
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_stats_track_hits_and_misses() {
        let engine = create_engine(embeddings(), SemanticCacheConfig::default());

        engine.lookup(REPUBLICAN, &params()).await.unwrap();
        engine
            .record(REPUBLICAN, &params(), answer("JD Vance."))
            .await
            .unwrap();
        engine.lookup(REPUBLICAN, &params()).await.unwrap();
        engine.lookup(REPUBLICAN, &params()).await.unwrap();

        let stats = engine.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.records, 1);
        assert!((stats.hit_rate() - 2.0 / 3.0).abs() < 0.01);
    }
}
