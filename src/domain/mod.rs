//! Domain layer - types, traits and policies of the semantic cache

pub mod cache;
pub mod embedding;
pub mod error;
pub mod fingerprint;
pub mod generation;
pub mod semantic_cache;

pub use error::{DomainError, EmbeddingErrorKind};
pub use fingerprint::{Fingerprint, FingerprintBuilder, ModelParams, StopSequences};
pub use generation::{CompletionProvider, FinishReason, GenerationResult};
pub use semantic_cache::{
    CacheEntry, SemanticCacheConfig, SemanticCacheStats, SemanticCacheStore, SemanticMatch,
    SimilarityQuery, StoreBackend,
};
