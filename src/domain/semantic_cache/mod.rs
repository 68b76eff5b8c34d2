//! Semantic cache domain models and traits
//!
//! Entries are matched by embedding similarity within an exact fingerprint
//! partition rather than by exact prompt text.

mod config;
mod entry;
mod query;
mod store;

pub use config::{SemanticCacheConfig, StoreBackend};
pub use entry::CacheEntry;
pub use query::{select_nearest, SemanticMatch, SimilarityQuery};
pub use store::{SemanticCacheStats, SemanticCacheStore};

#[cfg(test)]
pub use store::mock::UnavailableStore;
