//! Cache infrastructure - exact-match baseline

mod exact_match;

pub use exact_match::{ExactMatchCache, ExactMatchCacheConfig};
