//! Semantic cache store implementations

mod factory;
mod in_memory;
mod redis;

pub use factory::SemanticStoreFactory;
pub use in_memory::InMemorySemanticStore;
pub use redis::{RedisSemanticStore, RedisStoreConfig};
