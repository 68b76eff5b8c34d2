//! Redis semantic cache store

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::fingerprint::Fingerprint;
use crate::domain::semantic_cache::{
    select_nearest, CacheEntry, SemanticCacheStore, SemanticMatch, SimilarityQuery,
};
use crate::domain::DomainError;

const SCAN_BATCH: usize = 500;

/// Configuration for the Redis store
#[derive(Debug, Clone)]
pub struct RedisStoreConfig {
    /// Redis connection URL (e.g., "redis://127.0.0.1:6379")
    pub url: String,
    /// Prefix of every key the store touches
    pub namespace: String,
    /// Entry TTL, enforced by Redis key expiry
    pub ttl: Option<Duration>,
}

impl RedisStoreConfig {
    pub fn new(url: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            namespace: namespace.into(),
            ttl: None,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }
}

/// Stored document: the entry plus its insertion sequence
#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry {
    sequence: u64,
    entry: CacheEntry,
}

/// Redis-backed semantic cache store
///
/// Each entry is one JSON document under
/// `{<namespace>}:entry:<fingerprint digest>:<id>`, written with a single SET,
/// so readers see either the whole entry or nothing. Similarity is computed
/// client-side over the partition's documents.
#[derive(Clone)]
pub struct RedisSemanticStore {
    connection: ConnectionManager,
    config: RedisStoreConfig,
}

impl fmt::Debug for RedisSemanticStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisSemanticStore")
            .field("config", &self.config)
            .field("connection", &"<ConnectionManager>")
            .finish()
    }
}

impl RedisSemanticStore {
    /// Connect to Redis
    pub async fn new(config: RedisStoreConfig) -> Result<Self, DomainError> {
        validate_namespace(&config.namespace)?;

        let client = Client::open(config.url.as_str()).map_err(|e| {
            DomainError::store_unavailable(format!("Failed to create Redis client: {}", e))
        })?;

        let connection = ConnectionManager::new(client).await.map_err(|e| {
            DomainError::store_unavailable(format!("Failed to connect to Redis: {}", e))
        })?;

        Ok(Self { connection, config })
    }

    fn key_prefix(&self) -> String {
        namespace_prefix(&self.config.namespace)
    }

    fn sequence_key(&self) -> String {
        format!("{}:sequence", self.key_prefix())
    }

    fn entry_key(&self, fingerprint: &Fingerprint, id: &str) -> String {
        format!("{}:entry:{}:{}", self.key_prefix(), fingerprint.digest(), id)
    }

    fn partition_pattern(&self, fingerprint: &Fingerprint) -> String {
        format!(
            "{}:entry:{}:*",
            escape_glob(&self.key_prefix()),
            fingerprint.digest()
        )
    }

    fn all_entries_pattern(&self) -> String {
        format!("{}:entry:*", escape_glob(&self.key_prefix()))
    }

    async fn scan_keys(&self, pattern: &str) -> Result<Vec<String>, DomainError> {
        let mut conn = self.connection.clone();
        let mut cursor = 0u64;
        let mut found = Vec::new();

        loop {
            let (new_cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await
                .map_err(|e| {
                    DomainError::store_unavailable(format!(
                        "Failed to scan keys with pattern '{}': {}",
                        pattern, e
                    ))
                })?;

            found.extend(keys);
            cursor = new_cursor;

            if cursor == 0 {
                break;
            }
        }

        Ok(found)
    }
}

/// Namespace segment of every key
///
/// Braced so that `{t}:*` never matches keys of namespace `t:x`.
fn namespace_prefix(namespace: &str) -> String {
    format!("{{{}}}", namespace)
}

fn validate_namespace(namespace: &str) -> Result<(), DomainError> {
    if namespace.trim().is_empty() || namespace.contains(['{', '}']) {
        return Err(DomainError::configuration(format!(
            "Invalid Redis namespace '{}': must be non-empty and contain no braces",
            namespace
        )));
    }

    Ok(())
}

/// Escape Redis glob metacharacters so a namespace matches literally
fn escape_glob(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());

    for c in value.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }

    escaped
}

#[async_trait]
impl SemanticCacheStore for RedisSemanticStore {
    async fn upsert(&self, entry: CacheEntry) -> Result<(), DomainError> {
        let mut conn = self.connection.clone();

        let sequence: u64 = conn.incr(self.sequence_key(), 1).await.map_err(|e| {
            DomainError::store_unavailable(format!("Failed to allocate entry sequence: {}", e))
        })?;

        let key = self.entry_key(entry.fingerprint(), entry.id());
        let document = serde_json::to_string(&StoredEntry { sequence, entry }).map_err(|e| {
            DomainError::serialization(format!("Failed to serialize cache entry: {}", e))
        })?;

        let result: redis::RedisResult<()> = match self.config.ttl {
            Some(ttl) => conn.set_ex(&key, document, ttl.as_secs().max(1)).await,
            None => conn.set(&key, document).await,
        };

        result.map_err(|e| {
            DomainError::store_unavailable(format!("Failed to write key '{}': {}", key, e))
        })?;

        debug!("Stored semantic cache entry {}", key);

        Ok(())
    }

    async fn query_nearest(
        &self,
        query: &SimilarityQuery,
    ) -> Result<Option<SemanticMatch>, DomainError> {
        let keys = self.scan_keys(&self.partition_pattern(&query.fingerprint)).await?;

        if keys.is_empty() {
            return Ok(None);
        }

        let mut conn = self.connection.clone();
        let documents: Vec<Option<String>> = redis::cmd("MGET")
            .arg(&keys)
            .query_async(&mut conn)
            .await
            .map_err(|e| {
                DomainError::store_unavailable(format!("Failed to load partition entries: {}", e))
            })?;

        let mut stored = Vec::with_capacity(documents.len());

        // Keys that expired between SCAN and MGET come back as nil
        for document in documents.into_iter().flatten() {
            let parsed: StoredEntry = serde_json::from_str(&document).map_err(|e| {
                DomainError::serialization(format!("Corrupt cache entry document: {}", e))
            })?;
            stored.push(parsed);
        }

        let candidates = stored.iter().map(|s| (s.sequence, &s.entry));

        Ok(select_nearest(candidates, query)
            .map(|(entry, score)| SemanticMatch::new(entry.clone(), score)))
    }

    async fn clear(&self) -> Result<(), DomainError> {
        let mut keys = self.scan_keys(&self.all_entries_pattern()).await?;
        keys.push(self.sequence_key());
        let mut conn = self.connection.clone();

        for batch in keys.chunks(SCAN_BATCH) {
            let _: i64 = conn.del(batch).await.map_err(|e| {
                DomainError::store_unavailable(format!("Failed to delete keys: {}", e))
            })?;
        }

        debug!(
            "Cleared {} keys in namespace {}",
            keys.len(),
            self.config.namespace
        );

        Ok(())
    }

    async fn len(&self) -> Result<usize, DomainError> {
        Ok(self.scan_keys(&self.all_entries_pattern()).await?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::generation::GenerationResult;

    // Note: tests marked ignored require a running Redis instance
    // Run with: cargo test -- --ignored

    fn get_test_config(namespace: &str) -> RedisStoreConfig {
        RedisStoreConfig::new("redis://127.0.0.1:6379", namespace)
    }

    fn create_entry(fingerprint: &str, embedding: Vec<f32>, text: &str) -> CacheEntry {
        CacheEntry::new(
            text,
            Fingerprint::new(fingerprint),
            embedding,
            vec![GenerationResult::stop(text)],
        )
    }

    #[test]
    fn test_escape_glob() {
        assert_eq!(escape_glob("semantic:llm"), "semantic:llm");
        assert_eq!(escape_glob("a*b?[c]"), "a\\*b\\?\\[c\\]");
    }

    #[test]
    fn test_nested_namespaces_have_disjoint_prefixes() {
        let parent = format!("{}:", namespace_prefix("t"));
        let nested = namespace_prefix("t:x");

        assert_eq!(nested, "{t:x}");
        assert!(!nested.starts_with(&parent));
    }

    #[test]
    fn test_namespace_with_braces_rejected() {
        assert!(validate_namespace("semantic:llm").is_ok());
        assert!(validate_namespace("a{b}").is_err());
        assert!(validate_namespace(" ").is_err());
    }

    #[tokio::test]
    #[ignore = "Requires running Redis instance"]
    async fn test_redis_round_trip() {
        let store = RedisSemanticStore::new(get_test_config("test:roundtrip"))
            .await
            .unwrap();
        store.clear().await.unwrap();

        let entry = create_entry("f", vec![1.0, 0.0], "JD Vance.");
        store.upsert(entry.clone()).await.unwrap();

        let found = store
            .query_nearest(&SimilarityQuery::new(vec![1.0, 0.0], Fingerprint::new("f"), 0.8))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(found.entry, entry);

        store.clear().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "Requires running Redis instance"]
    async fn test_redis_partition_isolation() {
        let store = RedisSemanticStore::new(get_test_config("test:partition"))
            .await
            .unwrap();
        store.clear().await.unwrap();

        store
            .upsert(create_entry("f2", vec![1.0, 0.0], "other"))
            .await
            .unwrap();

        let found = store
            .query_nearest(&SimilarityQuery::new(vec![1.0, 0.0], Fingerprint::new("f1"), 0.0))
            .await
            .unwrap();

        assert!(found.is_none());

        store.clear().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "Requires running Redis instance"]
    async fn test_redis_clear_is_namespace_scoped() {
        let a = RedisSemanticStore::new(get_test_config("test:ns-a"))
            .await
            .unwrap();
        let b = RedisSemanticStore::new(get_test_config("test:ns-b"))
            .await
            .unwrap();

        a.upsert(create_entry("f", vec![1.0], "a")).await.unwrap();
        b.upsert(create_entry("f", vec![1.0], "b")).await.unwrap();

        a.clear().await.unwrap();

        assert_eq!(a.len().await.unwrap(), 0);
        assert_eq!(b.len().await.unwrap(), 1);

        b.clear().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "Requires running Redis instance"]
    async fn test_redis_clear_spares_nested_namespace() {
        let parent = RedisSemanticStore::new(get_test_config("t"))
            .await
            .unwrap();
        let nested = RedisSemanticStore::new(get_test_config("t:x"))
            .await
            .unwrap();
        parent.clear().await.unwrap();
        nested.clear().await.unwrap();

        parent.upsert(create_entry("f", vec![1.0], "parent")).await.unwrap();
        nested.upsert(create_entry("f", vec![1.0], "nested")).await.unwrap();

        parent.clear().await.unwrap();

        assert_eq!(parent.len().await.unwrap(), 0);
        assert_eq!(nested.len().await.unwrap(), 1);

        nested.clear().await.unwrap();
    }
}
