//! Semantic cache configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Supported store backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// Process-local store with linear search
    #[default]
    InMemory,
    /// Redis-backed store shared between processes
    Redis,
}

impl std::fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreBackend::InMemory => write!(f, "in_memory"),
            StoreBackend::Redis => write!(f, "redis"),
        }
    }
}

impl std::str::FromStr for StoreBackend {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "in_memory" | "inmemory" | "memory" => Ok(StoreBackend::InMemory),
            "redis" => Ok(StoreBackend::Redis),
            _ => Err(DomainError::configuration(format!(
                "Unknown store backend: {}. Valid backends: in_memory, redis",
                s
            ))),
        }
    }
}

/// Configuration for a semantic cache instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticCacheConfig {
    /// Minimum similarity score (0.0 to 1.0) for a stored entry to count as a hit
    #[serde(default = "default_score_threshold")]
    pub score_threshold: f32,

    /// Namespace that scopes every store operation, including clear
    #[serde(default = "default_namespace")]
    pub namespace: String,

    #[serde(default)]
    pub backend: StoreBackend,

    /// Redis connection URL (required for the Redis backend)
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Entry time-to-live in seconds; entries never expire when unset
    #[serde(default)]
    pub ttl_secs: Option<u64>,

    /// Maximum number of entries (in-memory backend only)
    #[serde(default)]
    pub max_entries: Option<usize>,

    /// Leave the stop parameter out of fingerprints
    #[serde(default = "default_true")]
    pub fingerprint_excludes_stop: bool,
}

fn default_score_threshold() -> f32 {
    0.8
}

fn default_namespace() -> String {
    "semantic:llm".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for SemanticCacheConfig {
    fn default() -> Self {
        Self {
            score_threshold: default_score_threshold(),
            namespace: default_namespace(),
            backend: StoreBackend::default(),
            redis_url: None,
            ttl_secs: None,
            max_entries: None,
            fingerprint_excludes_stop: default_true(),
        }
    }
}

impl SemanticCacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get TTL as Duration
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_secs.map(Duration::from_secs)
    }

    /// Set the score threshold, clamped into [0, 1]
    pub fn with_score_threshold(mut self, threshold: f32) -> Self {
        self.score_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_backend(mut self, backend: StoreBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_redis_url(mut self, url: impl Into<String>) -> Self {
        self.redis_url = Some(url.into());
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl_secs = Some(ttl.as_secs());
        self
    }

    pub fn with_max_entries(mut self, max: usize) -> Self {
        self.max_entries = Some(max);
        self
    }

    pub fn with_fingerprint_excludes_stop(mut self, excludes: bool) -> Self {
        self.fingerprint_excludes_stop = excludes;
        self
    }

    /// Check values that deserialization alone cannot enforce
    pub fn validate(&self) -> Result<(), DomainError> {
        if !(0.0..=1.0).contains(&self.score_threshold) {
            return Err(DomainError::configuration(format!(
                "score_threshold must be within [0, 1], got {}",
                self.score_threshold
            )));
        }

        if self.namespace.trim().is_empty() {
            return Err(DomainError::configuration("namespace must not be empty"));
        }

        if self.namespace.contains(['{', '}']) {
            return Err(DomainError::configuration(
                "namespace must not contain braces",
            ));
        }

        if self.max_entries == Some(0) {
            return Err(DomainError::configuration(
                "max_entries must be at least 1 when set",
            ));
        }

        if self.backend == StoreBackend::Redis && self.redis_url.is_none() {
            return Err(DomainError::configuration(
                "redis_url is required for the redis backend",
            ));
        }

        Ok(())
    }
}
