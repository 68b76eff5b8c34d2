use std::fmt;

use thiserror::Error;

/// Whether an embedding failure may succeed on retry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingErrorKind {
    /// Throttling, timeouts, upstream 5xx
    Transient,
    /// Malformed input or response, authentication, unknown model
    Fatal,
}

impl fmt::Display for EmbeddingErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmbeddingErrorKind::Transient => write!(f, "transient"),
            EmbeddingErrorKind::Fatal => write!(f, "fatal"),
        }
    }
}

/// Core domain errors
///
/// Every failure is surfaced as one of these values; a cache miss is never
/// expressed as an error.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Embedding provider error ({kind}): {provider} - {message}")]
    EmbeddingProvider {
        provider: String,
        message: String,
        kind: EmbeddingErrorKind,
    },

    #[error("Store unavailable: {message}")]
    StoreUnavailable { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Generation error: {provider} - {message}")]
    Generation { provider: String, message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn embedding_transient(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::EmbeddingProvider {
            provider: provider.into(),
            message: message.into(),
            kind: EmbeddingErrorKind::Transient,
        }
    }

    pub fn embedding_fatal(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::EmbeddingProvider {
            provider: provider.into(),
            message: message.into(),
            kind: EmbeddingErrorKind::Fatal,
        }
    }

    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
        }
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    pub fn generation(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Generation {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether retrying the same call may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::EmbeddingProvider { kind, .. } => *kind == EmbeddingErrorKind::Transient,
            Self::StoreUnavailable { .. } => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_error_display() {
        let error = DomainError::embedding_transient("openai", "HTTP 429: slow down");
        assert_eq!(
            error.to_string(),
            "Embedding provider error (transient): openai - HTTP 429: slow down"
        );
    }

    #[test]
    fn test_store_unavailable_error() {
        let error = DomainError::store_unavailable("connection refused");
        assert_eq!(error.to_string(), "Store unavailable: connection refused");
    }

    #[test]
    fn test_retryable_classification() {
        assert!(DomainError::embedding_transient("p", "timeout").is_retryable());
        assert!(!DomainError::embedding_fatal("p", "bad input").is_retryable());
        assert!(DomainError::store_unavailable("down").is_retryable());
        assert!(!DomainError::serialization("NaN").is_retryable());
        assert!(!DomainError::generation("openai", "quota").is_retryable());
    }
}
