//! Embedding provider implementations

mod adapter;
mod openai;

pub use adapter::EmbeddingAdapter;
pub use openai::OpenAiEmbeddingProvider;

// Re-export HTTP client for use by embedding providers
pub use super::llm::{HttpClient, HttpClientTrait, HttpError};
