//! Prompt-to-vector adapter over an embedding provider

use std::sync::Arc;

use crate::domain::embedding::{EmbeddingProvider, EmbeddingRequest};
use crate::domain::DomainError;

/// Turns prompt text into a similarity vector of fixed dimensionality
///
/// Stateless apart from the provider handle; safe to share between tasks.
#[derive(Debug, Clone)]
pub struct EmbeddingAdapter {
    provider: Arc<dyn EmbeddingProvider>,
    model: String,
    dimensions: usize,
}

impl EmbeddingAdapter {
    /// Create an adapter, fixing the vector size
    ///
    /// When `dimensions` is `None` the size is taken from the provider's
    /// known models; an unknown model without an explicit size is rejected.
    pub fn new(
        provider: Arc<dyn EmbeddingProvider>,
        model: impl Into<String>,
        dimensions: Option<usize>,
    ) -> Result<Self, DomainError> {
        let model = model.into();

        let dimensions = match dimensions.or_else(|| provider.dimensions(&model)) {
            Some(0) | None => {
                return Err(DomainError::configuration(format!(
                    "Unknown embedding dimensions for model '{}' on provider '{}'",
                    model,
                    provider.provider_name()
                )));
            }
            Some(dims) => dims,
        };

        Ok(Self {
            provider,
            model,
            dimensions,
        })
    }

    /// Create an adapter using the provider's default model
    pub fn with_default_model(provider: Arc<dyn EmbeddingProvider>) -> Result<Self, DomainError> {
        let model = provider.default_model();
        Self::new(provider, model, None)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Embed a text
    ///
    /// A response without a vector, with a vector of the wrong size, or with
    /// a NaN or infinite component is a fatal provider error.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        let mut request = EmbeddingRequest::new(&self.model, text);

        if self.provider.dimensions(&self.model) != Some(self.dimensions) {
            request = request.with_dimensions(self.dimensions);
        }

        let response = self.provider.embed(request).await?;

        let vector = response
            .into_first()
            .map(|e| e.into_vector())
            .ok_or_else(|| {
                DomainError::embedding_fatal(self.provider.provider_name(), "No embedding returned")
            })?;

        if vector.len() != self.dimensions {
            return Err(DomainError::embedding_fatal(
                self.provider.provider_name(),
                format!(
                    "Expected {} dimensions, got {}",
                    self.dimensions,
                    vector.len()
                ),
            ));
        }

        if vector.iter().any(|v| !v.is_finite()) {
            return Err(DomainError::embedding_fatal(
                self.provider.provider_name(),
                "Non-finite value in embedding",
            ));
        }

        Ok(vector)
    }
}
