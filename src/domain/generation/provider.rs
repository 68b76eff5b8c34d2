//! Completion provider trait definition

use async_trait::async_trait;
use std::fmt::Debug;

use super::GenerationResult;
use crate::domain::fingerprint::ModelParams;
use crate::domain::DomainError;

/// Trait for completion providers
///
/// Calls are not idempotent: sampling may return different candidates for the
/// same prompt and parameters.
#[async_trait]
pub trait CompletionProvider: Send + Sync + Debug {
    /// Generate candidates for a prompt
    async fn complete(
        &self,
        prompt: &str,
        params: &ModelParams,
    ) -> Result<Vec<GenerationResult>, DomainError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Completion provider returning a fixed answer and counting calls
    #[derive(Debug)]
    pub struct MockCompletionProvider {
        answer: String,
        error: Option<String>,
        calls: AtomicUsize,
    }

    impl MockCompletionProvider {
        pub fn new(answer: impl Into<String>) -> Self {
            Self {
                answer: answer.into(),
                error: None,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn with_error(mut self, error: impl Into<String>) -> Self {
            self.error = Some(error.into());
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CompletionProvider for MockCompletionProvider {
        async fn complete(
            &self,
            _prompt: &str,
            params: &ModelParams,
        ) -> Result<Vec<GenerationResult>, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            if let Some(ref error) = self.error {
                return Err(DomainError::generation("mock", error));
            }

            let n = params.n.unwrap_or(1).max(1) as usize;

            Ok((0..n)
                .map(|_| GenerationResult::stop(self.answer.clone()))
                .collect())
        }

        fn provider_name(&self) -> &'static str {
            "mock"
        }
    }
}
