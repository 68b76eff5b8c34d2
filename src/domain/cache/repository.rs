//! Exact-match response cache trait

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::fingerprint::Fingerprint;
use crate::domain::generation::GenerationResult;
use crate::domain::DomainError;

/// Cache keyed by the literal (prompt, fingerprint) pair
///
/// No similarity notion: paraphrases always miss. Kept as the baseline the
/// semantic engine is measured against.
#[async_trait]
pub trait ResponseCache: Send + Sync + Debug {
    /// Look up the results stored for this exact prompt and fingerprint
    async fn get(
        &self,
        prompt: &str,
        fingerprint: &Fingerprint,
    ) -> Result<Option<Vec<GenerationResult>>, DomainError>;

    /// Store results, replacing any previous value for the same pair
    async fn set(
        &self,
        prompt: &str,
        fingerprint: &Fingerprint,
        results: Vec<GenerationResult>,
    ) -> Result<(), DomainError>;

    /// Remove every entry
    async fn clear(&self) -> Result<(), DomainError>;
}
