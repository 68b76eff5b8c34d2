//! Exact-match cache keys

use sha2::{Digest, Sha256};

use crate::domain::fingerprint::Fingerprint;

/// Key of the exact-match cache: the literal (prompt, fingerprint) pair
///
/// Hashed so arbitrarily long prompts produce bounded keys. Prompts that
/// differ by a single character produce different keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExactMatchKey(String);

impl ExactMatchKey {
    pub fn new(prompt: &str, fingerprint: &Fingerprint) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(prompt.as_bytes());
        // Separator keeps ("ab", "c") and ("a", "bc") apart
        hasher.update([0u8]);
        hasher.update(fingerprint.as_str().as_bytes());

        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
