//! Fingerprint derivation

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use super::ModelParams;
use crate::domain::DomainError;

/// Deterministic identity of a generation-parameter set
///
/// Used as an exact-match partition key: two requests with the same
/// fingerprint are interchangeable for caching purposes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Wrap an already-built fingerprint string
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Hex SHA-256 of the fingerprint, safe to embed in storage keys
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(self.0.as_bytes()))
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Builds fingerprints from model parameters
///
/// The stop parameter is excluded by default. Different stop sequences can
/// change output length, so the exclusion is a policy switch rather than a
/// fixed rule.
#[derive(Debug, Clone)]
pub struct FingerprintBuilder {
    excludes_stop: bool,
}

impl Default for FingerprintBuilder {
    fn default() -> Self {
        Self {
            excludes_stop: true,
        }
    }
}

impl FingerprintBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether the stop parameter is left out of the fingerprint
    pub fn with_excludes_stop(mut self, excludes_stop: bool) -> Self {
        self.excludes_stop = excludes_stop;
        self
    }

    pub fn excludes_stop(&self) -> bool {
        self.excludes_stop
    }

    /// Derive the fingerprint for a parameter set
    ///
    /// Set parameters are emitted as `[key, value]` pairs sorted by key and
    /// serialized as a JSON array. Unset parameters are omitted.
    pub fn build(&self, params: &ModelParams) -> Result<Fingerprint, DomainError> {
        if params.model_name.trim().is_empty() {
            return Err(DomainError::serialization(
                "Model identifier must not be empty",
            ));
        }

        let mut pairs: Vec<(&'static str, Value)> = Vec::new();

        pairs.push(("model_name", Value::String(params.model_name.clone())));
        push_float(&mut pairs, "temperature", params.temperature)?;
        push_float(&mut pairs, "frequency_penalty", params.frequency_penalty)?;
        push_float(&mut pairs, "presence_penalty", params.presence_penalty)?;
        push_float(&mut pairs, "top_p", params.top_p)?;

        if let Some(max_tokens) = params.max_tokens {
            pairs.push(("max_tokens", Value::from(max_tokens)));
        }

        if let Some(n) = params.n {
            pairs.push(("n", Value::from(n)));
        }

        if let Some(best_of) = params.best_of {
            pairs.push(("best_of", Value::from(best_of)));
        }

        if let Some(ref bias) = params.logit_bias {
            let mut object = serde_json::Map::new();

            for (token, value) in bias {
                object.insert(token.clone(), finite_number("logit_bias", *value)?);
            }

            pairs.push(("logit_bias", Value::Object(object)));
        }

        if !self.excludes_stop {
            if let Some(ref stop) = params.stop {
                pairs.push(("stop", Value::from(stop.as_vec())));
            }
        }

        pairs.sort_by(|a, b| a.0.cmp(b.0));

        serde_json::to_string(&pairs)
            .map(Fingerprint)
            .map_err(|e| DomainError::serialization(format!("Failed to serialize fingerprint: {}", e)))
    }
}

fn push_float(
    pairs: &mut Vec<(&'static str, Value)>,
    key: &'static str,
    value: Option<f64>,
) -> Result<(), DomainError> {
    if let Some(value) = value {
        pairs.push((key, finite_number(key, value)?));
    }

    Ok(())
}

fn finite_number(key: &str, value: f64) -> Result<Value, DomainError> {
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .ok_or_else(|| {
            DomainError::serialization(format!("Unsupported value for '{}': {}", key, value))
        })
}
