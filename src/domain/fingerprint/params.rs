//! Typed generation parameters

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// One or more stop sequences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StopSequences {
    Single(String),
    Many(Vec<String>),
}

impl StopSequences {
    /// Get all stop sequences as a vector
    pub fn as_vec(&self) -> Vec<&str> {
        match self {
            StopSequences::Single(s) => vec![s.as_str()],
            StopSequences::Many(v) => v.iter().map(|s| s.as_str()).collect(),
        }
    }
}

/// Generation parameters recognized by the cache
///
/// Unknown keys are rejected when deserializing, so a parameter the cache does
/// not know about can never silently widen or narrow a partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelParams {
    #[serde(alias = "model")]
    pub model_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_of: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logit_bias: Option<BTreeMap<String, f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<StopSequences>,
}

impl ModelParams {
    /// Create parameters for a model with everything else unset
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            temperature: None,
            max_tokens: None,
            n: None,
            best_of: None,
            frequency_penalty: None,
            presence_penalty: None,
            top_p: None,
            logit_bias: None,
            stop: None,
        }
    }

    /// Parse parameters from a loosely-typed key/value map
    pub fn from_map(map: serde_json::Map<String, serde_json::Value>) -> Result<Self, DomainError> {
        serde_json::from_value(serde_json::Value::Object(map))
            .map_err(|e| DomainError::serialization(format!("Invalid model parameters: {}", e)))
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: i64) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_n(mut self, n: u32) -> Self {
        self.n = Some(n);
        self
    }

    pub fn with_best_of(mut self, best_of: u32) -> Self {
        self.best_of = Some(best_of);
        self
    }

    pub fn with_frequency_penalty(mut self, penalty: f64) -> Self {
        self.frequency_penalty = Some(penalty);
        self
    }

    pub fn with_presence_penalty(mut self, penalty: f64) -> Self {
        self.presence_penalty = Some(penalty);
        self
    }

    pub fn with_top_p(mut self, top_p: f64) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn with_logit_bias(mut self, token: impl Into<String>, bias: f64) -> Self {
        self.logit_bias
            .get_or_insert_with(BTreeMap::new)
            .insert(token.into(), bias);
        self
    }

    pub fn with_stop(mut self, stop: StopSequences) -> Self {
        self.stop = Some(stop);
        self
    }
}
