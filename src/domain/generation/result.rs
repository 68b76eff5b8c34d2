use serde::{Deserialize, Deserializer, Serialize};

/// Reason why a candidate finished generating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    Other,
}

impl FinishReason {
    /// Map a provider's finish reason string
    pub fn from_provider(reason: Option<&str>) -> Self {
        match reason {
            Some("stop") => FinishReason::Stop,
            Some("length") => FinishReason::Length,
            _ => FinishReason::Other,
        }
    }
}

/// One generated candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub text: String,
    pub finish_reason: FinishReason,
    /// Absent when unset; an explicit JSON null is kept as `Some(Null)`
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_value"
    )]
    pub log_probabilities: Option<serde_json::Value>,
}

fn present_value<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}

impl GenerationResult {
    pub fn new(text: impl Into<String>, finish_reason: FinishReason) -> Self {
        Self {
            text: text.into(),
            finish_reason,
            log_probabilities: None,
        }
    }

    /// A candidate that finished on a stop sequence
    pub fn stop(text: impl Into<String>) -> Self {
        Self::new(text, FinishReason::Stop)
    }

    pub fn with_log_probabilities(mut self, log_probabilities: serde_json::Value) -> Self {
        self.log_probabilities = Some(log_probabilities);
        self
    }
}
