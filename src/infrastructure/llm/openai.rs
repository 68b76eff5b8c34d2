//! OpenAI completions provider

use async_trait::async_trait;
use serde::Deserialize;

use super::http_client::HttpClientTrait;
use crate::domain::{
    CompletionProvider, DomainError, FinishReason, GenerationResult, ModelParams,
};

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";

/// OpenAI legacy completions API (`/v1/completions`)
#[derive(Debug)]
pub struct OpenAiCompletionProvider<C: HttpClientTrait> {
    client: C,
    auth_header: String,
    base_url: String,
}

impl<C: HttpClientTrait> OpenAiCompletionProvider<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_OPENAI_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let auth_header = format!("Bearer {}", api_key.into());
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            client,
            auth_header,
            base_url,
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/v1/completions", self.base_url)
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
        ]
    }

    fn build_request(&self, prompt: &str, params: &ModelParams) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": params.model_name,
            "prompt": prompt,
        });

        if let Some(temp) = params.temperature {
            body["temperature"] = serde_json::json!(temp);
        }

        if let Some(max_tokens) = params.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        if let Some(n) = params.n {
            body["n"] = serde_json::json!(n);
        }

        if let Some(best_of) = params.best_of {
            body["best_of"] = serde_json::json!(best_of);
        }

        if let Some(top_p) = params.top_p {
            body["top_p"] = serde_json::json!(top_p);
        }

        if let Some(frequency_penalty) = params.frequency_penalty {
            body["frequency_penalty"] = serde_json::json!(frequency_penalty);
        }

        if let Some(presence_penalty) = params.presence_penalty {
            body["presence_penalty"] = serde_json::json!(presence_penalty);
        }

        if let Some(ref logit_bias) = params.logit_bias {
            body["logit_bias"] = serde_json::json!(logit_bias);
        }

        if let Some(ref stop) = params.stop {
            body["stop"] = serde_json::json!(stop.as_vec());
        }

        body
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<Vec<GenerationResult>, DomainError> {
        let response: OpenAiCompletionResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::generation("openai", format!("Failed to parse response: {}", e))
        })?;

        if response.choices.is_empty() {
            return Err(DomainError::generation("openai", "No choices in response"));
        }

        let mut choices = response.choices;
        choices.sort_by_key(|c| c.index);

        Ok(choices
            .into_iter()
            .map(|choice| GenerationResult {
                text: choice.text,
                finish_reason: FinishReason::from_provider(choice.finish_reason.as_deref()),
                log_probabilities: choice.logprobs.filter(|v| !v.is_null()),
            })
            .collect())
    }
}

#[async_trait]
impl<C: HttpClientTrait> CompletionProvider for OpenAiCompletionProvider<C> {
    async fn complete(
        &self,
        prompt: &str,
        params: &ModelParams,
    ) -> Result<Vec<GenerationResult>, DomainError> {
        let url = self.completions_url();
        let body = self.build_request(prompt, params);

        let response = self
            .client
            .post_json(&url, self.headers(), &body)
            .await
            .map_err(|e| DomainError::generation("openai", e.message))?;

        self.parse_response(response)
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

// OpenAI API types for completions

#[derive(Debug, Deserialize)]
struct OpenAiCompletionResponse {
    choices: Vec<OpenAiCompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiCompletionChoice {
    #[serde(default)]
    index: usize,
    text: String,
    finish_reason: Option<String>,
    #[serde(default)]
    logprobs: Option<serde_json::Value>,
}
