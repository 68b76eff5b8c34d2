//! Completion provider implementations

mod http_client;
mod openai;

pub use http_client::{HttpClient, HttpClientTrait, HttpError};
pub use openai::OpenAiCompletionProvider;

#[cfg(test)]
pub use http_client::mock::MockHttpClient;
