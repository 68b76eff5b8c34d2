//! Generation domain - completion results and providers

mod provider;
mod result;

pub use provider::CompletionProvider;
pub use result::{FinishReason, GenerationResult};

#[cfg(test)]
pub use provider::mock::MockCompletionProvider;
