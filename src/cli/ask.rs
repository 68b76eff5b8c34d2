//! Ask command - answers a prompt through the cache

use std::time::{Duration, Instant};

use clap::Args;
use tracing::info;

use super::CacheContext;
use crate::infrastructure::llm::{HttpClient, OpenAiCompletionProvider};

/// Arguments for the ask command
#[derive(Args, Clone)]
pub struct AskArgs {
    /// Prompt to answer
    pub prompt: String,

    /// Completion request timeout in seconds
    #[arg(long, default_value_t = 60)]
    pub timeout_secs: u64,
}

/// Run the ask command
pub async fn run(args: AskArgs) -> anyhow::Result<()> {
    let context = CacheContext::load_shared().await?;
    let completion = &context.config.completion;

    let provider = OpenAiCompletionProvider::with_base_url(
        HttpClient::with_timeout(Duration::from_secs(args.timeout_secs))?,
        &completion.api_key,
        &completion.base_url,
    );

    let started = Instant::now();
    let results = context
        .engine
        .complete_with(&provider, &args.prompt, &completion.params)
        .await?;

    let stats = context.engine.stats();
    info!(
        "Answered in {:?} (hits: {}, misses: {})",
        started.elapsed(),
        stats.hits,
        stats.misses
    );

    for result in results {
        println!("{}", result.text.trim());
    }

    Ok(())
}
