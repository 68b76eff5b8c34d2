//! Demo command - seeds and queries one engine inside a single process
//!
//! Works with every backend, including `in_memory`. With Redis the sample
//! pairs are recorded again on each run.

use std::time::{Duration, Instant};

use clap::Args;

use super::seed::{sample_pairs, seed_pairs, SAMPLE_PAIRS};
use super::CacheContext;
use crate::domain::fingerprint::ModelParams;
use crate::domain::generation::CompletionProvider;
use crate::domain::DomainError;
use crate::infrastructure::llm::{HttpClient, OpenAiCompletionProvider};
use crate::infrastructure::services::SemanticCacheEngine;

/// Asked twice: the first call generates, the second is served from cache
pub const REPEATED_QUESTION: &str = "How long do dogs live?";

/// Rewordings of `REPEATED_QUESTION`
pub const PARAPHRASES: &[&str] = &[
    "How long do canines live?",
    "How long is the lifespan of a dog?",
];

/// Arguments for the demo command
#[derive(Args, Clone)]
pub struct DemoArgs {
    /// Completion request timeout in seconds
    #[arg(long, default_value_t = 60)]
    pub timeout_secs: u64,
}

/// One answered question
#[derive(Debug, Clone)]
pub struct DemoStep {
    pub question: String,
    pub answer: String,
    pub elapsed: Duration,
}

/// Seed the sample pairs, then ask the repeated question, its paraphrases
/// and every seeded question
pub async fn run_demo(
    engine: &SemanticCacheEngine,
    provider: &dyn CompletionProvider,
    params: &ModelParams,
) -> Result<Vec<DemoStep>, DomainError> {
    seed_pairs(engine, params, &sample_pairs()).await?;

    let questions = [REPEATED_QUESTION, REPEATED_QUESTION]
        .into_iter()
        .chain(PARAPHRASES.iter().copied())
        .chain(SAMPLE_PAIRS.iter().map(|(question, _)| *question));

    let mut steps = Vec::new();

    for question in questions {
        let started = Instant::now();
        let results = engine.complete_with(provider, question, params).await?;

        steps.push(DemoStep {
            question: question.to_string(),
            answer: results
                .first()
                .map(|r| r.text.trim().to_string())
                .unwrap_or_default(),
            elapsed: started.elapsed(),
        });
    }

    Ok(steps)
}

/// Run the demo command
pub async fn run(args: DemoArgs) -> anyhow::Result<()> {
    let context = CacheContext::load().await?;
    let completion = &context.config.completion;

    let provider = OpenAiCompletionProvider::with_base_url(
        HttpClient::with_timeout(Duration::from_secs(args.timeout_secs))?,
        &completion.api_key,
        &completion.base_url,
    );

    let steps = run_demo(&context.engine, &provider, &completion.params).await?;

    for step in &steps {
        println!("Question : {}", step.question);
        println!("Answer   : {}", step.answer);
        println!("Time     : {:.4}s", step.elapsed.as_secs_f64());
        println!();
    }

    let stats = context.engine.stats();
    println!(
        "hits: {}, misses: {}, records: {}, hit rate: {:.2}",
        stats.hits,
        stats.misses,
        stats.records,
        stats.hit_rate()
    );

    Ok(())
}
