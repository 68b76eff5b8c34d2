//! Seed command - records prompt/answer pairs without generating

use clap::Args;
use futures::future::try_join_all;
use tracing::info;

use super::CacheContext;
use crate::domain::fingerprint::ModelParams;
use crate::domain::generation::GenerationResult;
use crate::domain::DomainError;
use crate::infrastructure::services::SemanticCacheEngine;

/// Sample prompts seeded when no pair is given on the command line
pub const SAMPLE_PAIRS: &[(&str, &str)] = &[
    ("Who is the world's greatest coder?", "Jon Strabla, just joking!"),
    (
        "How much is to call mars?",
        "Calling Mars by radio can costs $1,000 USD per minute at NASA.",
    ),
    (
        "Why is the moon made of cheese?",
        "Because if it was made of water it would evaporate into space.",
    ),
    ("Who is the 2024 Republican VP Pick in the U.S.", "JD Vance."),
    ("Who is the 2024 Democratic VP Pick in the U.S.", "Kamala Harris."),
    (
        "What was the S&P 500 at on 2024-07-18",
        "It opened at $5,608.56 and closed at $5,538.18 (with a High of $5,614.05 and a Low of $5,537.13)",
    ),
];

/// Arguments for the seed command
#[derive(Args, Clone)]
pub struct SeedArgs {
    /// Prompt to seed; the sample pairs are used when omitted
    #[arg(long, requires = "answer")]
    pub prompt: Option<String>,

    /// Answer stored for `--prompt`
    #[arg(long, requires = "prompt")]
    pub answer: Option<String>,
}

impl SeedArgs {
    pub fn pairs(&self) -> Vec<(String, String)> {
        match (&self.prompt, &self.answer) {
            (Some(prompt), Some(answer)) => vec![(prompt.clone(), answer.clone())],
            _ => sample_pairs(),
        }
    }
}

/// Owned copies of the sample pairs
pub fn sample_pairs() -> Vec<(String, String)> {
    SAMPLE_PAIRS
        .iter()
        .map(|(p, a)| (p.to_string(), a.to_string()))
        .collect()
}

/// Record every pair concurrently, returning how many were written
pub async fn seed_pairs(
    engine: &SemanticCacheEngine,
    params: &ModelParams,
    pairs: &[(String, String)],
) -> Result<usize, DomainError> {
    try_join_all(pairs.iter().map(|(prompt, answer)| {
        engine.record(prompt, params, vec![GenerationResult::stop(answer)])
    }))
    .await?;

    info!("Seeded {} entries", pairs.len());

    Ok(pairs.len())
}

/// Run the seed command
pub async fn run(args: SeedArgs) -> anyhow::Result<()> {
    let context = CacheContext::load_shared().await?;

    let seeded = seed_pairs(
        &context.engine,
        &context.config.completion.params,
        &args.pairs(),
    )
    .await?;

    println!("Seeded {} entries", seeded);

    Ok(())
}
