//! CLI module for the semantic LLM cache
//!
//! Provides subcommands operating on the configured cache:
//! - `seed`: populate entries without calling the completion provider
//! - `ask`: answer a prompt from the cache or the completion provider
//! - `clear`: remove every entry in the configured namespace
//! - `demo`: seed and query one engine within a single process
//!
//! `seed`, `ask` and `clear` require a store that outlives the process.

pub mod ask;
pub mod clear;
mod context;
pub mod demo;
pub mod seed;

use clap::{Parser, Subcommand};

pub use context::CacheContext;

/// Semantic LLM cache - reuse answers for semantically similar prompts
#[derive(Parser)]
#[command(name = "semantic-llm-cache")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Seed the cache with prompt/answer pairs
    Seed(seed::SeedArgs),

    /// Answer a prompt, using the cache when possible
    Ask(ask::AskArgs),

    /// Remove every cached entry
    Clear,

    /// Seed, then ask repeated and paraphrased questions in one process
    Demo(demo::DemoArgs),
}
