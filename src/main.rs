use clap::Parser;
use semantic_llm_cache::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Seed(args) => cli::seed::run(args).await,
        Command::Ask(args) => cli::ask::run(args).await,
        Command::Clear => cli::clear::run().await,
        Command::Demo(args) => cli::demo::run(args).await,
    }
}
