//! Clear command - empties the configured namespace

use super::CacheContext;

/// Run the clear command
pub async fn run() -> anyhow::Result<()> {
    let context = CacheContext::load_shared().await?;

    context.engine.clear().await?;
    println!(
        "Cleared namespace {}",
        context.config.semantic_cache.namespace
    );

    Ok(())
}
