use affirank::{
    config::Config,
    observer::TracingObserver,
    titles::{PageFetcher, TitleResolver},
};
use anyhow::{Context, Result};
use std::sync::Arc;

/// Resolve and print the title for one key or URL
pub async fn resolve_title(config: Config, target: String) -> Result<()> {
    let fetcher = PageFetcher::new(config.fetch.to_fetch_config())
        .context("Failed to build HTTP client")?;
    let resolver = TitleResolver::new(fetcher).with_observer(Arc::new(TracingObserver));

    let outcome = resolver.resolve(&target).await;
    println!("{}", outcome.display_title());

    Ok(())
}
