use affirank::{
    config::Config,
    input::{read_posts, InputFormat},
    observer::TracingObserver,
    pipeline::Pipeline,
    types::PostText,
};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Post permalink when known, else its 1-based position in the input
fn post_label(index: usize, post: &PostText) -> String {
    post.url.clone().unwrap_or_else(|| format!("#{}", index + 1))
}

/// Print every retailer link in the input with its label and key
pub fn extract_links(config: Config, input: PathBuf, format: Option<InputFormat>) -> Result<()> {
    let posts = read_posts(&input, format)
        .with_context(|| format!("Failed to load posts from {}", input.display()))?;
    info!("Loaded {} post(s) from {}", posts.len(), input.display());

    let pipeline = Pipeline::from_config(&config, Arc::new(TracingObserver))?;
    let mut found = 0usize;

    for (i, post) in posts.iter().enumerate() {
        for link in pipeline.extractor().extract(&post.text) {
            let key = pipeline.normalizer().normalize_link(&link);
            println!("{}\t{}\t{}\t{}", post_label(i, post), link.label, key, link.url);
            found += 1;
        }
    }

    info!("{} link(s) in {} post(s)", found, posts.len());
    Ok(())
}
