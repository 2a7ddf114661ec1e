//! Diagnostic hooks for the pipeline
//!
//! Components never log on their own. They report what happened to an
//! injected `PipelineObserver`; the binary plugs in `TracingObserver`, tests
//! plug in recorders or nothing at all.

use std::sync::Arc;

use crate::titles::{FetchedPage, TitleOutcome};
use crate::types::{ExtractedLink, ProductKey, RankedEntry};
use crate::util::truncate_str;

/// Receives pipeline events. Every method defaults to doing nothing.
pub trait PipelineObserver: Send + Sync {
    /// Links found in one post text
    fn links_extracted(&self, _text: &str, _links: &[ExtractedLink]) {}

    /// A link was mapped to its aggregation key
    fn link_normalized(&self, _link: &ExtractedLink, _key: &ProductKey) {}

    /// A short link was expanded (`None` when expansion failed)
    fn link_expanded(&self, _short_url: &str, _expanded: Option<&str>) {}

    /// The ranked table was built from `total_keys` keys
    fn table_ranked(&self, _total_keys: usize, _ranked: &[RankedEntry]) {}

    /// Title resolution is about to start for entry `position` (1-based)
    fn title_started(&self, _position: usize, _total: usize, _entry: &RankedEntry) {}

    /// A page came back from the server, whatever its status
    fn page_fetched(&self, _page: &FetchedPage) {}

    /// A title lookup finished
    fn title_resolved(&self, _target: &str, _outcome: &TitleOutcome) {}

    /// Report building stopped early after `completed` entries
    fn report_cancelled(&self, _completed: usize, _total: usize) {}
}

/// Observer that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}

/// Shared handle used by every component
pub type SharedObserver = Arc<dyn PipelineObserver>;

/// Default observer handle
pub fn noop() -> SharedObserver {
    Arc::new(NoopObserver)
}

/// Forwards pipeline events to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn links_extracted(&self, text: &str, links: &[ExtractedLink]) {
        let excerpt = truncate_str(&text.replace('\n', " "), 80);
        if links.is_empty() {
            tracing::debug!("No affiliate links in post: {}", excerpt);
        } else {
            tracing::debug!("Found {} affiliate link(s) in post: {}", links.len(), excerpt);
        }
    }

    fn link_normalized(&self, link: &ExtractedLink, key: &ProductKey) {
        if key.is_passthrough() {
            tracing::debug!("Unrecognized {} link shape, keeping raw URL: {}", link.label, link.url);
        } else {
            tracing::trace!("{} -> {}", link.url, key);
        }
    }

    fn link_expanded(&self, short_url: &str, expanded: Option<&str>) {
        match expanded {
            Some(url) => tracing::debug!("Expanded {} -> {}", short_url, url),
            None => tracing::warn!("Could not expand short link {}", short_url),
        }
    }

    fn table_ranked(&self, total_keys: usize, ranked: &[RankedEntry]) {
        tracing::info!(
            "Counted {} link(s) across {} distinct product(s)",
            total_keys,
            ranked.len()
        );
    }

    fn title_started(&self, position: usize, total: usize, entry: &RankedEntry) {
        tracing::debug!("[{}/{}] Resolving title for {}", position, total, entry.key);
    }

    fn page_fetched(&self, page: &FetchedPage) {
        tracing::debug!(
            "HTTP {} {} ({}, {}, {:?})",
            page.status_code,
            page.final_url,
            page.content_type.as_deref().unwrap_or("no content type"),
            page.encoding,
            page.fetch_duration
        );
    }

    fn title_resolved(&self, target: &str, outcome: &TitleOutcome) {
        match outcome {
            TitleOutcome::Found { title, .. } => {
                tracing::debug!("Title for {}: {}", target, title)
            }
            TitleOutcome::Unavailable { status } => {
                tracing::warn!("HTTP {} fetching {}", status, target)
            }
            TitleOutcome::Unknown => tracing::warn!("No title found at {}", target),
            TitleOutcome::Failed { reason } => {
                tracing::warn!("Title fetch failed for {}: {}", target, reason)
            }
        }
    }

    fn report_cancelled(&self, completed: usize, total: usize) {
        tracing::warn!("Title resolution stopped after {}/{} entries", completed, total);
    }
}
