//! Title resolution with graceful degradation
//!
//! Every lookup ends in a string. Failures map to fixed sentinel titles so a
//! single bad product never aborts the report.

use async_trait::async_trait;
use url::Url;

use super::fetcher::{parse_http_url, FetchError, PageFetcher};
use super::html::{extract_title, TitleOrigin};
use crate::observer::{self, SharedObserver};
use crate::types::{ProductKey, RankedEntry, RetailerLabel};

/// Title used when the server answered with a non-2xx status
pub const TITLE_UNAVAILABLE: &str = "title unavailable";
/// Title used when the page had neither `og:title` nor `<title>`
pub const TITLE_UNKNOWN: &str = "title unknown";
/// Title used when the request or URL itself failed
pub const TITLE_FETCH_ERROR: &str = "fetch error";
/// Title used when lookups were turned off for the run
pub const TITLE_SKIPPED: &str = "title skipped";

/// Result of one title lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleOutcome {
    Found { title: String, origin: TitleOrigin },
    Unavailable { status: u16 },
    Unknown,
    Failed { reason: String },
}

impl TitleOutcome {
    /// Display string for the report: the title or its sentinel
    pub fn display_title(&self) -> &str {
        match self {
            Self::Found { title, .. } => title,
            Self::Unavailable { .. } => TITLE_UNAVAILABLE,
            Self::Unknown => TITLE_UNKNOWN,
            Self::Failed { .. } => TITLE_FETCH_ERROR,
        }
    }

    pub fn into_title(self) -> String {
        match self {
            Self::Found { title, .. } => title,
            other => other.display_title().to_string(),
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }
}

/// Product page URL for a canonical key, when the key carries enough to build one
pub fn product_page_url(key: &ProductKey) -> Option<String> {
    match key.retailer_parts()? {
        (RetailerLabel::Amazon, asin) => Some(format!("https://www.amazon.co.jp/dp/{}", asin)),
        (RetailerLabel::Rakuten, shop_item) => {
            Some(format!("https://item.rakuten.co.jp/{}/", shop_item))
        }
        // yahoo keys drop the store segment, so no page can be rebuilt
        _ => None,
    }
}

/// Fetches page titles for keys or URLs
pub struct TitleResolver {
    fetcher: PageFetcher,
    observer: SharedObserver,
}

impl TitleResolver {
    pub fn new(fetcher: PageFetcher) -> Self {
        Self {
            fetcher,
            observer: observer::noop(),
        }
    }

    pub fn with_observer(mut self, observer: SharedObserver) -> Self {
        self.observer = observer;
        self
    }

    /// Turn a key or URL string into the URL to fetch
    pub fn target_url(key_or_url: &str) -> Result<Url, FetchError> {
        if let Ok(url) = parse_http_url(key_or_url) {
            return Ok(url);
        }
        let key = ProductKey::parse(key_or_url.trim(), 0)
            .map_err(|e| FetchError::InvalidUrl(e.to_string()))?;
        let page = product_page_url(&key)
            .ok_or_else(|| FetchError::InvalidUrl(format!("no product page for key {}", key)))?;
        parse_http_url(&page)
    }

    /// Resolve a title, keeping the detailed outcome
    pub async fn resolve(&self, key_or_url: &str) -> TitleOutcome {
        let outcome = match Self::target_url(key_or_url) {
            Ok(url) => self.fetch_title(&url).await,
            Err(e) => TitleOutcome::Failed {
                reason: e.to_string(),
            },
        };
        self.observer.title_resolved(key_or_url, &outcome);
        outcome
    }

    /// Resolve a title to its display string. Never fails.
    pub async fn resolve_title(&self, key_or_url: &str) -> String {
        self.resolve(key_or_url).await.into_title()
    }

    async fn fetch_title(&self, url: &Url) -> TitleOutcome {
        let page = match self.fetcher.fetch(url).await {
            Ok(page) => page,
            Err(e) => {
                return TitleOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        };

        self.observer.page_fetched(&page);

        if !page.is_success() {
            return TitleOutcome::Unavailable {
                status: page.status_code,
            };
        }

        match extract_title(&page.body) {
            Some((title, origin)) => TitleOutcome::Found { title, origin },
            None => TitleOutcome::Unknown,
        }
    }

    /// The string to resolve for a ranked entry: the rebuilt product page,
    /// else the first URL seen for the key, else the key itself
    pub fn lookup_target(entry: &RankedEntry) -> String {
        product_page_url(&entry.key)
            .or_else(|| entry.source_url.clone())
            .unwrap_or_else(|| entry.key.to_string())
    }
}

/// Source of display titles for ranked entries
#[async_trait]
pub trait TitleLookup: Send + Sync {
    async fn lookup(&self, entry: &RankedEntry) -> String;
}

#[async_trait]
impl TitleLookup for TitleResolver {
    async fn lookup(&self, entry: &RankedEntry) -> String {
        self.resolve_title(&Self::lookup_target(entry)).await
    }
}
