//! Text-to-ranking pipeline: extract, normalize, count

use url::Url;

use crate::aggregate::Tally;
use crate::config::Config;
use crate::extraction::{LinkExtractor, Normalizer, RuleSet};
use crate::observer::{self, SharedObserver};
use crate::titles::{FetchError, PageFetcher};
use crate::types::{ExtractedLink, PostText, ProductKey, RankedEntry, RetailerLabel};

/// Runs post texts through extraction, normalization and aggregation.
///
/// All stages are synchronous except optional short link expansion, which
/// needs the network and is only used by [`Pipeline::rank_posts`].
pub struct Pipeline {
    rules: RuleSet,
    extractor: LinkExtractor,
    normalizer: Normalizer,
    expander: Option<PageFetcher>,
    observer: SharedObserver,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(RuleSet::default())
    }
}

impl Pipeline {
    pub fn new(rules: RuleSet) -> Self {
        Self {
            extractor: LinkExtractor::new(rules.clone()),
            normalizer: Normalizer::new(rules.clone()),
            rules,
            expander: None,
            observer: observer::noop(),
        }
    }

    /// Build from configuration. Creates an HTTP client only when short
    /// link expansion is enabled.
    pub fn from_config(config: &Config, observer: SharedObserver) -> Result<Self, FetchError> {
        let mut pipeline = Self::new(config.extraction.rule_set()).with_observer(observer);
        if config.extraction.expand_short_links {
            let fetcher = PageFetcher::new(config.fetch.to_fetch_config())?;
            pipeline = pipeline.with_expander(fetcher);
        }
        Ok(pipeline)
    }

    pub fn with_observer(mut self, observer: SharedObserver) -> Self {
        self.extractor = self.extractor.with_observer(observer.clone());
        self.normalizer = self.normalizer.with_observer(observer.clone());
        self.observer = observer;
        self
    }

    /// Expand shortened links through `fetcher` before normalizing
    pub fn with_expander(mut self, fetcher: PageFetcher) -> Self {
        self.expander = Some(fetcher);
        self
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn extractor(&self) -> &LinkExtractor {
        &self.extractor
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Keys for every retailer link in `text`, in order of appearance
    pub fn keys_for_text(&self, text: &str) -> Vec<ProductKey> {
        self.extractor
            .extract(text)
            .iter()
            .map(|link| self.normalizer.normalize_link(link))
            .collect()
    }

    /// Rank the links found across `texts`. Short links are counted as they
    /// appear.
    pub fn rank<I, S>(&self, texts: I) -> Vec<RankedEntry>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tally = Tally::new();
        for text in texts {
            for link in self.extractor.extract(text.as_ref()) {
                let key = self.normalizer.normalize_link(&link);
                tally.record_with_source(key, &link.url);
            }
        }
        self.finish(tally)
    }

    /// Rank the links found across `posts`, expanding short links first when
    /// an expander is configured
    pub async fn rank_posts(&self, posts: &[PostText]) -> Vec<RankedEntry> {
        let mut tally = Tally::new();
        for post in posts {
            for link in self.extractor.extract(&post.text) {
                let link = self.expand(link).await;
                let key = self.normalizer.normalize_link(&link);
                tally.record_with_source(key, &link.url);
            }
        }
        self.finish(tally)
    }

    fn finish(&self, tally: Tally) -> Vec<RankedEntry> {
        let total = tally.total();
        let ranked = tally.into_ranked();
        self.observer.table_ranked(total, &ranked);
        ranked
    }

    /// Replace a short link with the link it redirects to, re-labelled by
    /// its final host. Failures keep the short link.
    async fn expand(&self, link: ExtractedLink) -> ExtractedLink {
        let Some(fetcher) = &self.expander else {
            return link;
        };
        let Ok(url) = Url::parse(&link.url) else {
            return link;
        };
        if !url.host_str().is_some_and(|h| self.rules.is_short_host(h)) {
            return link;
        }

        match fetcher.resolve_final(&url).await {
            Ok(target) if target != url => {
                self.observer.link_expanded(&link.url, Some(target.as_str()));
                let label = target
                    .host_str()
                    .and_then(|h| self.rules.classify(h))
                    .map(|rule| rule.label)
                    .unwrap_or(RetailerLabel::Unknown);
                ExtractedLink::new(target.as_str(), label)
            }
            _ => {
                self.observer.link_expanded(&link.url, None);
                link
            }
        }
    }
}

/// Keep the top `cap` entries of a ranked table; `None` keeps everything
pub fn apply_cap(mut ranked: Vec<RankedEntry>, cap: Option<usize>) -> Vec<RankedEntry> {
    if let Some(cap) = cap {
        ranked.truncate(cap);
    }
    ranked
}
