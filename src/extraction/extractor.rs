//! Link extraction from free-form post text

use regex::Regex;
use std::sync::OnceLock;
use url::Url;

use super::rules::RuleSet;
use crate::observer::{self, SharedObserver};
use crate::types::ExtractedLink;

/// A URL runs until whitespace, a quote or a bracket. Non-ASCII path text
/// (product slugs) stays part of the URL.
const URL_PATTERN: &str = r#"(?i)https?://[^\s'"()<>「」『』（）【】]+"#;

/// Sentence punctuation stripped from the end of a candidate
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', '。', '、', '！', '？'];

fn url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(URL_PATTERN).expect("URL pattern is a valid regex"))
}

/// Finds retailer links in post text
pub struct LinkExtractor {
    rules: RuleSet,
    observer: SharedObserver,
}

impl Default for LinkExtractor {
    fn default() -> Self {
        Self::new(RuleSet::default())
    }
}

impl LinkExtractor {
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules,
            observer: observer::noop(),
        }
    }

    pub fn with_observer(mut self, observer: SharedObserver) -> Self {
        self.observer = observer;
        self
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Extract every retailer link from `text` in order of appearance.
    ///
    /// Duplicates are kept. Text without retailer links yields an empty vec.
    pub fn extract(&self, text: &str) -> Vec<ExtractedLink> {
        let links: Vec<ExtractedLink> = url_regex()
            .find_iter(text)
            .filter_map(|m| {
                let candidate = m.as_str().trim_end_matches(TRAILING_PUNCTUATION);
                let parsed = Url::parse(candidate).ok()?;
                let rule = self.rules.classify(parsed.host_str()?)?;
                Some(ExtractedLink::new(candidate, rule.label))
            })
            .collect();

        self.observer.links_extracted(text, &links);
        links
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RetailerLabel;

    #[test]
    fn test_no_links() {
        let extractor = LinkExtractor::default();
        assert!(extractor.extract("").is_empty());
        assert!(extractor.extract("nothing relevant here").is_empty());
        assert!(extractor
            .extract("see https://example.com/dp/B000111222 instead")
            .is_empty());
    }

    #[test]
    fn test_order_and_duplicates_preserved() {
        let extractor = LinkExtractor::default();
        let text = "A https://item.rakuten.co.jp/shop/item1/ \
                    B https://www.amazon.co.jp/dp/B000111222 \
                    C https://item.rakuten.co.jp/shop/item1/";
        let links = extractor.extract(text);

        assert_eq!(
            links,
            vec![
                ExtractedLink::new("https://item.rakuten.co.jp/shop/item1/", RetailerLabel::Rakuten),
                ExtractedLink::new("https://www.amazon.co.jp/dp/B000111222", RetailerLabel::Amazon),
                ExtractedLink::new("https://item.rakuten.co.jp/shop/item1/", RetailerLabel::Rakuten),
            ]
        );
    }

    #[test]
    fn test_url_boundaries() {
        let extractor = LinkExtractor::default();
        let text = "おすすめ→https://www.amazon.co.jp/dp/B000111222 です！\n\
                    (https://paypaymall.yahoo.co.jp/store/s/item/x1/) \
                    \"https://amzn.to/3AbCdEf\". end https://shopping.yahoo.co.jp/s/item/y2?sc=ig.";
        let urls: Vec<String> = extractor.extract(text).into_iter().map(|l| l.url).collect();

        assert_eq!(
            urls,
            vec![
                "https://www.amazon.co.jp/dp/B000111222",
                "https://paypaymall.yahoo.co.jp/store/s/item/x1/",
                "https://amzn.to/3AbCdEf",
                "https://shopping.yahoo.co.jp/s/item/y2?sc=ig",
            ]
        );
    }

    #[test]
    fn test_non_ascii_path_kept() {
        let extractor = LinkExtractor::default();
        let text = "バッグ https://www.amazon.co.jp/トートバッグ/dp/B000111222 おすすめ\n\
                    「https://item.rakuten.co.jp/shop-a/財布-01/」。\n\
                    靴 https://www.amazon.co.jp/dp/B0C1234567です。";
        let urls: Vec<String> = extractor.extract(text).into_iter().map(|l| l.url).collect();

        assert_eq!(
            urls,
            vec![
                "https://www.amazon.co.jp/トートバッグ/dp/B000111222",
                "https://item.rakuten.co.jp/shop-a/財布-01/",
                "https://www.amazon.co.jp/dp/B0C1234567です",
            ]
        );
    }

    #[test]
    fn test_host_lookalikes_rejected() {
        let extractor = LinkExtractor::default();
        let text = "https://amazon.co.jp.evil.example/dp/B000111222 \
                    https://notamazon.co.jp/dp/B000111222";
        assert!(extractor.extract(text).is_empty());
    }

    #[test]
    fn test_mixed_case_host() {
        let extractor = LinkExtractor::default();
        let links = extractor.extract("HTTPS://WWW.AMAZON.CO.JP/dp/B000111222");
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].label, RetailerLabel::Amazon);
        assert_eq!(links[0].url, "HTTPS://WWW.AMAZON.CO.JP/dp/B000111222");
    }

    #[test]
    fn test_extra_hosts_are_unknown() {
        let extractor = LinkExtractor::new(RuleSet::with_extra_hosts(["ltk.app"]));
        let links = extractor.extract("shop my look https://ltk.app/p/123 today");
        assert_eq!(
            links,
            vec![ExtractedLink::new("https://ltk.app/p/123", RetailerLabel::Unknown)]
        );
    }
}
