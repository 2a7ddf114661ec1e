//! Retailer rule table
//!
//! Each retailer is one `RetailerRule` value: the label it assigns, the hosts
//! it recognizes, and how a stable product identifier is read from a URL.
//! Adding a retailer means adding a row, not touching existing rules.

use url::Url;

use crate::types::RetailerLabel;

/// How the product identifier is located inside a recognized URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierRule {
    /// 10-character ASIN after `/dp/`, `/gp/product/` or `/gp/aw/d/`
    AmazonAsin,
    /// The first two path segments, `{shop}/{item}`
    ShopItemPair,
    /// The segment following an `item` path component
    ItemSegment,
    /// No identifier; the raw URL is its own key
    Passthrough,
}

impl IdentifierRule {
    /// Read the identifier from a parsed URL, ignoring query and fragment
    pub fn identify(&self, url: &Url) -> Option<String> {
        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();

        match self {
            Self::AmazonAsin => amazon_asin(&segments),
            Self::ShopItemPair => match segments.as_slice() {
                [shop, item, ..] => Some(format!("{}/{}", shop, item)),
                _ => None,
            },
            Self::ItemSegment => item_segment(&segments),
            Self::Passthrough => None,
        }
    }
}

fn is_asin_byte(b: u8) -> bool {
    b.is_ascii_uppercase() || b.is_ascii_digit()
}

/// Leading ASIN of a path segment: ten `[A-Z0-9]` characters not followed by
/// an eleventh. Trailing junk glued onto the segment (`&tag=...`, Japanese
/// text) is ignored.
fn leading_asin(segment: &str) -> Option<&str> {
    let bytes = segment.as_bytes();
    if bytes.len() < 10 || !bytes[..10].iter().all(|&b| is_asin_byte(b)) {
        return None;
    }
    let next = match bytes.get(10) {
        None => return Some(&segment[..10]),
        // segments arrive percent-encoded; look at the decoded character
        Some(b'%') => segment.get(11..13).and_then(|hex| u8::from_str_radix(hex, 16).ok()),
        Some(&b) => Some(b),
    };
    match next {
        Some(b) if is_asin_byte(b) => None,
        _ => Some(&segment[..10]),
    }
}

fn amazon_asin(segments: &[&str]) -> Option<String> {
    for (i, segment) in segments.iter().enumerate() {
        let candidate = match *segment {
            "dp" => segments.get(i + 1),
            "product" if i > 0 && segments[i - 1] == "gp" => segments.get(i + 1),
            "d" if i > 1 && segments[i - 1] == "aw" && segments[i - 2] == "gp" => {
                segments.get(i + 1)
            }
            _ => None,
        };
        if let Some(asin) = candidate.and_then(|c| leading_asin(c)) {
            return Some(asin.to_string());
        }
    }
    None
}

fn identifier_prefix(segment: &str) -> Option<&str> {
    let end = segment
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        .unwrap_or(segment.len());
    let id = &segment[..end];
    (!id.is_empty()).then_some(id)
}

fn item_segment(segments: &[&str]) -> Option<String> {
    if let Some(pos) = segments.iter().position(|s| *s == "item") {
        if let Some(id) = segments.get(pos + 1).and_then(|s| identifier_prefix(s)) {
            return Some(id.to_string());
        }
    }

    // Store pages: /{store}/{item}.html
    if let [_store, page] = segments {
        if let Some(stem) = page.strip_suffix(".html") {
            if let Some(id) = identifier_prefix(stem).filter(|id| id.len() == stem.len()) {
                return Some(id.to_string());
            }
        }
    }

    None
}

/// Affiliate redirect hosts that carry the real product URL in a query parameter
#[derive(Debug, Clone)]
pub struct WrapperRule {
    pub hosts: Vec<String>,
    pub params: Vec<String>,
}

impl WrapperRule {
    /// Pull the wrapped product URL out of a wrapper link
    pub fn unwrap(&self, url: &Url) -> Option<Url> {
        let host = url.host_str()?;
        if !self.hosts.iter().any(|h| h == host) {
            return None;
        }
        url.query_pairs()
            .filter(|(k, _)| self.params.iter().any(|p| p == k.as_ref()))
            .find_map(|(_, v)| Url::parse(&v).ok())
    }

    pub fn is_wrapper_host(&self, host: &str) -> bool {
        self.hosts.iter().any(|h| h == host)
    }
}

/// One row of the retailer table
#[derive(Debug, Clone)]
pub struct RetailerRule {
    pub label: RetailerLabel,
    /// Lowercase host names recognized by this rule
    pub hosts: Vec<String>,
    /// Subset of `hosts` that are link shorteners
    pub short_hosts: Vec<String>,
    pub identifier: IdentifierRule,
    pub wrapper: Option<WrapperRule>,
}

impl RetailerRule {
    fn new(label: RetailerLabel, hosts: &[&str], identifier: IdentifierRule) -> Self {
        Self {
            label,
            hosts: hosts.iter().map(|h| h.to_string()).collect(),
            short_hosts: Vec::new(),
            identifier,
            wrapper: None,
        }
    }

    fn with_short_hosts(mut self, hosts: &[&str]) -> Self {
        for host in hosts {
            self.hosts.push(host.to_string());
            self.short_hosts.push(host.to_string());
        }
        self
    }

    fn with_wrapper(mut self, hosts: &[&str], params: &[&str]) -> Self {
        for host in hosts {
            self.hosts.push(host.to_string());
        }
        self.wrapper = Some(WrapperRule {
            hosts: hosts.iter().map(|h| h.to_string()).collect(),
            params: params.iter().map(|p| p.to_string()).collect(),
        });
        self
    }

    /// Case-insensitive host match
    pub fn matches_host(&self, host: &str) -> bool {
        let host = host.to_ascii_lowercase();
        self.hosts.iter().any(|h| *h == host)
    }

    pub fn is_short_host(&self, host: &str) -> bool {
        let host = host.to_ascii_lowercase();
        self.short_hosts.iter().any(|h| *h == host)
    }
}

/// Ordered retailer table. Earlier rules win when hosts overlap.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<RetailerRule>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            rules: vec![
                RetailerRule::new(
                    RetailerLabel::Amazon,
                    &["amazon.co.jp", "www.amazon.co.jp"],
                    IdentifierRule::AmazonAsin,
                )
                .with_short_hosts(&["amzn.to", "amzn.asia"]),
                RetailerRule::new(
                    RetailerLabel::Rakuten,
                    &["item.rakuten.co.jp", "a.rakuten.co.jp"],
                    IdentifierRule::ShopItemPair,
                )
                .with_short_hosts(&["a.r10.to"])
                .with_wrapper(&["hb.afl.rakuten.co.jp"], &["pc", "m"]),
                RetailerRule::new(
                    RetailerLabel::Yahoo,
                    &[
                        "shopping.yahoo.co.jp",
                        "store.shopping.yahoo.co.jp",
                        "paypaymall.yahoo.co.jp",
                    ],
                    IdentifierRule::ItemSegment,
                ),
            ],
        }
    }
}

impl RuleSet {
    /// Built-in retailers plus extra affiliate hosts that are counted as raw URLs
    pub fn with_extra_hosts<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::default();
        let hosts: Vec<String> = extra
            .into_iter()
            .map(|h| h.as_ref().trim().to_ascii_lowercase())
            .filter(|h| !h.is_empty())
            .collect();
        if !hosts.is_empty() {
            set.push(RetailerRule {
                label: RetailerLabel::Unknown,
                hosts,
                short_hosts: Vec::new(),
                identifier: IdentifierRule::Passthrough,
                wrapper: None,
            });
        }
        set
    }

    /// Append a rule at the lowest priority
    pub fn push(&mut self, rule: RetailerRule) {
        self.rules.push(rule);
    }

    /// First rule whose host set contains `host`
    pub fn classify(&self, host: &str) -> Option<&RetailerRule> {
        self.rules.iter().find(|r| r.matches_host(host))
    }

    /// First rule carrying `label`
    pub fn rule_for(&self, label: RetailerLabel) -> Option<&RetailerRule> {
        self.rules.iter().find(|r| r.label == label)
    }

    /// Whether `host` is a known link shortener
    pub fn is_short_host(&self, host: &str) -> bool {
        self.rules.iter().any(|r| r.is_short_host(host))
    }

    pub fn rules(&self) -> &[RetailerRule] {
        &self.rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(rule: IdentifierRule, url: &str) -> Option<String> {
        rule.identify(&Url::parse(url).unwrap())
    }

    #[test]
    fn test_amazon_asin_paths() {
        let rule = IdentifierRule::AmazonAsin;
        assert_eq!(
            id(rule, "https://www.amazon.co.jp/dp/B000111222").as_deref(),
            Some("B000111222")
        );
        assert_eq!(
            id(rule, "https://www.amazon.co.jp/Some-Product/dp/B0C1234567/ref=sr_1_1").as_deref(),
            Some("B0C1234567")
        );
        assert_eq!(
            id(rule, "https://www.amazon.co.jp/gp/aw/d/B0C1234567").as_deref(),
            Some("B0C1234567")
        );
        // lowercase is not an ASIN
        assert_eq!(id(rule, "https://www.amazon.co.jp/dp/b0c1234567"), None);
        // an eleventh identifier character means it is not an ASIN
        assert_eq!(id(rule, "https://www.amazon.co.jp/dp/B000111222X"), None);
        assert_eq!(id(rule, "https://www.amazon.co.jp/dp/B000111222%41"), None);
        assert_eq!(id(rule, "https://www.amazon.co.jp/dp/B00011122"), None);
        // product without gp is not a product path
        assert_eq!(id(rule, "https://www.amazon.co.jp/product/B0C1234567"), None);
    }

    #[test]
    fn test_amazon_asin_with_glued_suffix() {
        let rule = IdentifierRule::AmazonAsin;
        assert_eq!(
            id(rule, "https://www.amazon.co.jp/dp/B000111222&tag=x-22").as_deref(),
            Some("B000111222")
        );
        assert_eq!(
            id(rule, "https://www.amazon.co.jp/dp/B000111222です").as_deref(),
            Some("B000111222")
        );
        assert_eq!(
            id(rule, "https://www.amazon.co.jp/dp/B000111222-red").as_deref(),
            Some("B000111222")
        );
    }

    #[test]
    fn test_shop_item_pair() {
        let rule = IdentifierRule::ShopItemPair;
        assert_eq!(
            id(rule, "https://item.rakuten.co.jp/shop-a/item-01/?scid=af").as_deref(),
            Some("shop-a/item-01")
        );
        assert_eq!(id(rule, "https://item.rakuten.co.jp/shop-a/"), None);
    }

    #[test]
    fn test_item_segment() {
        let rule = IdentifierRule::ItemSegment;
        assert_eq!(
            id(rule, "https://paypaymall.yahoo.co.jp/store/shop1/item/abc-123/").as_deref(),
            Some("abc-123")
        );
        assert_eq!(
            id(rule, "https://store.shopping.yahoo.co.jp/shop1/xyz_9.html").as_deref(),
            Some("xyz_9")
        );
        assert_eq!(id(rule, "https://shopping.yahoo.co.jp/search?p=x"), None);
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        let rules = RuleSet::default();
        assert_eq!(
            rules.classify("WWW.Amazon.CO.JP").map(|r| r.label),
            Some(RetailerLabel::Amazon)
        );
        assert_eq!(
            rules.classify("hb.afl.rakuten.co.jp").map(|r| r.label),
            Some(RetailerLabel::Rakuten)
        );
        assert!(rules.classify("example.com").is_none());
        assert!(rules.is_short_host("amzn.to"));
        assert!(!rules.is_short_host("www.amazon.co.jp"));
    }

    #[test]
    fn test_extra_hosts_rank_last() {
        let rules = RuleSet::with_extra_hosts(["LTK.app", " ", "amzn.to"]);
        assert_eq!(
            rules.classify("ltk.app").map(|r| r.label),
            Some(RetailerLabel::Unknown)
        );
        // built-in rule keeps priority over a duplicate extra host
        assert_eq!(
            rules.classify("amzn.to").map(|r| r.label),
            Some(RetailerLabel::Amazon)
        );
    }

    #[test]
    fn test_wrapper_unwrap() {
        let rules = RuleSet::default();
        let wrapper = rules
            .rule_for(RetailerLabel::Rakuten)
            .and_then(|r| r.wrapper.as_ref())
            .unwrap();
        let url = Url::parse(
            "https://hb.afl.rakuten.co.jp/hgc/1a2b.3c4d/?pc=https%3A%2F%2Fitem.rakuten.co.jp%2Fshop%2Fitem1%2F&m=x",
        )
        .unwrap();
        assert_eq!(
            wrapper.unwrap(&url).map(|u| u.to_string()).as_deref(),
            Some("https://item.rakuten.co.jp/shop/item1/")
        );
    }
}
