//! Mapping raw retailer URLs to canonical product keys

use url::Url;

use super::rules::{RetailerRule, RuleSet};
use crate::observer::{self, SharedObserver};
use crate::types::{ExtractedLink, ProductKey, RetailerLabel};

/// Maps raw URLs to `retailer:identifier` keys.
///
/// Anything without a recognizable identifier comes back as the raw URL,
/// so normalizing an unrecognized string is a fixed point.
pub struct Normalizer {
    rules: RuleSet,
    observer: SharedObserver,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(RuleSet::default())
    }
}

impl Normalizer {
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

    /// Normalize `url` using the rule for `label`.
    ///
    /// With `RetailerLabel::Unknown` the host picks the rule instead.
    pub fn normalize(&self, url: &str, label: RetailerLabel) -> ProductKey {
        self.identify(url, label)
            .map(|(label, id)| ProductKey::canonical(label, &id))
            .unwrap_or_else(|| ProductKey::passthrough(url))
    }

    /// Normalize an extracted link and report it to the observer
    pub fn normalize_link(&self, link: &ExtractedLink) -> ProductKey {
        let key = self.normalize(&link.url, link.label);
        self.observer.link_normalized(link, &key);
        key
    }

    fn identify(&self, url: &str, label: RetailerLabel) -> Option<(RetailerLabel, String)> {
        let parsed = Url::parse(url).ok()?;
        let rule = self.rule_for(&parsed, label)?;
        Self::identify_with(rule, &parsed).map(|id| (rule.label, id))
    }

    fn rule_for(&self, url: &Url, label: RetailerLabel) -> Option<&RetailerRule> {
        match label {
            RetailerLabel::Unknown => self.rules.classify(url.host_str()?),
            known => self.rules.rule_for(known),
        }
    }

    fn identify_with(rule: &RetailerRule, url: &Url) -> Option<String> {
        if let Some(wrapper) = &rule.wrapper {
            if wrapper.is_wrapper_host(url.host_str().unwrap_or_default()) {
                // A wrapper path is never a product path; only the wrapped URL counts.
                let inner = wrapper.unwrap(url)?;
                if !rule.matches_host(inner.host_str()?) {
                    return None;
                }
                return rule.identifier.identify(&inner);
            }
        }
        rule.identifier.identify(url)
    }
}
