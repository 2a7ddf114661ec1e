//! Link extraction configuration

use serde::{Deserialize, Serialize};

use crate::extraction::RuleSet;

/// Link extraction configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Extra affiliate hosts to collect; their links are counted by raw URL
    pub extra_hosts: Vec<String>,
    /// Follow redirects of shortened links (amzn.to, a.r10.to) before normalizing
    pub expand_short_links: bool,
}

impl ExtractionConfig {
    /// Retailer table with the configured extra hosts appended
    pub fn rule_set(&self) -> RuleSet {
        RuleSet::with_extra_hosts(&self.extra_hosts)
    }
}
