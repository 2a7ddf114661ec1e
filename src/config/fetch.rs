//! HTTP fetch configuration for title lookups and short link expansion

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::DEFAULT_USER_AGENT;
use crate::titles::FetchConfig;

/// HTTP fetch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    /// Whole-request timeout (seconds)
    pub timeout_secs: u64,
    /// Connection timeout (seconds)
    pub connect_timeout_secs: u64,
    /// User agent string
    pub user_agent: String,
    /// Maximum redirects to follow
    pub max_redirects: usize,
    /// Maximum response size (bytes)
    pub max_content_size: usize,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            connect_timeout_secs: 5,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_redirects: 10,
            max_content_size: 5 * 1024 * 1024,
        }
    }
}

impl FetchSettings {
    /// Runtime fetcher configuration
    pub fn to_fetch_config(&self) -> FetchConfig {
        FetchConfig {
            user_agent: self.user_agent.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            max_content_size: self.max_content_size,
            max_redirects: self.max_redirects,
        }
    }
}
