//! Configuration for affirank

mod extraction;
mod fetch;
mod logging;
mod report;

pub use extraction::ExtractionConfig;
pub use fetch::FetchSettings;
pub use logging::{LogFormat, LogLevel, LoggingConfig};
pub use report::ReportConfig;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default user agent for all HTTP requests
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; affirank/0.1; +https://github.com/affirank/affirank)";

/// Default config file name
pub const DEFAULT_CONFIG_FILE: &str = "affirank.toml";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP fetch configuration
    #[serde(default)]
    pub fetch: FetchSettings,
    /// Link extraction configuration
    #[serde(default)]
    pub extraction: ExtractionConfig,
    /// Report configuration
    #[serde(default)]
    pub report: ReportConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file and validate it
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("Failed to load config file '{}'", path.display()))?;
        Ok(config)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Invalid TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Serialize to TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    /// Validate all configuration fields.
    ///
    /// Collects every error and reports them together.
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        // Fetch validation
        if self.fetch.timeout_secs == 0 {
            errors.push("fetch.timeout_secs must be positive".to_string());
        }
        if self.fetch.connect_timeout_secs == 0 {
            errors.push("fetch.connect_timeout_secs must be positive".to_string());
        }
        if self.fetch.user_agent.trim().is_empty() {
            errors.push("fetch.user_agent must not be empty".to_string());
        }
        if self.fetch.max_redirects == 0 {
            errors.push("fetch.max_redirects must be positive".to_string());
        }
        if self.fetch.max_content_size == 0 {
            errors.push("fetch.max_content_size must be positive".to_string());
        }

        // Extraction validation
        for host in &self.extraction.extra_hosts {
            if host.trim().is_empty() || host.contains('/') || host.contains(char::is_whitespace) {
                errors.push(format!(
                    "extraction.extra_hosts entry {:?} must be a bare host name",
                    host
                ));
            }
        }

        // Report validation
        if self.report.max_titles == Some(0) {
            errors.push("report.max_titles must be positive (omit it for no limit)".to_string());
        }
        if self.report.output_dir.as_os_str().is_empty() {
            errors.push("report.output_dir must not be empty".to_string());
        }
        if self.report.file_prefix.trim().is_empty() {
            errors.push("report.file_prefix must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            anyhow::bail!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            );
        }
    }
}
