//! Report building and export configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Report configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Fetch titles for ranked products
    pub resolve_titles: bool,
    /// Only the top N products are titled and exported (unset = all)
    pub max_titles: Option<usize>,
    /// Minimum spacing between title requests (milliseconds)
    pub politeness_delay_ms: u64,
    /// Directory CSV reports are written to
    pub output_dir: PathBuf,
    /// File name prefix, followed by a timestamp
    pub file_prefix: String,
    /// Prefix the CSV with a UTF-8 byte order mark
    pub write_bom: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            resolve_titles: true,
            max_titles: None,
            politeness_delay_ms: 1200,
            output_dir: PathBuf::from("csv"),
            file_prefix: "product_ranking".to_string(),
            write_bom: true,
        }
    }
}

impl ReportConfig {
    pub fn politeness_delay(&self) -> Duration {
        Duration::from_millis(self.politeness_delay_ms)
    }
}
