//! affirank: rank retailer products by how often creators link to them
//!
//! Post text goes through four stages:
//! - link extraction for known retailer hosts (Amazon, Rakuten, Yahoo Shopping)
//! - normalization to `retailer:identifier` keys
//! - aggregation into a table ranked by mention count
//! - title resolution over HTTP, joined into a report exported as CSV

pub mod aggregate;
pub mod config;
pub mod extraction;
pub mod input;
pub mod observer;
pub mod pipeline;
pub mod report;
pub mod titles;
pub mod types;
pub mod util;

pub use aggregate::{aggregate, aggregate_strs, Tally};
pub use config::Config;
pub use extraction::{LinkExtractor, Normalizer, RuleSet};
pub use observer::{PipelineObserver, SharedObserver, TracingObserver};
pub use pipeline::{apply_cap, Pipeline};
pub use report::{CsvExporter, Report, ReportBuilder};
pub use titles::{TitleLookup, TitleResolver};
pub use types::*;
