//! Affiliate link extraction and normalization
//!
//! Turns post text into countable product keys:
//! - `LinkExtractor`: finds retailer URLs in free text
//! - `Normalizer`: collapses URL variants into `retailer:identifier` keys
//! - `RuleSet`: the ordered retailer table both of them consult

pub mod extractor;
pub mod normalizer;
pub mod rules;

pub use extractor::LinkExtractor;
pub use normalizer::Normalizer;
pub use rules::{IdentifierRule, RetailerRule, RuleSet, WrapperRule};
