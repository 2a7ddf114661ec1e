//! Core types for the affiliate ranking pipeline

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A URL exactly as it appeared in post text
pub type RawUrl = String;

// ============================================================================
// Retailer Labels
// ============================================================================

/// Which retailer rule recognized a URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetailerLabel {
    Amazon,
    Rakuten,
    Yahoo,
    Unknown,
}

impl RetailerLabel {
    /// Prefix used in canonical product keys
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Amazon => "amazon",
            Self::Rakuten => "rakuten",
            Self::Yahoo => "yahoo",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for RetailerLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Product Keys
// ============================================================================

/// Errors raised when a string cannot be used as a product key
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("product key at position {position} is empty")]
    Empty { position: usize },
    #[error("product key at position {position} contains whitespace: {key:?}")]
    Whitespace { position: usize, key: String },
}

/// Canonical aggregation key: `retailer:identifier`, or a raw URL verbatim
/// when no canonical form was recognized.
///
/// Equality is exact string equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductKey(String);

impl ProductKey {
    /// Build a canonical key from a retailer and its stable identifier
    pub fn canonical(label: RetailerLabel, identifier: &str) -> Self {
        ProductKey(format!("{}:{}", label.as_str(), identifier))
    }

    /// Use a raw URL as its own key
    pub fn passthrough(url: impl Into<String>) -> Self {
        ProductKey(url.into())
    }

    /// Validate an externally supplied key string.
    ///
    /// `position` is the index in the caller's sequence, used for error reporting.
    pub fn parse(raw: &str, position: usize) -> Result<Self, KeyError> {
        if raw.is_empty() {
            return Err(KeyError::Empty { position });
        }
        if raw.chars().any(char::is_whitespace) {
            return Err(KeyError::Whitespace {
                position,
                key: raw.to_string(),
            });
        }
        Ok(ProductKey(raw.to_string()))
    }

    /// Get the underlying string value
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split into `(retailer, identifier)` when this is a canonical key.
    ///
    /// Raw-URL keys return `None` even though they contain a colon.
    pub fn retailer_parts(&self) -> Option<(RetailerLabel, &str)> {
        let (prefix, identifier) = self.0.split_once(':')?;
        let label = match prefix {
            "amazon" => RetailerLabel::Amazon,
            "rakuten" => RetailerLabel::Rakuten,
            "yahoo" => RetailerLabel::Yahoo,
            _ => return None,
        };
        if identifier.is_empty() || identifier.starts_with("//") {
            return None;
        }
        Some((label, identifier))
    }

    /// Whether this key fell back to the raw URL
    pub fn is_passthrough(&self) -> bool {
        self.retailer_parts().is_none()
    }
}

impl fmt::Display for ProductKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ProductKey> for String {
    fn from(key: ProductKey) -> Self {
        key.0
    }
}

impl AsRef<str> for ProductKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// Extraction Output
// ============================================================================

/// A URL found in post text together with the rule that matched it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedLink {
    pub url: RawUrl,
    pub label: RetailerLabel,
}

impl ExtractedLink {
    pub fn new(url: impl Into<String>, label: RetailerLabel) -> Self {
        Self {
            url: url.into(),
            label,
        }
    }
}

// ============================================================================
// Ranked Table
// ============================================================================

/// One row of the ranked table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedEntry {
    /// Aggregation key
    pub key: ProductKey,
    /// Number of occurrences, always >= 1
    pub count: usize,
    /// First raw URL seen for this key, if the caller supplied one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<RawUrl>,
}

impl RankedEntry {
    pub fn new(key: ProductKey, count: usize) -> Self {
        Self {
            key,
            count,
            source_url: None,
        }
    }

    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }
}

/// A ranked row with its display title.
///
/// Field order matches the exported report: title, count, key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitledEntry {
    pub title: String,
    pub count: usize,
    pub key: ProductKey,
}

// ============================================================================
// Input
// ============================================================================

/// A single post as delivered by the crawl collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostText {
    /// Permalink of the post, when known
    #[serde(default)]
    pub url: Option<String>,
    /// Body text of the post
    pub text: String,
}

impl PostText {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            url: None,
            text: text.into(),
        }
    }
}
