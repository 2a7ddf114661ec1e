//! Product title enrichment
//!
//! - `PageFetcher`: reqwest client with bounded timeout, redirects and size
//! - `encoding`: charset sniffing for mis-declared pages
//! - `html`: `og:title` → `<title>` extraction
//! - `TitleResolver`: key/URL → title string with sentinel fallbacks
//! - `Pacer`: minimum spacing between consecutive requests

pub mod encoding;
pub mod fetcher;
pub mod html;
pub mod politeness;
pub mod resolver;

pub use fetcher::{FetchConfig, FetchError, FetchedPage, PageFetcher};
pub use html::{extract_title, TitleOrigin};
pub use politeness::{PaceDecision, Pacer};
pub use resolver::{
    product_page_url, TitleLookup, TitleOutcome, TitleResolver, TITLE_FETCH_ERROR,
    TITLE_SKIPPED, TITLE_UNAVAILABLE, TITLE_UNKNOWN,
};
