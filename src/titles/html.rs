//! Title extraction from product page HTML

use scraper::{Html, Selector};

/// Where a title came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleOrigin {
    OpenGraph,
    TitleTag,
}

/// Extract the display title of a page.
///
/// Prefers a non-empty `og:title` meta tag, then the `<title>` element.
/// Both are trimmed of surrounding whitespace; empty values count as missing.
pub fn extract_title(html: &str) -> Option<(String, TitleOrigin)> {
    let document = Html::parse_document(html);

    if let Some(title) = og_title(&document) {
        return Some((title, TitleOrigin::OpenGraph));
    }

    title_tag(&document).map(|title| (title, TitleOrigin::TitleTag))
}

fn og_title(document: &Html) -> Option<String> {
    // Some retailers use name= instead of property= for OpenGraph tags
    let selector = Selector::parse(r#"meta[property="og:title"], meta[name="og:title"]"#).ok()?;
    document
        .select(&selector)
        .filter_map(|elem| elem.value().attr("content"))
        .map(|content| content.trim().to_string())
        .find(|content| !content.is_empty())
}

fn title_tag(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    let elem = document.select(&selector).next()?;
    let title = elem.text().collect::<String>().trim().to_string();
    (!title.is_empty()).then_some(title)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_og_title_preferred() {
        let html = r#"
            <html><head>
                <title>Fallback Title</title>
                <meta property="og:title" content="  OG Product Name ">
            </head></html>
        "#;
        assert_eq!(
            extract_title(html),
            Some(("OG Product Name".to_string(), TitleOrigin::OpenGraph))
        );
    }

    #[test]
    fn test_title_tag_fallback_trimmed() {
        let html = "<html><head><title>\n   Amazon.co.jp: 商品名   \n</title></head><body></body></html>";
        assert_eq!(
            extract_title(html),
            Some(("Amazon.co.jp: 商品名".to_string(), TitleOrigin::TitleTag))
        );
    }

    #[test]
    fn test_empty_og_title_falls_back() {
        let html = r#"<head><meta property="og:title" content="   "><title>Real</title></head>"#;
        assert_eq!(
            extract_title(html),
            Some(("Real".to_string(), TitleOrigin::TitleTag))
        );
    }

    #[test]
    fn test_no_title() {
        assert_eq!(extract_title("<html><head></head><body><h1>x</h1></body></html>"), None);
        assert_eq!(extract_title("<title>   </title>"), None);
        assert_eq!(extract_title(""), None);
    }
}
