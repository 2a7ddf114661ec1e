//! Best-guess charset detection for fetched HTML
//!
//! Japanese retail pages are often served as Shift_JIS or EUC-JP with a
//! missing or wrong `charset`. A declared encoding is only trusted when it
//! decodes the body without errors; otherwise the candidates below are tried
//! in order and the first clean decode wins.

use encoding_rs::{Encoding, EUC_JP, SHIFT_JIS, UTF_8};

/// How far into the body to look for a `<meta charset>` declaration
const META_SNIFF_BYTES: usize = 2048;

/// Decode an HTML body, returning the text and the encoding used
pub fn decode_html(bytes: &[u8], content_type: Option<&str>) -> (String, &'static Encoding) {
    let declared = content_type.and_then(charset_from_content_type);
    let meta = sniff_meta_charset(bytes);

    let candidates = declared
        .into_iter()
        .chain(meta)
        .chain([UTF_8, SHIFT_JIS, EUC_JP]);

    for encoding in candidates {
        if let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(strip_bom(bytes, encoding)) {
            return (text.into_owned(), encoding);
        }
    }

    let (text, _) = UTF_8.decode_with_bom_removal(bytes);
    (text.into_owned(), UTF_8)
}

fn strip_bom<'a>(bytes: &'a [u8], encoding: &'static Encoding) -> &'a [u8] {
    match Encoding::for_bom(bytes) {
        Some((bom_encoding, len)) if bom_encoding == encoding => &bytes[len..],
        _ => bytes,
    }
}

/// Extract the `charset=` parameter from a Content-Type header
fn charset_from_content_type(content_type: &str) -> Option<&'static Encoding> {
    content_type
        .split(';')
        .filter_map(|param| param.split_once('='))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("charset"))
        .and_then(|(_, value)| Encoding::for_label(value.trim().trim_matches('"').as_bytes()))
}

/// Look for `charset=...` inside the first bytes of the document.
///
/// Covers both `<meta charset="x">` and the `http-equiv` form, whose
/// `content` attribute carries a Content-Type value.
fn sniff_meta_charset(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = &bytes[..bytes.len().min(META_SNIFF_BYTES)];
    let head = String::from_utf8_lossy(head).to_ascii_lowercase();

    let mut rest = head.as_str();
    while let Some(pos) = rest.find("charset") {
        rest = &rest[pos + "charset".len()..];
        let value = rest.trim_start();
        let Some(value) = value.strip_prefix('=') else {
            continue;
        };
        let label: String = value
            .trim_start()
            .trim_start_matches(['"', '\''])
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
            .collect();
        if let Some(encoding) = Encoding::for_label(label.as_bytes()) {
            return Some(encoding);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_utf8() {
        let (text, enc) = decode_html("<title>商品</title>".as_bytes(), None);
        assert_eq!(text, "<title>商品</title>");
        assert_eq!(enc, UTF_8);
    }

    #[test]
    fn test_undeclared_shift_jis() {
        let (bytes, _, _) = SHIFT_JIS.encode("<title>楽天市場の商品</title>");
        let (text, enc) = decode_html(&bytes, Some("text/html"));
        assert_eq!(text, "<title>楽天市場の商品</title>");
        assert_eq!(enc, SHIFT_JIS);
    }

    #[test]
    fn test_misdeclared_charset_ignored() {
        // Header claims UTF-8 but the bytes are EUC-JP
        let html = "<html><head><meta charset=\"EUC-JP\"><title>ヤフー商品</title></head></html>";
        let (bytes, _, _) = EUC_JP.encode(html);
        let (text, enc) = decode_html(&bytes, Some("text/html; charset=utf-8"));
        assert_eq!(text, html);
        assert_eq!(enc, EUC_JP);
    }

    #[test]
    fn test_http_equiv_meta() {
        let html = r#"<meta http-equiv="Content-Type" content="text/html; charset=Shift_JIS">"#;
        assert_eq!(sniff_meta_charset(html.as_bytes()), Some(SHIFT_JIS));
    }

    #[test]
    fn test_charset_from_header() {
        assert_eq!(
            charset_from_content_type("text/html; charset=\"EUC-JP\""),
            Some(EUC_JP)
        );
        assert_eq!(charset_from_content_type("text/html"), None);
    }

    #[test]
    fn test_utf8_bom_removed() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("<title>x</title>".as_bytes());
        let (text, _) = decode_html(&bytes, None);
        assert_eq!(text, "<title>x</title>");
    }
}
