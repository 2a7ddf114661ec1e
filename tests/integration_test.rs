//! Integration tests for affirank
//!
//! These tests run post text through the whole pipeline: extraction,
//! normalization, ranking, title lookup and CSV export.

use affirank::{
    config::Config,
    input::{parse_posts, InputFormat},
    pipeline::{apply_cap, Pipeline},
    report::{CsvExporter, ReportBuilder},
    titles::{FetchConfig, PageFetcher, TitleResolver, TITLE_UNAVAILABLE},
    RuleSet,
};
use chrono::{Local, TimeZone};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html_page(title: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("Content-Type", "text/html; charset=utf-8")
        .set_body_string(format!(
            "<html><head><title>{}</title></head><body></body></html>",
            title
        ))
}

#[test]
fn test_end_to_end_single_product() {
    let texts = [
        "buy here https://www.amazon.co.jp/dp/B000111222 now",
        "same https://www.amazon.co.jp/dp/B000111222?tag=y again",
        "nothing relevant",
    ];

    let ranked = Pipeline::default().rank(texts);
    let report = ReportBuilder::default().build(&ranked, |entry| format!("title of {}", entry.key));

    assert_eq!(report.len(), 1);
    let entry = &report.entries[0];
    assert_eq!(entry.key.as_str(), "amazon:B000111222");
    assert_eq!(entry.count, 2);
    assert_eq!(entry.title, "title of amazon:B000111222");
    assert!(!report.cancelled);
}

#[test]
fn test_mixed_retailers_rank_and_cap() {
    let dump = r#"{"url": "https://example.com/p/1", "text": "bag https://item.rakuten.co.jp/shopA/bag-01/?scid=af and https://www.amazon.co.jp/dp/B0C1234567"}
{"text": "again https://www.amazon.co.jp/gp/product/B0C1234567?tag=z-22"}

{"text": "https://store.shopping.yahoo.co.jp/shopB/item/XYZ9?sc_e=afvc https://item.rakuten.co.jp/shopA/bag-01"}
"#;
    let posts = parse_posts(dump, InputFormat::Jsonl).unwrap();
    assert_eq!(posts.len(), 3);

    let texts: Vec<&str> = posts.iter().map(|p| p.text.as_str()).collect();
    let ranked = Pipeline::default().rank(texts);
    let keys: Vec<(&str, usize)> = ranked.iter().map(|e| (e.key.as_str(), e.count)).collect();

    // rakuten and amazon tie at 2; rakuten was seen first
    assert_eq!(
        keys,
        vec![
            ("rakuten:shopA/bag-01", 2),
            ("amazon:B0C1234567", 2),
            ("yahoo:XYZ9", 1),
        ]
    );

    let capped = apply_cap(ranked, Some(2));
    assert_eq!(capped.len(), 2);
    assert!(capped.iter().all(|e| e.count == 2));
}

#[tokio::test]
async fn test_titles_and_csv_export() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/item/1"))
        .respond_with(html_page("  Canvas Tote  "))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/item/2"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    // Count the mock host as an extra affiliate host so its links are kept as raw URLs
    let host = url::Url::parse(&server.uri())
        .unwrap()
        .host_str()
        .unwrap()
        .to_string();
    let pipeline = Pipeline::new(RuleSet::with_extra_hosts([host]));
    let first = format!("{}/item/1", server.uri());
    let second = format!("{}/item/2", server.uri());
    let ranked = pipeline.rank([
        format!("tote {} !", first),
        format!("tote again {}", first),
        format!("other {}", second),
    ]);
    assert_eq!(ranked.len(), 2);

    let fetcher = PageFetcher::new(FetchConfig {
        timeout: Duration::from_secs(5),
        ..FetchConfig::default()
    })
    .unwrap();
    let resolver = TitleResolver::new(fetcher);
    let report = ReportBuilder::new(Duration::from_millis(10))
        .build_with(&ranked, &resolver)
        .await;

    assert_eq!(report.entries[0].title, "Canvas Tote");
    assert_eq!(report.entries[0].count, 2);
    assert_eq!(report.entries[1].title, TITLE_UNAVAILABLE);

    let tmp = TempDir::new().unwrap();
    let exporter = CsvExporter::new(tmp.path().join("csv"), "product_ranking");
    let stamp = Local.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
    let written = exporter.export(&report.entries, &stamp).unwrap();

    assert_eq!(
        written.file_name().unwrap().to_str().unwrap(),
        "product_ranking_20240501_093000.csv"
    );
    let content = std::fs::read_to_string(&written).unwrap();
    let content = content.trim_start_matches('\u{feff}');
    let mut lines = content.lines();
    assert_eq!(lines.next(), Some("title,count,key"));
    assert_eq!(lines.next(), Some(format!("Canvas Tote,2,{}", first).as_str()));
    assert_eq!(
        lines.next(),
        Some(format!("{},1,{}", TITLE_UNAVAILABLE, second).as_str())
    );
}

#[test]
fn test_config_drives_pipeline_rules() {
    let config = Config::from_toml("[extraction]\nextra_hosts = [\"ltk.app\"]\n").unwrap();
    let pipeline = Pipeline::from_config(&config, affirank::observer::noop()).unwrap();

    let ranked = pipeline.rank(["look https://ltk.app/product/abc123 and https://ltk.app/product/abc123"]);
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].key.as_str(), "https://ltk.app/product/abc123");
    assert_eq!(ranked[0].count, 2);
}
