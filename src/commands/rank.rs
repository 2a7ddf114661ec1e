use affirank::{
    config::Config,
    input::{read_posts, InputFormat},
    observer::{PipelineObserver, SharedObserver, TracingObserver},
    pipeline::{apply_cap, Pipeline},
    report::{CsvExporter, Report, ReportBuilder},
    titles::{FetchedPage, PageFetcher, TitleOutcome, TitleResolver},
    types::{ExtractedLink, ProductKey, RankedEntry},
    util::truncate_str,
};
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Command-line overrides for the `[report]` section
#[derive(Debug, Default)]
pub struct RankOptions {
    pub format: Option<InputFormat>,
    pub max_titles: Option<usize>,
    pub delay_ms: Option<u64>,
    pub no_titles: bool,
    pub output_dir: Option<PathBuf>,
}

impl RankOptions {
    fn apply(self, config: &mut Config) {
        if let Some(max) = self.max_titles {
            config.report.max_titles = Some(max);
        }
        if let Some(delay) = self.delay_ms {
            config.report.politeness_delay_ms = delay;
        }
        if self.no_titles {
            config.report.resolve_titles = false;
        }
        if let Some(dir) = self.output_dir {
            config.report.output_dir = dir;
        }
    }
}

/// Title progress on a terminal bar; everything else goes to tracing
struct ProgressObserver {
    bar: ProgressBar,
    inner: TracingObserver,
    titles_found: AtomicUsize,
}

impl ProgressObserver {
    fn new(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Self {
            bar,
            inner: TracingObserver,
            titles_found: AtomicUsize::new(0),
        }
    }

    fn finish(&self, done: usize) {
        self.bar.set_position(done as u64);
        self.bar.finish_and_clear();
    }
}

impl PipelineObserver for ProgressObserver {
    fn links_extracted(&self, text: &str, links: &[ExtractedLink]) {
        self.inner.links_extracted(text, links);
    }

    fn link_normalized(&self, link: &ExtractedLink, key: &ProductKey) {
        self.inner.link_normalized(link, key);
    }

    fn title_started(&self, position: usize, total: usize, entry: &RankedEntry) {
        self.bar.set_position(position.saturating_sub(1) as u64);
        self.bar.set_message(truncate_str(entry.key.as_str(), 40));
        self.bar
            .suspend(|| self.inner.title_started(position, total, entry));
    }

    fn page_fetched(&self, page: &FetchedPage) {
        self.bar.suspend(|| self.inner.page_fetched(page));
    }

    fn title_resolved(&self, target: &str, outcome: &TitleOutcome) {
        if outcome.is_found() {
            self.titles_found.fetch_add(1, Ordering::Relaxed);
        }
        self.bar.suspend(|| self.inner.title_resolved(target, outcome));
    }

    fn report_cancelled(&self, completed: usize, total: usize) {
        self.bar
            .suspend(|| self.inner.report_cancelled(completed, total));
    }
}

/// Run the full pipeline over a post dump and export the CSV report
pub async fn rank_posts(mut config: Config, input: PathBuf, options: RankOptions) -> Result<()> {
    let format = options.format;
    options.apply(&mut config);
    config.validate()?;

    let posts = read_posts(&input, format)
        .with_context(|| format!("Failed to load posts from {}", input.display()))?;
    info!("Loaded {} post(s) from {}", posts.len(), input.display());

    let tracing_observer: SharedObserver = Arc::new(TracingObserver);
    let pipeline = Pipeline::from_config(&config, tracing_observer)
        .context("Failed to build link pipeline")?;
    let ranked = pipeline.rank_posts(&posts).await;

    if ranked.is_empty() {
        println!("No retailer links found in {} post(s)", posts.len());
        let path = export_report(&config, &Report::default(), &input)?;
        println!("Empty report written to {}", path.display());
        return Ok(());
    }

    let distinct = ranked.len();
    let ranked = apply_cap(ranked, config.report.max_titles);
    if ranked.len() < distinct {
        info!("Keeping top {} of {} products", ranked.len(), distinct);
    }

    let (report, titles_found) = build_report(&config, &ranked).await?;
    let path = export_report(&config, &report, &input)?;

    print_summary(&report, distinct);
    if config.report.resolve_titles {
        println!("Titles found for {} of {} product(s)", titles_found, report.len());
    }
    println!("Report written to {}", path.display());

    Ok(())
}

/// Write `report` as a timestamped CSV. An empty report still produces a
/// header-only file.
fn export_report(config: &Config, report: &Report, input: &Path) -> Result<PathBuf> {
    let exporter = CsvExporter::new(&config.report.output_dir, &config.report.file_prefix)
        .with_bom(config.report.write_bom);
    exporter
        .export(&report.entries, &chrono::Local::now())
        .with_context(|| format!("Failed to export report for {}", input.display()))
}

/// Title the ranked table. Also returns how many real titles were found.
async fn build_report(config: &Config, ranked: &[RankedEntry]) -> Result<(Report, usize)> {
    let cancel = Arc::new(AtomicBool::new(false));
    let signal_flag = cancel.clone();
    let signal_task = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, finishing the current entry");
            signal_flag.store(true, Ordering::Relaxed);
        }
    });

    let progress = Arc::new(ProgressObserver::new(ranked.len()));
    let builder = ReportBuilder::new(config.report.politeness_delay())
        .with_cancel_flag(cancel)
        .with_observer(progress.clone());

    let report = if config.report.resolve_titles {
        let fetcher = PageFetcher::new(config.fetch.to_fetch_config())
            .context("Failed to build HTTP client")?;
        let resolver = TitleResolver::new(fetcher).with_observer(progress.clone());
        builder.build_with(ranked, &resolver).await
    } else {
        builder.build_untitled(ranked)
    };

    progress.finish(report.len());
    signal_task.abort();

    Ok((report, progress.titles_found.load(Ordering::Relaxed)))
}

fn print_summary(report: &Report, distinct: usize) {
    println!();
    println!("{:>5}  {:<40}  {}", "count", "key", "title");
    for entry in report.entries.iter().take(20) {
        println!(
            "{:>5}  {:<40}  {}",
            entry.count,
            truncate_str(entry.key.as_str(), 40),
            truncate_str(&entry.title, 60)
        );
    }
    if report.len() > 20 {
        println!("  ... {} more", report.len() - 20);
    }
    println!();

    if report.cancelled {
        println!(
            "Interrupted: exported {} of {} product(s)",
            report.len(),
            distinct
        );
    } else {
        println!("Exported {} of {} product(s)", report.len(), distinct);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_report_still_exports_header() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.report.output_dir = tmp.path().join("csv");
        config.report.write_bom = false;

        let path = export_report(&config, &Report::default(), Path::new("posts.jsonl")).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.trim_end(), "title,count,key");
    }

    #[test]
    fn options_override_report_section() {
        let mut config = Config::default();
        RankOptions {
            max_titles: Some(5),
            delay_ms: Some(0),
            no_titles: true,
            ..Default::default()
        }
        .apply(&mut config);

        assert_eq!(config.report.max_titles, Some(5));
        assert_eq!(config.report.politeness_delay_ms, 0);
        assert!(!config.report.resolve_titles);
    }
}
