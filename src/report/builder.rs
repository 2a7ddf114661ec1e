//! Joining the ranked table with titles

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::observer::{self, SharedObserver};
use crate::titles::{Pacer, TitleLookup, TITLE_SKIPPED};
use crate::types::{RankedEntry, TitledEntry};

/// Titled rows in rank order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub entries: Vec<TitledEntry>,
    /// True when building stopped before every ranked entry was titled
    pub cancelled: bool,
}

impl Report {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builds the titled report from a ranked table
pub struct ReportBuilder {
    /// Minimum spacing between consecutive title lookups
    pacing: Duration,
    cancel: Option<Arc<AtomicBool>>,
    observer: SharedObserver,
}

impl Default for ReportBuilder {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}

impl ReportBuilder {
    pub fn new(pacing: Duration) -> Self {
        Self {
            pacing,
            cancel: None,
            observer: observer::noop(),
        }
    }

    /// Stop before the next entry once `flag` is set
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn with_observer(mut self, observer: SharedObserver) -> Self {
        self.observer = observer;
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Title each entry with `resolve`, preserving rank order
    pub fn build<F>(&self, ranked: &[RankedEntry], mut resolve: F) -> Report
    where
        F: FnMut(&RankedEntry) -> String,
    {
        let mut report = Report::default();
        for (i, entry) in ranked.iter().enumerate() {
            if self.is_cancelled() {
                self.observer.report_cancelled(i, ranked.len());
                report.cancelled = true;
                break;
            }
            self.observer.title_started(i + 1, ranked.len(), entry);
            report.entries.push(titled(entry, resolve(entry)));
        }
        report
    }

    /// Report without title lookups; every title is the skipped sentinel
    pub fn build_untitled(&self, ranked: &[RankedEntry]) -> Report {
        self.build(ranked, |_| TITLE_SKIPPED.to_string())
    }

    /// Title each entry through `lookup`, one request at a time, spaced by
    /// the configured pacing
    pub async fn build_with<L>(&self, ranked: &[RankedEntry], lookup: &L) -> Report
    where
        L: TitleLookup + ?Sized,
    {
        let mut pacer = Pacer::new(self.pacing);
        let mut report = Report::default();

        for (i, entry) in ranked.iter().enumerate() {
            if self.is_cancelled() {
                self.observer.report_cancelled(i, ranked.len());
                report.cancelled = true;
                break;
            }
            self.observer.title_started(i + 1, ranked.len(), entry);
            pacer.wait().await;
            let title = lookup.lookup(entry).await;
            report.entries.push(titled(entry, title));
        }

        report
    }
}

fn titled(entry: &RankedEntry, title: String) -> TitledEntry {
    TitledEntry {
        title,
        count: entry.count,
        key: entry.key.clone(),
    }
}
