//! Spacing between consecutive title requests
//!
//! Retail sites throttle or block bursts of requests. The pacer enforces a
//! minimum interval between calls; it is owned by whoever drives the lookups,
//! not by the resolver itself.

use std::time::{Duration, Instant};

/// Decision about whether the next request may go out now
#[derive(Debug, Clone, PartialEq)]
pub enum PaceDecision {
    /// Request may proceed
    Allowed,
    /// Must wait for the specified duration
    WaitFor(Duration),
}

/// Minimum-interval gate for sequential requests
#[derive(Debug, Clone)]
pub struct Pacer {
    min_interval: Duration,
    last_request: Option<Instant>,
    requests: u64,
}

impl Pacer {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: None,
            requests: 0,
        }
    }

    /// Check whether a request may go out right now
    pub fn check(&self) -> PaceDecision {
        match self.last_request {
            Some(last) => {
                let elapsed = last.elapsed();
                if elapsed < self.min_interval {
                    PaceDecision::WaitFor(self.min_interval - elapsed)
                } else {
                    PaceDecision::Allowed
                }
            }
            None => PaceDecision::Allowed,
        }
    }

    /// Sleep until the interval since the previous request has passed, then
    /// mark a new request as started
    pub async fn wait(&mut self) {
        if let PaceDecision::WaitFor(delay) = self.check() {
            tokio::time::sleep(delay).await;
        }
        self.record_request();
    }

    /// Mark a request as started now
    pub fn record_request(&mut self) {
        self.last_request = Some(Instant::now());
        self.requests += 1;
    }

    /// Requests recorded so far
    pub fn requests(&self) -> u64 {
        self.requests
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}
