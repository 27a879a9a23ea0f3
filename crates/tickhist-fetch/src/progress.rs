//! Download progress tracking.
//!
//! The downloader bumps an atomic byte counter after every chunk it writes.
//! A [`ProgressReporter`] task samples that counter on a fixed interval and
//! stops when the downloader sends the final byte count over a oneshot channel.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::info;

/// Shared state of a single download.
#[derive(Debug)]
pub struct DownloadState {
    destination: String,
    expected: u64,
    written: AtomicU64,
}

impl DownloadState {
    /// Creates state for a download of `expected` bytes.
    #[must_use]
    pub fn new(destination: impl Into<String>, expected: u64) -> Self {
        Self {
            destination: destination.into(),
            expected,
            written: AtomicU64::new(0),
        }
    }

    /// Destination name used in reports.
    #[must_use]
    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Declared size of the download; zero when unknown.
    #[must_use]
    pub const fn expected(&self) -> u64 {
        self.expected
    }

    /// Bytes written so far.
    #[must_use]
    pub fn written(&self) -> u64 {
        self.written.load(Ordering::Acquire)
    }

    /// Records `bytes` more bytes written.
    pub fn add(&self, bytes: u64) {
        self.written.fetch_add(bytes, Ordering::Release);
    }
}

/// One progress sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressReport {
    /// Bytes written at sampling time.
    pub bytes_written: u64,
    /// Declared total size.
    pub expected: u64,
    /// Completion percentage in `0.0..=100.0`.
    pub percent: f64,
    /// Whether this is the report built from the final byte count.
    pub finished: bool,
}

impl ProgressReport {
    /// Builds a report from a byte count.
    #[must_use]
    pub fn new(bytes_written: u64, expected: u64, finished: bool) -> Self {
        Self {
            bytes_written,
            expected,
            percent: percent(bytes_written, expected),
            finished,
        }
    }
}

/// Percentage of `expected` covered by `written`.
///
/// The denominator is clamped to 1 and the result capped at 100.
#[must_use]
pub fn percent(written: u64, expected: u64) -> f64 {
    let ratio = written as f64 / expected.max(1) as f64 * 100.0;
    ratio.min(100.0)
}

/// Receives progress reports.
pub trait ProgressObserver: Send + Sync {
    /// Called for every sample and once more with the final count.
    fn on_progress(&self, destination: &str, report: &ProgressReport);
}

impl<F> ProgressObserver for F
where
    F: Fn(&str, &ProgressReport) + Send + Sync,
{
    fn on_progress(&self, destination: &str, report: &ProgressReport) {
        self(destination, report);
    }
}

/// Observer that logs each report at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl ProgressObserver for LogObserver {
    fn on_progress(&self, destination: &str, report: &ProgressReport) {
        info!(
            finished = report.finished,
            "{destination}, Bytes: {}/Total: {} ({:.2}%)",
            report.bytes_written,
            report.expected,
            report.percent
        );
    }
}

/// Periodic sampler of a [`DownloadState`].
#[derive(Clone)]
pub struct ProgressReporter {
    interval: Duration,
    observer: Arc<dyn ProgressObserver>,
}

impl ProgressReporter {
    /// Creates a reporter sampling every `interval`.
    #[must_use]
    pub fn new(interval: Duration, observer: Arc<dyn ProgressObserver>) -> Self {
        Self { interval, observer }
    }

    /// Sampling interval.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Spawns the sampling task.
    ///
    /// The task ends when `done` resolves. With a final count it emits one
    /// finished report and returns it; if the sender is dropped it returns
    /// `None` without a final report.
    pub fn spawn(
        &self,
        state: Arc<DownloadState>,
        mut done: oneshot::Receiver<u64>,
    ) -> JoinHandle<Option<ProgressReport>> {
        let observer = Arc::clone(&self.observer);
        let period = self.interval.max(Duration::from_millis(1));

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    outcome = &mut done => {
                        let final_count = outcome.ok()?;
                        let report = ProgressReport::new(final_count, state.expected(), true);
                        observer.on_progress(state.destination(), &report);
                        return Some(report);
                    }
                    _ = ticker.tick() => {
                        let report = ProgressReport::new(state.written(), state.expected(), false);
                        observer.on_progress(state.destination(), &report);
                    }
                }
            }
        })
    }
}

impl std::fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}
