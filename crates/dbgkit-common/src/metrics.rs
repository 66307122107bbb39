//! Latency histogram for repeated measurements.
//!
//! Keeps the most recent samples in a fixed ring buffer so that recording
//! never allocates once the histogram is built.

use crate::units::DurationUnit;
use serde::Serialize;
use std::time::Duration;

/// Ring-buffer histogram of elapsed times, stored in nanoseconds.
#[derive(Debug)]
pub struct LatencyHistogram {
    /// Retained samples.
    samples: Box<[u64]>,
    /// Next slot to overwrite.
    write_pos: usize,
    /// Number of valid slots (saturates at buffer size).
    retained: usize,
    /// Samples recorded since creation or last reset.
    recorded: u64,
    min_ns: u64,
    max_ns: u64,
    sum_ns: u64,
    /// Samples that exceeded the budget.
    overruns: u64,
    /// Per-sample budget in nanoseconds; `None` disables overrun tracking.
    budget_ns: Option<u64>,
}

impl LatencyHistogram {
    /// Create a histogram retaining up to `capacity` samples.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Ring buffer length (at least 1).
    /// * `budget` - Samples strictly longer than this count as overruns.
    #[must_use]
    pub fn new(capacity: usize, budget: Option<Duration>) -> Self {
        let size = capacity.max(1);
        Self {
            samples: vec![0u64; size].into_boxed_slice(),
            write_pos: 0,
            retained: 0,
            recorded: 0,
            min_ns: u64::MAX,
            max_ns: 0,
            sum_ns: 0,
            overruns: 0,
            budget_ns: budget.map(duration_to_ns),
        }
    }

    /// Record one elapsed time.
    pub fn record(&mut self, elapsed: Duration) {
        self.record_ns(duration_to_ns(elapsed));
    }

    /// Record one elapsed time given in nanoseconds.
    pub fn record_ns(&mut self, ns: u64) {
        self.samples[self.write_pos] = ns;
        self.write_pos = (self.write_pos + 1) % self.samples.len();
        self.retained = (self.retained + 1).min(self.samples.len());

        self.recorded += 1;
        self.min_ns = self.min_ns.min(ns);
        self.max_ns = self.max_ns.max(ns);
        self.sum_ns = self.sum_ns.saturating_add(ns);

        if self.budget_ns.is_some_and(|budget| ns > budget) {
            self.overruns += 1;
        }
    }

    /// Samples recorded since creation or last reset.
    #[must_use]
    pub fn recorded(&self) -> u64 {
        self.recorded
    }

    /// Shortest recorded sample.
    #[must_use]
    pub fn min(&self) -> Option<Duration> {
        (self.recorded > 0).then(|| Duration::from_nanos(self.min_ns))
    }

    /// Longest recorded sample.
    #[must_use]
    pub fn max(&self) -> Option<Duration> {
        (self.recorded > 0).then(|| Duration::from_nanos(self.max_ns))
    }

    /// Mean of all recorded samples.
    #[must_use]
    pub fn mean(&self) -> Option<Duration> {
        (self.recorded > 0).then(|| Duration::from_nanos(self.sum_ns / self.recorded))
    }

    /// Number of samples over budget.
    #[must_use]
    pub fn overruns(&self) -> u64 {
        self.overruns
    }

    /// Percentile over the retained samples, taken at the sorted index
    /// `round(p / 100 * (n - 1))`.
    ///
    /// Returns `None` when empty or when `percentile` is outside 0..=100 or NaN.
    #[must_use]
    pub fn percentile(&self, percentile: f64) -> Option<Duration> {
        if self.retained == 0 || !valid_percentile(percentile) {
            return None;
        }
        let sorted = self.sorted();
        Some(Duration::from_nanos(sorted[rank(percentile, sorted.len())]))
    }

    /// Several percentiles at once; invalid entries are skipped.
    #[must_use]
    pub fn percentiles(&self, percentiles: &[f64]) -> Vec<(f64, Duration)> {
        if self.retained == 0 {
            return vec![];
        }
        let sorted = self.sorted();
        percentiles
            .iter()
            .copied()
            .filter(|&p| valid_percentile(p))
            .map(|p| (p, Duration::from_nanos(sorted[rank(p, sorted.len())])))
            .collect()
    }

    /// Point-in-time summary.
    #[must_use]
    pub fn snapshot(&self) -> HistogramSnapshot {
        let any = self.recorded > 0;
        HistogramSnapshot {
            recorded: self.recorded,
            retained: self.retained,
            min_ns: any.then_some(self.min_ns),
            max_ns: any.then_some(self.max_ns),
            mean_ns: any.then(|| self.sum_ns / self.recorded),
            overruns: self.overruns,
        }
    }

    /// Forget every sample; the budget is kept.
    pub fn reset(&mut self) {
        self.samples.fill(0);
        self.write_pos = 0;
        self.retained = 0;
        self.recorded = 0;
        self.min_ns = u64::MAX;
        self.max_ns = 0;
        self.sum_ns = 0;
        self.overruns = 0;
    }

    fn sorted(&self) -> Vec<u64> {
        let mut sorted = self.samples[..self.retained].to_vec();
        sorted.sort_unstable();
        sorted
    }
}

fn valid_percentile(p: f64) -> bool {
    (0.0..=100.0).contains(&p)
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn rank(percentile: f64, len: usize) -> usize {
    let idx = ((percentile / 100.0) * (len - 1) as f64).round() as usize;
    idx.min(len - 1)
}

fn duration_to_ns(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

/// Immutable histogram summary for reporting.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct HistogramSnapshot {
    /// Samples recorded.
    pub recorded: u64,
    /// Samples still held in the ring buffer.
    pub retained: usize,
    /// Shortest sample in nanoseconds.
    pub min_ns: Option<u64>,
    /// Longest sample in nanoseconds.
    pub max_ns: Option<u64>,
    /// Mean sample in nanoseconds.
    pub mean_ns: Option<u64>,
    /// Samples over budget.
    pub overruns: u64,
}

impl HistogramSnapshot {
    /// Spread between the longest and shortest sample.
    #[must_use]
    pub fn jitter_ns(&self) -> Option<u64> {
        match (self.min_ns, self.max_ns) {
            (Some(min), Some(max)) => Some(max - min),
            _ => None,
        }
    }

    /// Mean expressed in `unit`, truncated.
    #[must_use]
    pub fn mean_in(&self, unit: DurationUnit) -> Option<u64> {
        self.mean_ns.map(|ns| unit.count(Duration::from_nanos(ns)))
    }
}
