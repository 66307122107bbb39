//! Repeated sampling of a workload into a latency histogram.

use dbgkit_common::metrics::LatencyHistogram;
use std::hint::black_box;
use std::time::{Duration, Instant};
use tracing::debug;

/// Parameters for a sampling run.
#[derive(Debug, Clone)]
pub struct SamplePlan {
    /// Timed iterations.
    pub iterations: u64,
    /// Untimed iterations run first.
    pub warmup: u64,
    /// Samples retained for percentiles.
    pub histogram_size: usize,
    /// Per-iteration budget for overrun counting.
    pub budget: Option<Duration>,
}

impl Default for SamplePlan {
    fn default() -> Self {
        Self {
            iterations: 1_000,
            warmup: 100,
            histogram_size: 10_000,
            budget: None,
        }
    }
}

impl From<&dbgkit_common::config::BenchConfig> for SamplePlan {
    fn from(config: &dbgkit_common::config::BenchConfig) -> Self {
        Self {
            iterations: config.iterations,
            warmup: config.warmup_iterations,
            histogram_size: config.histogram_size,
            budget: config.budget,
        }
    }
}

/// Time `operation` once per iteration after an untimed warmup.
pub fn sample<F>(plan: &SamplePlan, mut operation: F) -> LatencyHistogram
where
    F: FnMut(),
{
    for _ in 0..plan.warmup {
        black_box(operation());
    }

    let mut histogram = LatencyHistogram::new(plan.histogram_size, plan.budget);
    for _ in 0..plan.iterations {
        let start = Instant::now();
        black_box(operation());
        histogram.record(start.elapsed());
    }

    debug!(
        iterations = plan.iterations,
        warmup = plan.warmup,
        overruns = histogram.overruns(),
        "sampling complete"
    );
    histogram
}
