//! Rendering of benchmark summaries and diagnostics snapshots.

use dbgkit_bench::ElapsedReport;
use dbgkit_common::config::OutputFormat;
use dbgkit_common::metrics::{HistogramSnapshot, LatencyHistogram};
use dbgkit_common::units::DurationUnit;
use dbgkit_diag::DiagnosticsSnapshot;
use serde::Serialize;
use std::fmt::Write as _;

/// Summary of a sampled workload, in one unit.
#[derive(Debug, Clone, Serialize)]
pub struct BenchSummary {
    /// Workload description.
    pub workload: String,
    /// Unit of every figure below.
    pub unit: DurationUnit,
    /// Raw histogram figures in nanoseconds.
    pub histogram: HistogramSnapshot,
    /// Mean in `unit`.
    pub mean: Option<u64>,
    /// Shortest sample in `unit`.
    pub min: Option<u64>,
    /// Longest sample in `unit`.
    pub max: Option<u64>,
    /// Requested percentiles in `unit`.
    pub percentiles: Vec<(f64, u64)>,
    /// Cycles and wall time for the whole run, when a cycle counter exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed: Option<ElapsedReport>,
}

impl BenchSummary {
    /// Summarise `histogram` in `unit`.
    pub fn new(
        workload: impl Into<String>,
        histogram: &LatencyHistogram,
        unit: DurationUnit,
        percentiles: &[f64],
    ) -> Self {
        Self {
            workload: workload.into(),
            unit,
            histogram: histogram.snapshot(),
            mean: histogram.mean().map(|d| unit.count(d)),
            min: histogram.min().map(|d| unit.count(d)),
            max: histogram.max().map(|d| unit.count(d)),
            percentiles: histogram
                .percentiles(percentiles)
                .into_iter()
                .map(|(p, d)| (p, unit.count(d)))
                .collect(),
            elapsed: None,
        }
    }
}

fn opt(value: Option<u64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// Render a benchmark summary.
///
/// # Errors
///
/// Returns an error only if JSON serialization fails.
pub fn render_bench(summary: &BenchSummary, format: OutputFormat) -> serde_json::Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(summary),
        OutputFormat::Text => {
            let label = summary.unit.label();
            let mut out = String::new();
            // Writing to a String cannot fail.
            let _ = writeln!(out, "Workload:   {}", summary.workload);
            let _ = writeln!(out, "Iterations: {}", summary.histogram.recorded);
            let _ = writeln!(out, "Mean {label}: {}", opt(summary.mean));
            let _ = writeln!(out, "Min {label}:  {}", opt(summary.min));
            let _ = writeln!(out, "Max {label}:  {}", opt(summary.max));
            for (p, v) in &summary.percentiles {
                let _ = writeln!(out, "p{p} {label}: {v}");
            }
            let _ = write!(out, "Overruns:   {}", summary.histogram.overruns);
            Ok(out)
        }
    }
}

/// Render a diagnostics snapshot.
///
/// # Errors
///
/// Returns an error only if JSON serialization fails.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
pub fn render_snapshot(
    snapshot: &DiagnosticsSnapshot,
    format: OutputFormat,
) -> serde_json::Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(snapshot),
        OutputFormat::Text => Ok(snapshot.to_string()),
    }
}
