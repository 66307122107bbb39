//! Report sinks for elapsed measurements.

use crate::capture::{elapsed_since, BenchmarkMark, ElapsedReport};
use dbgkit_common::error::DbgResult;
use dbgkit_common::units::DurationUnit;
use std::io::{self, Write};
use tracing::{info, warn};

/// Destination for human-readable elapsed reports.
pub trait ReportSink {
    /// Emit one report.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from the underlying destination.
    fn emit(&mut self, report: &ElapsedReport) -> io::Result<()>;
}

/// Logs each report as an `info` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ReportSink for TracingSink {
    fn emit(&mut self, report: &ElapsedReport) -> io::Result<()> {
        info!(
            cycles = report.cycles,
            elapsed = report.elapsed,
            unit = %report.unit,
            "{report}"
        );
        Ok(())
    }
}

/// Writes each report as one line to a writer.
#[derive(Debug)]
pub struct WriterSink<W: Write> {
    writer: W,
}

impl<W: Write> WriterSink<W> {
    /// Wrap a writer.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl WriterSink<io::Stdout> {
    /// Sink writing to standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ReportSink for WriterSink<W> {
    fn emit(&mut self, report: &ElapsedReport) -> io::Result<()> {
        writeln!(self.writer, "{report}")?;
        self.writer.flush()
    }
}

/// Compute the elapsed report for `mark` and emit it to `sink`.
///
/// A failing sink is logged and does not affect the returned report.
///
/// # Errors
///
/// Returns `UnsupportedPlatform` on architectures without a cycle counter.
pub fn end_bench<S: ReportSink + ?Sized>(
    mark: BenchmarkMark,
    unit: DurationUnit,
    sink: &mut S,
) -> DbgResult<ElapsedReport> {
    let report = elapsed_since(mark, unit)?;
    if let Err(e) = sink.emit(&report) {
        warn!(error = %e, "failed to emit elapsed report");
    }
    Ok(report)
}
