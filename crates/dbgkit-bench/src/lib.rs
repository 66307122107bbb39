//! Benchmark capture for dbgkit.
//!
//! - [`clock`]: cycle counter + monotonic clock sources
//! - [`capture`]: marks, elapsed reports, and timed execution
//! - [`report`]: sinks for human-readable report lines
//! - [`sampling`]: repeated sampling into a latency histogram
//! - [`introspect`]: type-name helpers
//!
//! # Example
//!
//! ```
//! use dbgkit_bench::measure;
//! use dbgkit_common::DurationUnit;
//!
//! let ms = measure(|| std::thread::sleep(std::time::Duration::from_millis(2)), DurationUnit::Milliseconds);
//! assert!(ms >= 2);
//! ```

pub mod capture;
pub mod clock;
pub mod introspect;
pub mod report;
pub mod sampling;

pub use capture::{
    capture_mark, elapsed_since, measure, timed, try_measure, BenchmarkMark, ElapsedReport,
    Stopwatch,
};
pub use clock::{ClockSource, NativeClock};
pub use introspect::{short_type_name, type_name, type_name_of_val};
pub use report::{end_bench, ReportSink, TracingSink, WriterSink};
pub use sampling::{sample, SamplePlan};
