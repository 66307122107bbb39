//! Benchmark marks, elapsed reports, and timed execution.
//!
//! A [`BenchmarkMark`] pairs a cycle count with a monotonic instant. Taking
//! a later reading and subtracting gives an [`ElapsedReport`]:
//!
//! ```
//! use dbgkit_bench::{capture_mark, elapsed_since};
//! use dbgkit_common::DurationUnit;
//!
//! # if dbgkit_bench::NativeClock::SUPPORTED {
//! let mark = capture_mark().unwrap();
//! let report = elapsed_since(mark, DurationUnit::Nanoseconds).unwrap();
//! println!("{report}"); // Clock cycles: 812, nanoseconds: 340
//! # }
//! ```
//!
//! [`measure`] wraps a closure and only reports wall time; callers that need
//! cycles for a closure take a mark themselves.

use crate::clock::{ClockSource, NativeClock};
use dbgkit_common::error::DbgResult;
use dbgkit_common::units::DurationUnit;
use serde::Serialize;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::trace;

/// Reference point for a later elapsed computation.
///
/// Absolute values carry no meaning; only the difference to a later mark
/// from the same process is meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BenchmarkMark {
    /// Cycle counter reading.
    pub cycle_count: u64,
    /// Monotonic clock reading.
    pub timestamp: Instant,
}

static_assertions::assert_impl_all!(BenchmarkMark: Copy, Send, Sync);

/// Cycles and wall time elapsed since a mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ElapsedReport {
    /// Cycles elapsed (wrapping subtraction).
    pub cycles: u64,
    /// Wall time as a whole number of `unit`, truncated.
    pub elapsed: u64,
    /// Unit of `elapsed`.
    pub unit: DurationUnit,
    /// Untruncated wall time.
    #[serde(skip)]
    pub duration: Duration,
}

impl fmt::Display for ElapsedReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Clock cycles: {}, {}: {}",
            self.cycles,
            self.unit.label(),
            self.elapsed
        )
    }
}

/// Mark/elapsed pair bound to a specific clock source.
#[derive(Debug, Clone)]
pub struct Stopwatch<C: ClockSource> {
    clock: C,
}

impl Stopwatch<NativeClock> {
    /// Stopwatch backed by the hardware cycle counter.
    ///
    /// # Errors
    ///
    /// Fails with `UnsupportedPlatform` when no cycle counter exists.
    pub fn native() -> DbgResult<Self> {
        Ok(Self::new(NativeClock::new()?))
    }
}

impl<C: ClockSource> Stopwatch<C> {
    /// Wrap a clock source.
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    /// The underlying clock.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Read the cycle counter and the monotonic clock back to back.
    #[inline]
    pub fn mark(&self) -> BenchmarkMark {
        let cycle_count = self.clock.current_cycle_count();
        let timestamp = self.clock.current_instant();
        BenchmarkMark {
            cycle_count,
            timestamp,
        }
    }

    /// Cycles and wall time since `mark`.
    ///
    /// `mark` must come from this process and precede now; otherwise the
    /// cycle figure wraps and the wall time saturates at zero.
    #[inline]
    pub fn elapsed_since(&self, mark: BenchmarkMark, unit: DurationUnit) -> ElapsedReport {
        let now_cycles = self.clock.current_cycle_count();
        let now = self.clock.current_instant();
        let duration = now.saturating_duration_since(mark.timestamp);
        let report = ElapsedReport {
            cycles: now_cycles.wrapping_sub(mark.cycle_count),
            elapsed: unit.count(duration),
            unit,
            duration,
        };
        trace!(cycles = report.cycles, ?duration, "elapsed since mark");
        report
    }
}

/// Capture a mark from the native cycle counter and monotonic clock.
///
/// # Errors
///
/// Returns `UnsupportedPlatform` on architectures without a cycle counter.
#[inline]
pub fn capture_mark() -> DbgResult<BenchmarkMark> {
    Ok(Stopwatch::native()?.mark())
}

/// Cycles and wall time elapsed since `mark`, with wall time in `unit`.
///
/// # Errors
///
/// Returns `UnsupportedPlatform` on architectures without a cycle counter.
#[inline]
pub fn elapsed_since(mark: BenchmarkMark, unit: DurationUnit) -> DbgResult<ElapsedReport> {
    Ok(Stopwatch::native()?.elapsed_since(mark, unit))
}

/// Run `operation` once and return its wall time in `unit`.
///
/// A panic inside `operation` unwinds through this call untouched.
pub fn measure<F>(operation: F, unit: DurationUnit) -> u64
where
    F: FnOnce(),
{
    let start = Instant::now();
    operation();
    unit.count(start.elapsed())
}

/// Run a fallible `operation` once and return its wall time in `unit`.
///
/// # Errors
///
/// Returns the operation's own error unchanged; no elapsed value is produced
/// in that case.
pub fn try_measure<F, E>(operation: F, unit: DurationUnit) -> Result<u64, E>
where
    F: FnOnce() -> Result<(), E>,
{
    let start = Instant::now();
    operation()?;
    Ok(unit.count(start.elapsed()))
}

/// Run `operation` once and return its output together with the wall time.
pub fn timed<F, T>(operation: F) -> (T, Duration)
where
    F: FnOnce() -> T,
{
    let start = Instant::now();
    let output = operation();
    (output, start.elapsed())
}
