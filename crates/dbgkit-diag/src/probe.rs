//! Capability traits and the values they produce.
//!
//! One implementation exists per supported platform. A platform without an
//! implementation simply has no type implementing these traits.

use dbgkit_common::error::DbgResult;
use serde::Serialize;
use std::time::{Duration, Instant};

/// Returned by CPU percentage queries when no measurable interval has passed
/// since the previous sample.
pub const NO_INTERVAL: f64 = -1.0;

/// Memory figures in bytes.
///
/// "Virtual" system figures are physical memory plus swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MemorySnapshot {
    /// Physical memory plus swap.
    pub total_virtual: u64,
    /// Used physical memory plus used swap.
    pub used_virtual: u64,
    /// Installed physical memory.
    pub total_physical: u64,
    /// Physical memory not available for new allocations.
    pub used_physical: u64,
    /// Virtual address space of this process.
    pub process_virtual: u64,
    /// Resident set of this process.
    pub process_physical: u64,
}

/// Source of memory figures.
pub trait MemoryProbe {
    /// Read current memory figures.
    ///
    /// # Errors
    ///
    /// Returns `Probe` if a counter source cannot be read and `Parse` if it
    /// has an unexpected format.
    fn memory(&self) -> DbgResult<MemorySnapshot>;
}

/// Aggregate CPU time of the whole system, in clock ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CpuTicks {
    /// All accounted time, idle included.
    pub total: u64,
    /// Idle and I/O-wait time.
    pub idle: u64,
}

/// Raw counters a [`crate::CpuSampler`] differences between calls.
pub trait CpuCounters {
    /// System-wide CPU ticks.
    ///
    /// # Errors
    ///
    /// Returns `Probe` or `Parse` if the counter source is unusable.
    fn system_ticks(&self) -> DbgResult<CpuTicks>;

    /// CPU time consumed by this process so far, all threads combined.
    ///
    /// # Errors
    ///
    /// Returns `Probe` if the process clock cannot be read.
    fn process_cpu_time(&self) -> DbgResult<Duration>;

    /// Monotonic wall-clock instant.
    fn now(&self) -> Instant;

    /// Number of online processors (at least 1).
    fn cpu_count(&self) -> usize;
}
