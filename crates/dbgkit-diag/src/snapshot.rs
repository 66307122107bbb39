//! Combined memory and CPU snapshot.

use crate::cpu::CpuSampler;
use crate::probe::{CpuCounters, MemoryProbe, MemorySnapshot, NO_INTERVAL};
use dbgkit_common::error::DbgResult;
use serde::Serialize;
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::debug;

/// Memory and CPU figures taken together.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DiagnosticsSnapshot {
    /// Wall-clock capture time, milliseconds since the Unix epoch.
    pub captured_at_ms: u64,
    /// Memory figures in bytes.
    pub memory: MemorySnapshot,
    /// System-wide CPU busy percentage, or [`NO_INTERVAL`].
    pub system_cpu_percent: f64,
    /// This process's CPU percentage, or [`NO_INTERVAL`].
    pub process_cpu_percent: f64,
}

impl DiagnosticsSnapshot {
    /// Read memory figures and the CPU percentages accumulated in `sampler`.
    ///
    /// # Errors
    ///
    /// Returns the first probe error encountered.
    pub fn collect<M, C>(memory: &M, sampler: &mut CpuSampler<C>) -> DbgResult<Self>
    where
        M: MemoryProbe + ?Sized,
        C: CpuCounters,
    {
        let memory = memory.memory()?;
        let system_cpu_percent = sampler.system_percent()?;
        let process_cpu_percent = sampler.process_percent()?;
        let captured_at_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or(0);
        debug!(system_cpu_percent, process_cpu_percent, "snapshot taken");
        Ok(Self {
            captured_at_ms,
            memory,
            system_cpu_percent,
            process_cpu_percent,
        })
    }

    /// Like [`Self::collect`], sleeping `interval` first so the CPU figures
    /// cover a known window.
    ///
    /// # Errors
    ///
    /// Returns the first probe error encountered.
    pub fn collect_after<M, C>(
        memory: &M,
        sampler: &mut CpuSampler<C>,
        interval: Duration,
    ) -> DbgResult<Self>
    where
        M: MemoryProbe + ?Sized,
        C: CpuCounters,
    {
        std::thread::sleep(interval);
        Self::collect(memory, sampler)
    }
}

/// Byte count rendered with a binary suffix.
struct Bytes(u64);

impl fmt::Display for Bytes {
    #[allow(clippy::cast_precision_loss)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
        let mut value = self.0 as f64;
        let mut unit = 0;
        while value >= 1024.0 && unit < UNITS.len() - 1 {
            value /= 1024.0;
            unit += 1;
        }
        if unit == 0 {
            write!(f, "{} B", self.0)
        } else {
            write!(f, "{value:.1} {}", UNITS[unit])
        }
    }
}

struct Percent(f64);

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 < 0.0 {
            f.write_str("n/a")
        } else {
            write!(f, "{:.1}%", self.0)
        }
    }
}

impl fmt::Display for DiagnosticsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.memory;
        writeln!(
            f,
            "Virtual memory:  {} / {}",
            Bytes(m.used_virtual),
            Bytes(m.total_virtual)
        )?;
        writeln!(
            f,
            "Physical memory: {} / {}",
            Bytes(m.used_physical),
            Bytes(m.total_physical)
        )?;
        writeln!(f, "Process virtual: {}", Bytes(m.process_virtual))?;
        writeln!(f, "Process RSS:     {}", Bytes(m.process_physical))?;
        writeln!(f, "System CPU:      {}", Percent(self.system_cpu_percent))?;
        write!(f, "Process CPU:     {}", Percent(self.process_cpu_percent))
    }
}

impl Default for DiagnosticsSnapshot {
    fn default() -> Self {
        Self {
            captured_at_ms: 0,
            memory: MemorySnapshot::default(),
            system_cpu_percent: NO_INTERVAL,
            process_cpu_percent: NO_INTERVAL,
        }
    }
}
