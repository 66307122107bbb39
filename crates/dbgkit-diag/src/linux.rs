//! Linux metrics provider backed by procfs.
//!
//! - `/proc/meminfo`: physical memory and swap
//! - `/proc/self/status`: process virtual size and resident set
//! - `/proc/stat`: aggregate CPU ticks
//! - `CLOCK_PROCESS_CPUTIME_ID`: process CPU time

#![allow(unsafe_code)]

use crate::probe::{CpuCounters, CpuTicks, MemoryProbe, MemorySnapshot};
use dbgkit_common::error::{DbgError, DbgResult};
use nix::time::{clock_gettime, ClockId};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{trace, warn};

/// Memory probe reading procfs.
#[derive(Debug, Clone)]
pub struct ProcMemory {
    meminfo: PathBuf,
    status: PathBuf,
}

impl Default for ProcMemory {
    fn default() -> Self {
        Self {
            meminfo: PathBuf::from("/proc/meminfo"),
            status: PathBuf::from("/proc/self/status"),
        }
    }
}

impl ProcMemory {
    /// Probe for the current process.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Probe reading from alternate files (e.g. another process's status).
    #[must_use]
    pub fn with_paths(meminfo: impl Into<PathBuf>, status: impl Into<PathBuf>) -> Self {
        Self {
            meminfo: meminfo.into(),
            status: status.into(),
        }
    }
}

impl MemoryProbe for ProcMemory {
    fn memory(&self) -> DbgResult<MemorySnapshot> {
        let system = parse_meminfo(&read(&self.meminfo)?)?;
        let process = parse_status(&read(&self.status)?)?;
        let snapshot = MemorySnapshot {
            total_virtual: system.mem_total + system.swap_total,
            used_virtual: system.used_physical() + system.used_swap(),
            total_physical: system.mem_total,
            used_physical: system.used_physical(),
            process_virtual: process.vm_size,
            process_physical: process.vm_rss,
        };
        trace!(?snapshot, "memory probed");
        Ok(snapshot)
    }
}

/// CPU counters for the current process and the whole system.
#[derive(Debug, Clone)]
pub struct ProcCounters {
    stat: PathBuf,
    cpus: usize,
}

impl Default for ProcCounters {
    fn default() -> Self {
        Self {
            stat: PathBuf::from("/proc/stat"),
            cpus: online_cpus(),
        }
    }
}

impl ProcCounters {
    /// Counters for this machine.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CpuCounters for ProcCounters {
    fn system_ticks(&self) -> DbgResult<CpuTicks> {
        parse_stat(&read(&self.stat)?)
    }

    fn process_cpu_time(&self) -> DbgResult<Duration> {
        let ts = clock_gettime(ClockId::CLOCK_PROCESS_CPUTIME_ID)
            .map_err(|e| DbgError::Probe(format!("process CPU clock: {e}")))?;
        Ok(Duration::from(ts))
    }

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn cpu_count(&self) -> usize {
        self.cpus
    }
}

fn read(path: &Path) -> DbgResult<String> {
    fs::read_to_string(path).map_err(|e| DbgError::Probe(format!("{}: {e}", path.display())))
}

/// Number of online processors; 1 if sysconf fails.
fn online_cpus() -> usize {
    // SAFETY: sysconf has no preconditions.
    let n = unsafe { libc::sysconf(libc::_SC_NPROCESSORS_ONLN) };
    if n < 1 {
        warn!("sysconf(_SC_NPROCESSORS_ONLN) failed, assuming 1 CPU");
        1
    } else {
        usize::try_from(n).unwrap_or(1)
    }
}

/// System memory figures from `/proc/meminfo`, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SystemMemory {
    pub mem_total: u64,
    pub mem_available: u64,
    pub swap_total: u64,
    pub swap_free: u64,
}

impl SystemMemory {
    fn used_physical(&self) -> u64 {
        self.mem_total.saturating_sub(self.mem_available)
    }

    fn used_swap(&self) -> u64 {
        self.swap_total.saturating_sub(self.swap_free)
    }
}

/// Process memory figures from `/proc/<pid>/status`, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ProcessMemory {
    pub vm_size: u64,
    pub vm_rss: u64,
}

/// Value of a `Key:   1234 kB` line, converted to bytes.
fn kb_field(text: &str, key: &str) -> Option<u64> {
    text.lines().find_map(|line| {
        let rest = line.strip_prefix(key)?.strip_prefix(':')?;
        let mut parts = rest.split_whitespace();
        let value: u64 = parts.next()?.parse().ok()?;
        match parts.next() {
            Some("kB") => value.checked_mul(1024),
            None => Some(value),
            Some(_) => None,
        }
    })
}

fn required(text: &str, key: &str, source: &str) -> DbgResult<u64> {
    kb_field(text, key)
        .ok_or_else(|| DbgError::Parse(format!("{source}: no valid {key}")))
}

pub(crate) fn parse_meminfo(text: &str) -> DbgResult<SystemMemory> {
    let mem_total = required(text, "MemTotal", "meminfo")?;
    // Kernels before 3.14 lack MemAvailable.
    let mem_available = match kb_field(text, "MemAvailable") {
        Some(v) => v,
        None => {
            required(text, "MemFree", "meminfo")?
                .saturating_add(kb_field(text, "Buffers").unwrap_or(0))
                .saturating_add(kb_field(text, "Cached").unwrap_or(0))
        }
    };
    Ok(SystemMemory {
        mem_total,
        mem_available,
        swap_total: kb_field(text, "SwapTotal").unwrap_or(0),
        swap_free: kb_field(text, "SwapFree").unwrap_or(0),
    })
}

pub(crate) fn parse_status(text: &str) -> DbgResult<ProcessMemory> {
    // Kernel threads have no VmSize/VmRSS lines.
    Ok(ProcessMemory {
        vm_size: kb_field(text, "VmSize").unwrap_or(0),
        vm_rss: kb_field(text, "VmRSS").unwrap_or(0),
    })
}

/// Aggregate `cpu` line of `/proc/stat`.
///
/// Columns: user nice system idle iowait irq softirq steal guest guest_nice.
/// Guest time is already included in user/nice and is not added again.
pub(crate) fn parse_stat(text: &str) -> DbgResult<CpuTicks> {
    let line = text
        .lines()
        .find(|l| l.split_whitespace().next() == Some("cpu"))
        .ok_or_else(|| DbgError::Parse("stat: no aggregate cpu line".into()))?;

    let fields = line
        .split_whitespace()
        .skip(1)
        .take(8)
        .map(|f| {
            f.parse::<u64>()
                .map_err(|e| DbgError::Parse(format!("stat: bad field '{f}': {e}")))
        })
        .collect::<DbgResult<Vec<u64>>>()?;

    if fields.len() < 4 {
        return Err(DbgError::Parse(format!(
            "stat: expected at least 4 cpu fields, found {}",
            fields.len()
        )));
    }

    let iowait = fields.get(4).copied().unwrap_or(0);
    Ok(CpuTicks {
        total: fields.iter().sum(),
        idle: fields[3] + iowait,
    })
}
