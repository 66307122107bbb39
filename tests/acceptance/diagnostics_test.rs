//! System diagnostics acceptance tests (Linux only).
//!
//! Cross-checks the probes against direct /proc readings and verifies the
//! CPU percentage sentinel contract.

#![cfg(target_os = "linux")]

use super::common::{get_memory_usage, num_cpus, spin_for};
use dbgkit_diag::{
    CpuCounters, CpuSampler, DiagnosticsSnapshot, MemoryProbe, NativeCpuCounters,
    NativeMemoryProbe, NO_INTERVAL,
};
use std::time::Duration;

#[test]
fn test_process_rss_matches_proc() {
    let probed = NativeMemoryProbe::new().memory().unwrap().process_physical;
    let direct = get_memory_usage();

    // RSS moves a little between the two reads.
    let diff = probed.abs_diff(direct);
    assert!(diff < 16 * 1024 * 1024, "probed={probed} direct={direct}");
}

#[test]
fn test_memory_relationships() {
    let mem = NativeMemoryProbe::new().memory().unwrap();
    assert!(mem.used_physical <= mem.total_physical);
    assert!(mem.used_virtual <= mem.total_virtual);
    assert!(mem.total_virtual >= mem.total_physical);
    assert!(mem.process_physical <= mem.total_physical);
}

#[test]
fn test_cpu_count_matches_std() {
    let counters = NativeCpuCounters::new();
    assert!(counters.cpu_count() >= 1);
    // available_parallelism honours affinity masks, sysconf does not.
    assert!(counters.cpu_count() >= num_cpus());
}

#[test]
fn test_busy_process_registers_cpu() {
    let mut sampler = CpuSampler::new(NativeCpuCounters::new()).unwrap();
    spin_for(Duration::from_millis(200));
    let pct = sampler.process_percent().unwrap();

    assert!(pct > 0.0, "spinning process reported {pct}%");
    assert!(pct <= 100.0 + 1e-6);
}

#[test]
fn test_snapshot_after_interval() {
    let mut sampler = CpuSampler::new(NativeCpuCounters::new()).unwrap();
    let snap = DiagnosticsSnapshot::collect_after(
        &NativeMemoryProbe::new(),
        &mut sampler,
        Duration::from_millis(100),
    )
    .unwrap();

    assert!(snap.memory.total_physical > 0);
    assert!(snap.process_cpu_percent >= 0.0);
    // /proc/stat ticks at USER_HZ; 100ms almost always spans a tick.
    let system = snap.system_cpu_percent;
    assert!(system == NO_INTERVAL || system >= 0.0);
    assert!(snap.to_string().contains("Process RSS:"));
}
