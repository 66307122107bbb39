//! Common utilities for integration tests.
//!
//! Provides helpers for:
//! - Skipping cycle-counter tests on targets without one
//! - Scheduler-noise tolerances
//! - Independent /proc readings to cross-check the probes

#![allow(dead_code)] // Not every helper is used on every target

use std::fs;
use std::time::Duration;

/// Upper bound for work that should take "no time" on an idle machine.
pub const NOOP_TOLERANCE: Duration = Duration::from_millis(50);

/// Whether this target has a native cycle counter.
pub fn has_cycle_counter() -> bool {
    dbgkit_bench::NativeClock::SUPPORTED
}

/// Print a skip notice and return `true` when there is no cycle counter.
pub fn skip_without_cycle_counter(test: &str) -> bool {
    if has_cycle_counter() {
        false
    } else {
        eprintln!("Skipping {test}: no native cycle counter on this target");
        true
    }
}

/// Get the number of CPUs.
pub fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1)
}

/// Current process resident set in bytes, read directly from /proc.
pub fn get_memory_usage() -> u64 {
    if let Ok(status) = fs::read_to_string("/proc/self/status") {
        for line in status.lines() {
            if line.starts_with("VmRSS:") {
                let parts: Vec<&str> = line.split_whitespace().collect();
                if parts.len() >= 2 {
                    if let Ok(kb) = parts[1].parse::<u64>() {
                        return kb * 1024;
                    }
                }
            }
        }
    }
    0
}

/// Busy-wait for `duration` on the monotonic clock.
pub fn spin_for(duration: Duration) {
    let start = std::time::Instant::now();
    while start.elapsed() < duration {
        std::hint::spin_loop();
    }
}
