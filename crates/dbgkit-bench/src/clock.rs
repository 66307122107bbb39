//! Cycle counter and monotonic clock sources.
//!
//! The native source reads:
//! - x86_64: `lfence; rdtsc` (time-stamp counter)
//! - aarch64: `isb; mrs cntvct_el0` (virtual counter)
//!
//! Other architectures have no native source and [`NativeClock::new`] fails
//! with [`DbgError::UnsupportedPlatform`] instead of returning zeros.
//!
//! Counter wraparound is not handled; a counter is assumed not to wrap
//! within one measurement window.

use dbgkit_common::error::{DbgError, DbgResult};
use std::time::Instant;

/// Something that can report a cycle count and a monotonic instant.
///
/// Implementations must be monotonic within one thread: two consecutive
/// reads never go backwards.
pub trait ClockSource {
    /// Current cycle count since an arbitrary, fixed origin.
    fn current_cycle_count(&self) -> u64;

    /// Current monotonic wall-clock instant.
    fn current_instant(&self) -> Instant;
}

/// Hardware cycle counter paired with [`Instant::now`].
#[derive(Debug, Clone, Copy)]
pub struct NativeClock {
    _private: (),
}

impl NativeClock {
    /// Whether this target has a native cycle counter.
    pub const SUPPORTED: bool = cfg!(any(target_arch = "x86_64", target_arch = "aarch64"));

    /// Obtain the native clock.
    ///
    /// # Errors
    ///
    /// Returns [`DbgError::UnsupportedPlatform`] on architectures without a
    /// cycle counter.
    pub fn new() -> DbgResult<Self> {
        if Self::SUPPORTED {
            Ok(Self { _private: () })
        } else {
            Err(DbgError::no_cycle_counter())
        }
    }
}

impl ClockSource for NativeClock {
    #[inline]
    fn current_cycle_count(&self) -> u64 {
        read_cycle_counter()
    }

    #[inline]
    fn current_instant(&self) -> Instant {
        Instant::now()
    }
}

/// Read the cycle counter with instruction serialization.
#[cfg(target_arch = "x86_64")]
#[inline]
#[allow(unsafe_code)]
fn read_cycle_counter() -> u64 {
    use std::arch::x86_64::{_mm_lfence, _rdtsc};
    use std::sync::atomic::{compiler_fence, Ordering};

    compiler_fence(Ordering::SeqCst);
    // SAFETY: lfence and rdtsc are available on every x86_64 CPU.
    let cycles = unsafe {
        _mm_lfence();
        _rdtsc()
    };
    compiler_fence(Ordering::SeqCst);
    cycles
}

#[cfg(target_arch = "aarch64")]
#[inline]
#[allow(unsafe_code)]
fn read_cycle_counter() -> u64 {
    use std::sync::atomic::{compiler_fence, Ordering};

    compiler_fence(Ordering::SeqCst);
    let cycles: u64;
    // SAFETY: cntvct_el0 is readable from EL0 on every aarch64 OS we target.
    unsafe {
        std::arch::asm!(
            "isb",
            "mrs {}, cntvct_el0",
            out(reg) cycles,
            options(nostack, nomem),
        );
    }
    compiler_fence(Ordering::SeqCst);
    cycles
}

// Unreachable: NativeClock cannot be constructed on these targets.
#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
#[inline]
fn read_cycle_counter() -> u64 {
    0
}
