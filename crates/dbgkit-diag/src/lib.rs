//! System metrics provider for dbgkit.
//!
//! Memory and CPU figures sit behind the [`MemoryProbe`] and [`CpuCounters`]
//! capability traits. Linux is the only platform with an implementation;
//! elsewhere [`NativeMemoryProbe`] and [`NativeCpuCounters`] do not exist.
//!
//! ```no_run
//! # #[cfg(target_os = "linux")]
//! # fn main() -> dbgkit_common::DbgResult<()> {
//! use dbgkit_diag::{CpuSampler, DiagnosticsSnapshot, NativeCpuCounters, NativeMemoryProbe};
//!
//! let mut sampler = CpuSampler::new(NativeCpuCounters::new())?;
//! let snapshot = DiagnosticsSnapshot::collect_after(
//!     &NativeMemoryProbe::new(),
//!     &mut sampler,
//!     std::time::Duration::from_millis(250),
//! )?;
//! println!("{snapshot}");
//! # Ok(())
//! # }
//! # #[cfg(not(target_os = "linux"))]
//! # fn main() {}
//! ```

pub mod cpu;
pub mod probe;
pub mod snapshot;

#[cfg(target_os = "linux")]
pub mod linux;

pub use cpu::CpuSampler;
pub use probe::{CpuCounters, CpuTicks, MemoryProbe, MemorySnapshot, NO_INTERVAL};
pub use snapshot::DiagnosticsSnapshot;

#[cfg(target_os = "linux")]
pub use linux::{ProcCounters as NativeCpuCounters, ProcMemory as NativeMemoryProbe};
