//! CPU utilisation sampling.
//!
//! Percentages are computed between consecutive calls, so the sampler keeps
//! the previous readings. It is an explicit context object: construct it
//! once, pass it to each query, drop it when done.

use crate::probe::{CpuCounters, CpuTicks, NO_INTERVAL};
use dbgkit_common::error::DbgResult;
use std::time::{Duration, Instant};
use tracing::debug;

/// Stateful CPU percentage sampler.
#[derive(Debug)]
pub struct CpuSampler<C: CpuCounters> {
    counters: C,
    last_ticks: CpuTicks,
    last_process_cpu: Duration,
    last_wall: Instant,
}

impl<C: CpuCounters> CpuSampler<C> {
    /// Create a sampler and take the baseline readings.
    ///
    /// # Errors
    ///
    /// Returns an error if either baseline counter cannot be read.
    pub fn new(counters: C) -> DbgResult<Self> {
        let last_ticks = counters.system_ticks()?;
        let last_process_cpu = counters.process_cpu_time()?;
        let last_wall = counters.now();
        debug!(cpus = counters.cpu_count(), "CPU sampler baseline taken");
        Ok(Self {
            counters,
            last_ticks,
            last_process_cpu,
            last_wall,
        })
    }

    /// System-wide busy percentage since the previous call (or construction).
    ///
    /// Returns [`NO_INTERVAL`] if no ticks have elapsed.
    ///
    /// # Errors
    ///
    /// Returns an error if the system counters cannot be read; the previous
    /// baseline is kept in that case.
    pub fn system_percent(&mut self) -> DbgResult<f64> {
        let ticks = self.counters.system_ticks()?;
        let total = ticks.total.saturating_sub(self.last_ticks.total);
        let idle = ticks.idle.saturating_sub(self.last_ticks.idle);
        self.last_ticks = ticks;

        if total == 0 {
            return Ok(NO_INTERVAL);
        }
        #[allow(clippy::cast_precision_loss)]
        let busy = total.saturating_sub(idle) as f64 / total as f64;
        Ok(busy * 100.0)
    }

    /// This process's share of total machine capacity since the previous call.
    ///
    /// 100% means every online processor was busy running this process.
    /// Returns [`NO_INTERVAL`] if no wall time has elapsed.
    ///
    /// # Errors
    ///
    /// Returns an error if the process clock cannot be read.
    pub fn process_percent(&mut self) -> DbgResult<f64> {
        let cpu = self.counters.process_cpu_time()?;
        let now = self.counters.now();
        let wall = now.saturating_duration_since(self.last_wall);
        let used = cpu.saturating_sub(self.last_process_cpu);
        self.last_process_cpu = cpu;
        self.last_wall = now;

        if wall.is_zero() {
            return Ok(NO_INTERVAL);
        }
        #[allow(clippy::cast_precision_loss)]
        let cpus = self.counters.cpu_count().max(1) as f64;
        Ok(used.as_secs_f64() / wall.as_secs_f64() / cpus * 100.0)
    }

    /// The counter source.
    pub fn counters(&self) -> &C {
        &self.counters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct ScriptedCounters {
        ticks: Cell<CpuTicks>,
        process: Cell<Duration>,
        origin: Instant,
        wall: Cell<Duration>,
        cpus: usize,
    }

    impl ScriptedCounters {
        fn new(cpus: usize) -> Self {
            Self {
                ticks: Cell::new(CpuTicks {
                    total: 1_000,
                    idle: 800,
                }),
                process: Cell::new(Duration::ZERO),
                origin: Instant::now(),
                wall: Cell::new(Duration::ZERO),
                cpus,
            }
        }

        fn tick(&self, total: u64, idle: u64) {
            let t = self.ticks.get();
            self.ticks.set(CpuTicks {
                total: t.total + total,
                idle: t.idle + idle,
            });
        }

        fn run(&self, cpu: Duration, wall: Duration) {
            self.process.set(self.process.get() + cpu);
            self.wall.set(self.wall.get() + wall);
        }
    }

    impl CpuCounters for &ScriptedCounters {
        fn system_ticks(&self) -> DbgResult<CpuTicks> {
            Ok(self.ticks.get())
        }

        fn process_cpu_time(&self) -> DbgResult<Duration> {
            Ok(self.process.get())
        }

        fn now(&self) -> Instant {
            self.origin + self.wall.get()
        }

        fn cpu_count(&self) -> usize {
            self.cpus
        }
    }

    #[test]
    fn test_system_percent() {
        let counters = ScriptedCounters::new(4);
        let mut sampler = CpuSampler::new(&counters).unwrap();

        counters.tick(200, 150);
        let pct = sampler.system_percent().unwrap();
        assert!((pct - 25.0).abs() < 1e-9);

        counters.tick(100, 0);
        let pct = sampler.system_percent().unwrap();
        assert!((pct - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_system_percent_no_interval() {
        let counters = ScriptedCounters::new(1);
        let mut sampler = CpuSampler::new(&counters).unwrap();
        assert_eq!(sampler.system_percent().unwrap(), NO_INTERVAL);
    }

    #[test]
    fn test_process_percent_scaled_by_cpus() {
        let counters = ScriptedCounters::new(4);
        let mut sampler = CpuSampler::new(&counters).unwrap();

        // One full core out of four for the whole interval.
        counters.run(Duration::from_millis(100), Duration::from_millis(100));
        let pct = sampler.process_percent().unwrap();
        assert!((pct - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_process_percent_no_interval() {
        let counters = ScriptedCounters::new(2);
        let mut sampler = CpuSampler::new(&counters).unwrap();
        counters.run(Duration::from_millis(5), Duration::ZERO);
        assert_eq!(sampler.process_percent().unwrap(), NO_INTERVAL);
    }

    #[test]
    fn test_process_percent_idle_process() {
        let counters = ScriptedCounters::new(2);
        let mut sampler = CpuSampler::new(&counters).unwrap();
        counters.run(Duration::ZERO, Duration::from_secs(1));
        assert_eq!(sampler.process_percent().unwrap(), 0.0);
    }
}
