//! dbgkit command-line entry point.
//!
//! Takes system diagnostics snapshots and samples built-in workloads with
//! the benchmark capture facility.

mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use dbgkit_bench::{capture_mark, end_bench, sample, SamplePlan, TracingSink, WriterSink};
use dbgkit_common::config::{BenchConfig, DbgConfig, OutputFormat};
use dbgkit_common::units::DurationUnit;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::output::{render_bench, render_snapshot, BenchSummary};

/// dbgkit command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "dbgkit",
    about = "Benchmark capture and process diagnostics",
    version,
    long_about = None
)]
struct Args {
    /// Path to a configuration file (TOML).
    #[arg(long, short = 'c', value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, short = 'l', default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print memory and CPU utilisation.
    Snapshot {
        /// CPU sampling window (overrides config).
        #[arg(long, value_parser = humantime::parse_duration)]
        interval: Option<Duration>,

        /// Output format (overrides config).
        #[arg(long, value_enum)]
        format: Option<FormatArg>,
    },

    /// Sample a built-in workload and print latency statistics.
    Bench {
        /// Workload to run each iteration.
        #[arg(long, value_enum, default_value = "spin")]
        workload: Workload,

        /// Length of one workload iteration.
        #[arg(long, default_value = "1ms", value_parser = humantime::parse_duration)]
        duration: Duration,

        /// Timed iterations (overrides config).
        #[arg(long, short = 'n')]
        iterations: Option<u64>,

        /// Reporting unit, e.g. ns, us, ms, s (overrides config).
        #[arg(long, short = 'u')]
        unit: Option<DurationUnit>,

        /// Output format.
        #[arg(long, value_enum, default_value = "text")]
        format: FormatArg,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Workload {
    /// Busy-wait on the monotonic clock.
    Spin,
    /// Sleep the thread.
    Sleep,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum FormatArg {
    Text,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level);

    info!(version = env!("CARGO_PKG_VERSION"), "Starting dbgkit");

    let config = load_config(&args)?;

    match args.command {
        Command::Snapshot { interval, format } => {
            let interval = interval.unwrap_or(config.diagnostics.cpu_sample_interval);
            let format = format.map_or(config.diagnostics.format, OutputFormat::from);
            run_snapshot(interval, format, &mut io::stdout().lock())
        }
        Command::Bench {
            workload,
            duration,
            iterations,
            unit,
            format,
        } => {
            let mut bench = config.bench.clone();
            if let Some(n) = iterations {
                anyhow::ensure!(n > 0, "--iterations must be at least 1");
                bench.iterations = n;
            }
            if let Some(unit) = unit {
                bench.unit = unit;
            }
            run_bench(
                workload,
                duration,
                &bench,
                format.into(),
                &mut io::stdout().lock(),
            )
        }
    }
}

/// Initialize logging with the specified log level.
fn init_logging(level: &str) {
    let filter = format!(
        "dbgkit={level},dbgkit_bench={level},dbgkit_diag={level},dbgkit_common={level}"
    );

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&filter)),
        )
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Load configuration from file or use defaults.
///
/// Resolution priority (first existing file wins):
/// 1. Command-line `--config` argument
/// 2. `DBGKIT_CONFIG_PATH` environment variable
/// 3. `/etc/dbgkit/config.toml` (system path)
/// 4. `config/default.toml` (local development)
/// 5. Built-in defaults
fn load_config(args: &Args) -> Result<DbgConfig> {
    if let Some(config_path) = &args.config {
        info!(?config_path, "Loading config from command-line argument");
        return DbgConfig::from_file(config_path)
            .with_context(|| format!("Failed to load config from {config_path:?}"));
    }

    if let Ok(env_path) = std::env::var("DBGKIT_CONFIG_PATH") {
        let config_path = PathBuf::from(&env_path);
        if config_path.exists() {
            info!(?config_path, "Loading config from DBGKIT_CONFIG_PATH");
            return DbgConfig::from_file(&config_path).with_context(|| {
                format!("Failed to load config from DBGKIT_CONFIG_PATH={env_path:?}")
            });
        }
        warn!(
            path = %env_path,
            "DBGKIT_CONFIG_PATH set but file does not exist, checking other locations"
        );
    }

    for candidate in ["/etc/dbgkit/config.toml", "config/default.toml"] {
        let path = PathBuf::from(candidate);
        if path.exists() {
            info!(?path, "Loading config");
            return DbgConfig::from_file(&path)
                .with_context(|| format!("Failed to load config from {path:?}"));
        }
    }

    info!("No config file found, using built-in defaults");
    Ok(DbgConfig::default())
}

#[cfg(target_os = "linux")]
fn run_snapshot(interval: Duration, format: OutputFormat, out: &mut impl Write) -> Result<()> {
    use dbgkit_diag::{CpuSampler, DiagnosticsSnapshot, NativeCpuCounters, NativeMemoryProbe};

    let mut sampler =
        CpuSampler::new(NativeCpuCounters::new()).context("Failed to take CPU baseline")?;
    let memory = NativeMemoryProbe::new();
    let snapshot = DiagnosticsSnapshot::collect_after(&memory, &mut sampler, interval)
        .context("Failed to collect diagnostics")?;
    writeln!(out, "{}", render_snapshot(&snapshot, format)?)?;
    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn run_snapshot(_interval: Duration, _format: OutputFormat, _out: &mut impl Write) -> Result<()> {
    anyhow::bail!("system diagnostics are only available on Linux")
}

/// Sample `workload` and write the summary to `out`.
///
/// In text mode the elapsed report for the whole run follows the summary as
/// its own line; in JSON mode it is embedded in the document and also logged.
fn run_bench(
    workload: Workload,
    duration: Duration,
    bench: &BenchConfig,
    format: OutputFormat,
    out: &mut impl Write,
) -> Result<()> {
    let label = format!(
        "{} {}",
        match workload {
            Workload::Spin => "spin",
            Workload::Sleep => "sleep",
        },
        humantime::format_duration(duration)
    );
    info!(workload = %label, iterations = bench.iterations, "Sampling workload");

    let mark = match capture_mark() {
        Ok(mark) => Some(mark),
        Err(e) => {
            warn!(error = %e, "Cycle counter unavailable, reporting wall time only");
            None
        }
    };

    let plan = SamplePlan::from(bench);
    let histogram = match workload {
        Workload::Spin => sample(&plan, || spin_for(duration)),
        Workload::Sleep => sample(&plan, || std::thread::sleep(duration)),
    };

    let mut summary = BenchSummary::new(label, &histogram, bench.unit, &bench.percentiles);
    match format {
        OutputFormat::Json => {
            if let Some(mark) = mark {
                let report = end_bench(mark, bench.unit, &mut TracingSink)
                    .context("Failed to compute elapsed report")?;
                summary.elapsed = Some(report);
            }
            writeln!(out, "{}", render_bench(&summary, format)?)?;
        }
        OutputFormat::Text => {
            writeln!(out, "{}", render_bench(&summary, format)?)?;
            if let Some(mark) = mark {
                end_bench(mark, bench.unit, &mut WriterSink::new(&mut *out))
                    .context("Failed to compute elapsed report")?;
            }
        }
    }
    out.flush()?;
    Ok(())
}

fn spin_for(duration: Duration) {
    let start = Instant::now();
    while start.elapsed() < duration {
        std::hint::spin_loop();
    }
}
