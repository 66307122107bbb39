//! Configuration structures for dbgkit.
//!
//! Supports TOML deserialization with defaults for every field, so an
//! empty file is a valid configuration.

use crate::units::DurationUnit;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DbgConfig {
    /// Repeated benchmark settings.
    pub bench: BenchConfig,

    /// System diagnostics settings.
    pub diagnostics: DiagnosticsConfig,
}

/// Settings for repeated benchmark sampling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// Unit used in reports.
    pub unit: DurationUnit,

    /// Timed iterations.
    pub iterations: u64,

    /// Untimed iterations run before sampling starts.
    pub warmup_iterations: u64,

    /// Size of the latency histogram ring buffer.
    pub histogram_size: usize,

    /// Percentiles to report (e.g., [50, 90, 99]).
    pub percentiles: Vec<f64>,

    /// Per-iteration budget; slower iterations count as overruns.
    #[serde(with = "humantime_serde_opt", skip_serializing_if = "Option::is_none")]
    pub budget: Option<Duration>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            unit: DurationUnit::Microseconds,
            iterations: 1_000,
            warmup_iterations: 100,
            histogram_size: 10_000,
            percentiles: vec![50.0, 90.0, 99.0, 99.9],
            budget: None,
        }
    }
}

/// Output format for diagnostics snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Aligned human-readable lines.
    #[default]
    Text,
    /// Single JSON document.
    Json,
}

/// System diagnostics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Wall time between the baseline and the CPU sample.
    #[serde(with = "humantime_serde")]
    pub cpu_sample_interval: Duration,

    /// Snapshot output format.
    pub format: OutputFormat,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            cpu_sample_interval: Duration::from_millis(250),
            format: OutputFormat::Text,
        }
    }
}

impl DbgConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or a value is out of range.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Reject values that cannot drive a benchmark run.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bench.iterations == 0 {
            return Err(ConfigError::Invalid(
                "bench.iterations must be at least 1".into(),
            ));
        }
        if let Some(bad) = self
            .bench
            .percentiles
            .iter()
            .find(|p| !(0.0..=100.0).contains(*p))
        {
            return Err(ConfigError::Invalid(format!(
                "bench.percentiles contains {bad}, expected 0..=100"
            )));
        }
        Ok(())
    }
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File I/O error.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error.
    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("failed to serialize TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Parsed but semantically invalid.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Serde helper module for `Duration` using humantime format.
mod humantime_serde {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = humantime::format_duration(*duration).to_string();
        serializer.serialize_str(&s)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}

/// Same as [`humantime_serde`] for optional durations; `None` is omitted.
mod humantime_serde_opt {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    #[allow(clippy::ref_option)]
    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_str(&humantime::format_duration(*d).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|s| humantime::parse_duration(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}
