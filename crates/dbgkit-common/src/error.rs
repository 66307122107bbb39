use thiserror::Error;

/// Error types for benchmark capture and system diagnostics.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DbgError {
    /// The target architecture or OS lacks the requested counter.
    #[error("unsupported platform: {capability} is not available on this target")]
    UnsupportedPlatform {
        /// Name of the missing capability (e.g. "cycle counter").
        capability: &'static str,
    },

    /// An OS counter source could not be read.
    #[error("probe failed: {0}")]
    Probe(String),

    /// An OS counter source returned data in an unexpected format.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid configuration value.
    #[error("configuration error: {0}")]
    Config(String),
}

impl DbgError {
    /// Shorthand for a missing cycle counter.
    #[must_use]
    pub fn no_cycle_counter() -> Self {
        Self::UnsupportedPlatform {
            capability: "cycle counter",
        }
    }
}

/// Convenience type alias for dbgkit operations.
pub type DbgResult<T> = Result<T, DbgError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_platform_message() {
        let err = DbgError::no_cycle_counter();
        assert_eq!(
            err.to_string(),
            "unsupported platform: cycle counter is not available on this target"
        );
    }

    #[test]
    fn test_probe_message() {
        let err = DbgError::Probe("/proc/meminfo: permission denied".into());
        assert!(err.to_string().starts_with("probe failed"));
    }
}
