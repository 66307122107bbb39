//! Configuration acceptance tests.

use dbgkit_bench::SamplePlan;
use dbgkit_common::{DbgConfig, DurationUnit, OutputFormat};
use std::io::Write;
use std::time::Duration;

#[test]
fn test_config_file_drives_sample_plan() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[bench]
unit = "milliseconds"
iterations = 25
warmup_iterations = 0
budget = "5ms"

[diagnostics]
format = "json"
"#
    )
    .unwrap();

    let config = DbgConfig::from_file(file.path()).unwrap();
    let plan = SamplePlan::from(&config.bench);

    assert_eq!(config.bench.unit, DurationUnit::Milliseconds);
    assert_eq!(config.diagnostics.format, OutputFormat::Json);
    assert_eq!(plan.iterations, 25);
    assert_eq!(plan.warmup, 0);
    assert_eq!(plan.budget, Some(Duration::from_millis(5)));
}

#[test]
fn test_default_config_roundtrips_through_toml() {
    let config = DbgConfig::default();
    let text = config.to_toml().unwrap();
    let parsed = DbgConfig::from_toml(&text).unwrap();
    assert_eq!(parsed.bench.unit, config.bench.unit);
    assert_eq!(parsed.bench.percentiles, config.bench.percentiles);
    assert!(parsed.bench.budget.is_none());
}
