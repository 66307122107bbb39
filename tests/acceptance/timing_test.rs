//! Benchmark capture acceptance tests.
//!
//! # Acceptance Criteria
//!
//! - Consecutive marks never go backwards (cycles and instant)
//! - Elapsed reports between ordered marks are non-negative
//! - `measure` of a no-op stays under 50ms; of a 100ms sleep is at least 100ms
//! - Failures inside a measured operation reach the caller unchanged

use super::common::{skip_without_cycle_counter, spin_for, NOOP_TOLERANCE};
use dbgkit_bench::{
    capture_mark, elapsed_since, end_bench, measure, sample, try_measure, SamplePlan, WriterSink,
};
use dbgkit_common::{DbgError, DurationUnit};
use std::time::Duration;

#[test]
fn test_marks_are_monotonic() {
    if skip_without_cycle_counter("test_marks_are_monotonic") {
        return;
    }

    let mut previous = capture_mark().expect("capture failed");
    for _ in 0..10_000 {
        let next = capture_mark().expect("capture failed");
        assert!(next.cycle_count >= previous.cycle_count);
        assert!(next.timestamp >= previous.timestamp);
        previous = next;
    }
}

#[test]
fn test_elapsed_between_ordered_marks() {
    if skip_without_cycle_counter("test_elapsed_between_ordered_marks") {
        return;
    }

    let a = capture_mark().unwrap();
    spin_for(Duration::from_millis(5));
    let b = capture_mark().unwrap();

    let since_a = elapsed_since(a, DurationUnit::Microseconds).unwrap();
    let since_b = elapsed_since(b, DurationUnit::Microseconds).unwrap();

    assert!(since_a.elapsed >= 5_000);
    assert!(since_a.cycles > 0);
    assert!(since_a.cycles >= since_b.cycles);
    assert!(since_a.duration >= since_b.duration);
}

#[test]
fn test_elapsed_truncates_to_unit() {
    if skip_without_cycle_counter("test_elapsed_truncates_to_unit") {
        return;
    }

    let mark = capture_mark().unwrap();
    std::thread::sleep(Duration::from_millis(30));
    let report = elapsed_since(mark, DurationUnit::Seconds).unwrap();
    assert_eq!(report.elapsed, 0);
    assert!(report.duration >= Duration::from_millis(30));
    assert_eq!(report.unit.label(), "seconds");
}

#[test]
fn test_unsupported_platform_fails_fast() {
    if skip_without_cycle_counter("test_unsupported_platform_fails_fast") {
        assert!(matches!(
            capture_mark(),
            Err(DbgError::UnsupportedPlatform { .. })
        ));
    }
}

#[test]
fn test_measure_noop_under_tolerance() {
    let ms = measure(|| {}, DurationUnit::Milliseconds);
    assert!(
        u128::from(ms) < NOOP_TOLERANCE.as_millis(),
        "noop took {ms}ms"
    );
}

#[test]
fn test_measure_sleep_never_below_request() {
    let ms = measure(
        || std::thread::sleep(Duration::from_millis(100)),
        DurationUnit::Milliseconds,
    );
    assert!(ms >= 100, "sleep(100ms) measured as {ms}ms");
}

#[test]
fn test_measure_default_unit_is_microseconds() {
    let us = measure(
        || std::thread::sleep(Duration::from_millis(2)),
        DurationUnit::default(),
    );
    assert!(us >= 2_000);
}

#[test]
fn test_measure_failure_propagates() {
    let outcome = std::panic::catch_unwind(|| {
        measure(|| panic!("operation failed"), DurationUnit::Milliseconds)
    });
    let payload = outcome.expect_err("panic should propagate");
    assert_eq!(payload.downcast_ref::<&str>(), Some(&"operation failed"));

    let err = try_measure(
        || Err(std::io::Error::new(std::io::ErrorKind::Other, "boom")),
        DurationUnit::Milliseconds,
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "boom");
}

#[test]
fn test_end_bench_writes_labelled_line() {
    if skip_without_cycle_counter("test_end_bench_writes_labelled_line") {
        return;
    }

    let mark = capture_mark().unwrap();
    let mut sink = WriterSink::new(Vec::new());
    let report = end_bench(mark, DurationUnit::Milliseconds, &mut sink).unwrap();
    let line = String::from_utf8(sink.into_inner()).unwrap();

    let expected = format!(
        "Clock cycles: {}, milliseconds: {}\n",
        report.cycles, report.elapsed
    );
    assert_eq!(line, expected);
}

#[test]
fn test_sampled_sleep_respects_floor() {
    let plan = SamplePlan {
        iterations: 20,
        warmup: 2,
        histogram_size: 64,
        budget: None,
    };
    let hist = sample(&plan, || std::thread::sleep(Duration::from_millis(1)));

    assert_eq!(hist.recorded(), 20);
    assert!(hist.min().unwrap() >= Duration::from_millis(1));
    assert!(hist.percentile(50.0).unwrap() <= hist.max().unwrap());
}
