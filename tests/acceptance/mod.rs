//! Integration tests for dbgkit acceptance testing.

mod common;
mod config_test;
mod diagnostics_test;
mod timing_test;
