#![doc = "Common types shared across the dbgkit workspace."]

pub mod config;
pub mod error;
pub mod metrics;
pub mod units;

pub use config::*;
pub use error::*;
pub use metrics::*;
pub use units::*;
