//! cargen library crate: re-exports for integration tests.
//!
//! The primary interface is the `cargen` binary. This lib.rs exposes the
//! model, the dataset codec, the merge engine and the command runners so
//! integration tests can drive them without going through the CLI.

pub mod config;
pub mod dataset;
pub mod error;
pub mod import_cmd;
pub mod interchange;
pub mod merge;
pub mod merge_cmd;
pub mod model;
pub mod telemetry;
