//! preflight - execution harness for pluggable certification checks
//!
//! The harness selects a registered plugin, prepares its logger and artifact
//! writer, drives it through `init`, `execute_checks`, `results` and
//! optionally `submit`, and writes the rendered report to stdout and
//! `<artifacts>/results.txt`.

// Deny all clippy warnings in this crate
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unused_import_braces,
    unused_qualifications
)]
// Allow some pedantic lints that are too noisy or not applicable
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cargo_common_metadata
)]

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod artifacts;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod output;
pub mod plugin;
pub mod plugins;
pub mod runner;
pub mod sink;

pub use error::{RunError, SetupError};
pub use plugin::{Plugin, PluginRegistry, ResultSet};
pub use runner::{Orchestrator, RunSummary};
