//! CLI layer for preflight
//!
//! - [`app`] - command tree and entry point
//! - [`run`] - `run <plugin>`, one subcommand per registered plugin
//! - [`legacy`] - `check container`, kept for backwards compatibility

pub mod app;
pub mod legacy;
pub mod run;

use crate::config::Config;

// Re-export main entry point
pub use app::run;

/// A plugin run resolved from the command line
#[derive(Debug, Clone)]
pub struct Invocation {
    /// Registered name of the plugin to run
    pub plugin: String,
    /// Configuration owned by this invocation
    pub config: Config,
    /// Residual arguments for the plugin
    pub args: Vec<String>,
}
