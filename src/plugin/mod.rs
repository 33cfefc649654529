//! Plugin contract
//!
//! A plugin is a unit of check logic the harness drives through a fixed
//! lifecycle:
//!
//! 1. [`Plugin::init`] with the invocation context, configuration and
//!    residual command-line arguments
//! 2. [`Plugin::execute_checks`]
//! 3. [`Plugin::results`]
//! 4. [`Plugin::submit`], only when submission was requested
//!
//! The harness never constructs plugins. It looks them up by name in a
//! [`PluginRegistry`] populated at startup.

mod registry;
mod results;

pub use registry::PluginRegistry;
pub use results::{CheckOutcome, Disposition, ResultSet};

use crate::config::Config;
use crate::context::ExecutionContext;

/// Kind of value a plugin flag takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagKind {
    /// `--flag <VALUE>`
    String,
    /// `--flag`, bound as `true` when present
    Bool,
}

/// Command-line flag declared by a plugin
///
/// The harness adds it to the plugin's subcommand and binds the value under
/// `name` in the invocation configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PluginFlag {
    /// Long flag name, also the configuration key
    pub name: &'static str,
    /// Help text
    pub help: &'static str,
    /// Value kind
    pub kind: FlagKind,
    /// Default registered in the configuration
    pub default: Option<&'static str>,
}

impl PluginFlag {
    /// A string-valued flag
    #[must_use]
    pub const fn string(name: &'static str, help: &'static str) -> Self {
        Self {
            name,
            help,
            kind: FlagKind::String,
            default: None,
        }
    }

    /// A boolean switch
    #[must_use]
    pub const fn bool(name: &'static str, help: &'static str) -> Self {
        Self {
            name,
            help,
            kind: FlagKind::Bool,
            default: None,
        }
    }

    /// Set the default value
    #[must_use]
    pub const fn with_default(mut self, default: &'static str) -> Self {
        self.default = Some(default);
        self
    }
}

/// Capability set every plugin implements
///
/// Plugins are shared through the registry, so lifecycle methods take `&self`
/// and keep per-run state behind interior mutability.
pub trait Plugin: Send + Sync {
    /// Unique name; also the subcommand invoking the plugin
    fn name(&self) -> &str;

    /// Version string reported in logs
    fn version(&self) -> &str;

    /// One-line description for help output
    fn description(&self) -> &str {
        ""
    }

    /// Flags the plugin reads from its configuration
    fn flags(&self) -> Vec<PluginFlag> {
        Vec::new()
    }

    /// Prepare for execution
    ///
    /// `config` is a view owned by this invocation; changes made to it are not
    /// visible to the caller.
    fn init(&self, ctx: &ExecutionContext, config: &mut Config, args: &[String]) -> anyhow::Result<()>;

    /// Run every check
    fn execute_checks(&self, ctx: &ExecutionContext) -> anyhow::Result<()>;

    /// Outcomes of the checks run by [`Plugin::execute_checks`]
    fn results(&self, ctx: &ExecutionContext) -> ResultSet;

    /// Submit results to the certification backend
    fn submit(&self, ctx: &ExecutionContext) -> anyhow::Result<()>;
}

impl std::fmt::Debug for dyn Plugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plugin")
            .field("name", &self.name())
            .field("version", &self.version())
            .finish()
    }
}
