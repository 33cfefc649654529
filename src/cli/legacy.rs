//! Backwards-compatible `check container` command
//!
//! The previous single-purpose tool exposed `check container`. This shim keeps
//! that surface and routes it to the `check-container` plugin through the same
//! orchestrator as `run`. Only the lookup differs; lifecycle and rendering are
//! shared. It is expected to be removed once callers have moved to
//! `run check-container`.

use clap::{Arg, ArgAction, ArgMatches, Command};

use crate::config::{self, Environment};
use crate::plugin::{FlagKind, PluginRegistry};
use crate::plugins::container;

use super::Invocation;
use super::run;

/// Name of the legacy command
pub const LEGACY_COMMAND: &str = "check";

/// Name of the subcommand under [`LEGACY_COMMAND`]
pub const CONTAINER_COMMAND: &str = "container";

/// Plugin every legacy invocation resolves to
pub const LEGACY_PLUGIN: &str = container::NAME;

/// Build the `check` command
///
/// The `container` subcommand mirrors the `check-container` plugin's own
/// flags when that plugin is registered.
#[must_use]
pub fn command(registry: &PluginRegistry) -> Command {
    let container = registry.get(LEGACY_PLUGIN).map_or_else(
        || Command::new(CONTAINER_COMMAND).arg(run::plugin_args_arg()),
        |plugin| run::plugin_command(CONTAINER_COMMAND, plugin.as_ref()),
    );

    Command::new(LEGACY_COMMAND)
        .about(
            "Run checks for a container. This subcommand exists for backwards compatibility \
             and will be removed in a future release.",
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .args(run::harness_args())
        .arg(
            Arg::new(config::SUBMIT)
                .short('s')
                .long(config::SUBMIT)
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Submit results if the plugin supports automated submission (env: PFLT_SUBMIT)"),
        )
        .subcommand(container.about("Run the check-container plugin"))
}

/// Resolve `check container ...` into an invocation of [`LEGACY_PLUGIN`]
///
/// The plugin name never comes from the command line or the configuration.
#[must_use]
pub fn invocation(
    registry: &PluginRegistry,
    matches: &ArgMatches,
    environment: Environment,
) -> Option<Invocation> {
    let (_, sub) = matches.subcommand()?;
    let plugin = registry.get(LEGACY_PLUGIN);

    let mut config = run::invocation_config(sub, plugin.as_deref(), environment);
    run::bind_flags(&mut config, sub, &[(config::SUBMIT, FlagKind::Bool)]);

    Some(Invocation {
        plugin: LEGACY_PLUGIN.to_string(),
        config,
        args: run::plugin_args(sub),
    })
}
