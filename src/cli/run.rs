//! `run <plugin>`: one subcommand per registered plugin

use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};

use crate::config::{self, Config, EnvBinding, Environment};
use crate::plugin::{FlagKind, Plugin, PluginFlag, PluginRegistry};

use super::Invocation;

/// Name of the modern command
pub const RUN_COMMAND: &str = "run";

/// Id of the positional arguments forwarded to the plugin
pub const PLUGIN_ARGS: &str = "args";

/// Flags every plugin subcommand accepts
pub(super) const HARNESS_FLAGS: [(&str, FlagKind); 3] = [
    (config::LOG_FILE, FlagKind::String),
    (config::LOG_LEVEL, FlagKind::String),
    (config::ARTIFACTS, FlagKind::String),
];

/// `--logfile`, `--loglevel` and `--artifacts`, shared by every plugin subcommand
pub(super) fn harness_args() -> [Arg; 3] {
    [
        Arg::new(config::LOG_FILE)
            .long(config::LOG_FILE)
            .value_name("PATH")
            .global(true)
            .help("Where the execution logfile will be written (env: PFLT_LOGFILE)"),
        Arg::new(config::LOG_LEVEL)
            .long(config::LOG_LEVEL)
            .value_name("LEVEL")
            .global(true)
            .help("Verbosity of the harness itself: error, warn, info, debug, trace (env: PFLT_LOGLEVEL)"),
        Arg::new(config::ARTIFACTS)
            .long(config::ARTIFACTS)
            .value_name("DIR")
            .global(true)
            .help("Where check-specific artifacts will be written (env: PFLT_ARTIFACTS)"),
    ]
}

/// Build the `run` command with a subcommand for every plugin in `registry`
#[must_use]
pub fn command(registry: &PluginRegistry) -> Command {
    let mut cmd = Command::new(RUN_COMMAND)
        .about("Run the checks of a registered plugin")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .args(harness_args());

    for (name, plugin) in registry.iter() {
        cmd = cmd.subcommand(plugin_command(name, plugin.as_ref()));
    }
    cmd
}

/// Subcommand invoking `plugin` under `name`
#[must_use]
pub fn plugin_command(name: &str, plugin: &dyn Plugin) -> Command {
    let mut cmd = Command::new(name.to_string())
        .about(plugin.description().to_string())
        .version(plugin.version().to_string())
        .arg(plugin_args_arg());

    for flag in plugin.flags() {
        cmd = cmd.arg(flag_arg(&flag));
    }
    cmd
}

/// Positional arguments collected for the plugin
///
/// Flags may appear before, between or after them. Values starting with `-`
/// go after `--`.
pub(super) fn plugin_args_arg() -> Arg {
    Arg::new(PLUGIN_ARGS)
        .value_name("ARGS")
        .num_args(0..)
        .help("Arguments passed to the plugin")
}

fn flag_arg(flag: &PluginFlag) -> Arg {
    let arg = Arg::new(flag.name).long(flag.name).help(flag.help);
    match flag.kind {
        FlagKind::Bool => arg.action(ArgAction::SetTrue),
        FlagKind::String => arg.value_name("VALUE"),
    }
}

/// Build the configuration of one invocation
///
/// Defaults come first, then the plugin's flag defaults, then every flag that
/// was given explicitly on the command line. The `PFLT_` environment binding
/// is attached so `PFLT_LOGFILE` and friends are honoured.
#[must_use]
pub fn invocation_config(
    matches: &ArgMatches,
    plugin: Option<&dyn Plugin>,
    environment: Environment,
) -> Config {
    let mut config = Config::with_environment(environment);
    config.set_harness_defaults();

    bind_flags(&mut config, matches, &HARNESS_FLAGS);

    let plugin_flags = plugin.map(|p| p.flags()).unwrap_or_default();
    for flag in &plugin_flags {
        if let Some(default) = flag.default {
            config.set_default(flag.name, default);
        }
    }
    let keys: Vec<_> = plugin_flags.iter().map(|f| (f.name, f.kind)).collect();
    bind_flags(&mut config, matches, &keys);

    config.with_env_binding(EnvBinding::harness())
}

/// Bind each flag in `flags` that was given on the command line
pub(super) fn bind_flags(config: &mut Config, matches: &ArgMatches, flags: &[(&str, FlagKind)]) {
    for &(key, kind) in flags {
        if matches.value_source(key) != Some(ValueSource::CommandLine) {
            continue;
        }
        match kind {
            FlagKind::String => {
                if let Ok(Some(value)) = matches.try_get_one::<String>(key) {
                    config.bind_flag(key, value.clone());
                }
            },
            FlagKind::Bool => {
                if let Ok(Some(value)) = matches.try_get_one::<bool>(key) {
                    config.bind_flag(key, value.to_string());
                }
            },
        }
    }
}

/// Positional arguments forwarded to the plugin
pub(super) fn plugin_args(matches: &ArgMatches) -> Vec<String> {
    matches
        .try_get_many::<String>(PLUGIN_ARGS)
        .ok()
        .flatten()
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

/// Resolve `run <plugin> ...` into an invocation
#[must_use]
pub fn invocation(
    registry: &PluginRegistry,
    matches: &ArgMatches,
    environment: Environment,
) -> Option<Invocation> {
    let (name, sub) = matches.subcommand()?;
    let plugin = registry.get(name);
    Some(Invocation {
        plugin: name.to_string(),
        config: invocation_config(sub, plugin.as_deref(), environment),
        args: plugin_args(sub),
    })
}
