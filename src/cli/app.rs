//! CLI definitions and entry point

use std::ffi::OsString;
use std::io::{self, Write};
use std::sync::Arc;

use clap::{Arg, ArgAction, ArgMatches, Command};

use super::{Invocation, legacy, run as run_cmd};
use crate::config::Environment;
use crate::output::{OutputMode, PluginListResult, VersionResult};
use crate::plugin::PluginRegistry;
use crate::plugins;
use crate::runner::Orchestrator;

/// Build the full command tree for `registry`
#[must_use]
pub fn command(registry: &PluginRegistry) -> Command {
    Command::new("preflight")
        .version(crate::VERSION)
        .about("Run certification checks provided by plugins")
        .long_about(
            "Run certification checks provided by plugins.\n\n\
             Each registered plugin is available as `preflight run <plugin>`.\n\
             Results are printed and written to <artifacts>/results.txt.",
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Enable verbose output"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Output in JSON format (machine-readable)"),
        )
        .subcommand(run_cmd::command(registry))
        .subcommand(legacy::command(registry))
        .subcommand(Command::new("list").about("List registered plugins"))
        .subcommand(Command::new("version").about("Show version"))
}

/// Resolve parsed arguments into a plugin invocation
///
/// Returns `None` for commands that do not run a plugin.
#[must_use]
pub fn invocation(
    registry: &PluginRegistry,
    matches: &ArgMatches,
    environment: Environment,
) -> Option<Invocation> {
    match matches.subcommand()? {
        (run_cmd::RUN_COMMAND, sub) => run_cmd::invocation(registry, sub, environment),
        (legacy::LEGACY_COMMAND, sub) => legacy::invocation(registry, sub, environment),
        _ => None,
    }
}

/// Run the CLI with the built-in plugins
pub fn run() -> anyhow::Result<()> {
    let registry = Arc::new(plugins::builtin());
    run_from(registry, std::env::args_os())
}

/// Run the CLI against `registry` with explicit arguments
pub fn run_from<I, T>(registry: Arc<PluginRegistry>, args: I) -> anyhow::Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = command(&registry).get_matches_from(args);

    let filter = if matches.get_flag("verbose") { "debug" } else { "info" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).try_init();

    let output_mode = if matches.get_flag("json") {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    if let Some(invocation) = invocation(&registry, &matches, Environment::Process) {
        let orchestrator = Orchestrator::new(registry);
        orchestrator.run(&invocation.plugin, &invocation.config, &invocation.args)?;
        return Ok(());
    }

    let mut stdout = io::stdout().lock();
    match matches.subcommand() {
        Some(("list", _)) => PluginListResult::from_registry(&registry).render(output_mode, &mut stdout)?,
        Some(("version", _)) => VersionResult::current().render(output_mode, &mut stdout)?,
        _ => {
            VersionResult::current().render(output_mode, &mut stdout)?;
            if output_mode == OutputMode::Human {
                writeln!(stdout, "\nRun 'preflight --help' for usage")?;
                writeln!(stdout, "Run 'preflight list' to see available plugins")?;
            }
        },
    }
    Ok(())
}
