//! Drives one plugin through its lifecycle

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use super::lifecycle::{Lifecycle, LifecycleState, Stage};
use super::report::{self, FileResultWriter, Formatter, ResultWriter, RESULTS_FILE};
use crate::artifacts::{ArtifactWriter, FilesystemWriter};
use crate::config::{self, Config, EnvBinding};
use crate::context::{CancellationToken, ExecutionContext};
use crate::error::{RunError, SetupError};
use crate::logging::Logger;
use crate::plugin::{PluginRegistry, ResultSet};
use crate::sink::{Console, Tee};

/// What a completed run produced
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Plugin name
    pub plugin: String,
    /// Plugin version
    pub version: String,
    /// States visited, oldest first
    pub states: Vec<LifecycleState>,
    /// Results reported by the plugin
    pub results: ResultSet,
    /// Where the report was written
    pub report_path: PathBuf,
    /// Whether the report reached both sinks
    pub report_written: bool,
    /// Whether the plugin submitted its results
    pub submitted: bool,
}

/// Runs registered plugins
///
/// One call to [`Orchestrator::run`] is one invocation: it builds a fresh
/// logger, artifact writer and configuration view, and shares nothing mutable
/// with other invocations. The orchestrator itself is immutable and can be
/// used from several threads at once.
pub struct Orchestrator {
    registry: Arc<PluginRegistry>,
    result_writer: Arc<dyn ResultWriter>,
    formatter: Formatter,
    console: Console,
    diagnostics: Console,
    cancellation: CancellationToken,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("registry", &self.registry)
            .field("console", &self.console)
            .field("diagnostics", &self.diagnostics)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Create an orchestrator printing to stdout and logging to stderr
    #[must_use]
    pub fn new(registry: Arc<PluginRegistry>) -> Self {
        Self {
            registry,
            result_writer: Arc::new(FileResultWriter),
            formatter: report::format_text,
            console: Console::Stdout,
            diagnostics: Console::Stderr,
            cancellation: CancellationToken::new(),
        }
    }

    /// Use `writer` to open the results file
    #[must_use]
    pub fn with_result_writer(mut self, writer: Arc<dyn ResultWriter>) -> Self {
        self.result_writer = writer;
        self
    }

    /// Render results with `formatter`
    #[must_use]
    pub fn with_formatter(mut self, formatter: Formatter) -> Self {
        self.formatter = formatter;
        self
    }

    /// Echo the report to `console` instead of stdout
    #[must_use]
    pub fn with_console(mut self, console: Console) -> Self {
        self.console = console;
        self
    }

    /// Send log lines to `diagnostics` instead of stderr
    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: Console) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Hand `token` to every plugin through its context
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// The registry plugins are looked up in
    #[must_use]
    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    /// Run the plugin registered as `plugin_name`
    ///
    /// `config` is only read. The plugin receives a derived view carrying the
    /// `PFLT_` environment binding, so nothing it does to its configuration
    /// reaches the caller.
    pub fn run(&self, plugin_name: &str, config: &Config, args: &[String]) -> Result<RunSummary, RunError> {
        let plugin = self
            .registry
            .get(plugin_name)
            .ok_or_else(|| RunError::PluginNotFound(plugin_name.to_string()))?;

        let name = plugin.name().to_string();
        let version = plugin.version().to_string();

        let logger = Logger::from_config(config, &self.diagnostics);
        let setup_failed = |err: SetupError| {
            logger.error(
                &err,
                "unable to prepare plugin outputs",
                &[("name", &name), ("version", &version), ("stage", &"setup")],
            );
            RunError::Setup(err)
        };

        let artifacts: Arc<dyn ArtifactWriter> = match FilesystemWriter::from_config(config) {
            Ok(writer) => Arc::new(writer),
            Err(err) => return Err(setup_failed(err)),
        };
        let ctx = ExecutionContext::new(
            logger.with_value("emitter", "plugin"),
            artifacts,
            self.cancellation.clone(),
        );

        let mut plugin_config = config.with_env_binding(EnvBinding::harness());

        // The results destination must be writable before any check runs.
        let report_path = match ctx.artifacts().write_file(RESULTS_FILE, &mut io::empty()) {
            Ok(path) => path,
            Err(err) => return Err(setup_failed(err)),
        };
        let results_file = match self.result_writer.open_file(&report_path) {
            Ok(file) => file,
            Err(source) => {
                return Err(setup_failed(SetupError::OpenResults {
                    path: report_path,
                    source,
                }));
            },
        };
        let mut output = Tee::new(self.console.writer(), results_file);

        logger.info("Calling plugin", &[("name", &name), ("version", &version)]);

        let mut lifecycle = Lifecycle::new();
        let fail = |lifecycle: &mut Lifecycle, stage: Stage, source: anyhow::Error| {
            logger.error(
                &format_args!("{source:#}"),
                stage.failure_message(),
                &[("name", &name), ("version", &version), ("stage", &stage)],
            );
            lifecycle.fail();
            RunError::Plugin {
                plugin: name.clone(),
                version: version.clone(),
                stage,
                states: lifecycle.history().to_vec(),
                source,
            }
        };

        if let Err(source) = plugin.init(&ctx, &mut plugin_config, args) {
            return Err(fail(&mut lifecycle, Stage::Init, source));
        }
        lifecycle.advance(LifecycleState::Initialized)?;

        if let Err(source) = plugin.execute_checks(&ctx) {
            return Err(fail(&mut lifecycle, Stage::ExecuteChecks, source));
        }
        lifecycle.advance(LifecycleState::ChecksExecuted)?;

        let results = plugin.results(&ctx);
        let rendered = match (self.formatter)(&results) {
            Ok(bytes) => bytes,
            Err(source) => {
                logger.error(
                    &source,
                    Stage::Results.failure_message(),
                    &[("name", &name), ("version", &version), ("stage", &Stage::Results)],
                );
                lifecycle.fail();
                return Err(RunError::Format {
                    plugin: name.clone(),
                    states: lifecycle.into_history(),
                    source,
                });
            },
        };

        let report_written = match write_report(&mut output, &rendered) {
            Ok(()) => true,
            Err(err) => {
                logger.error(&err, "unable to write text results", &[("path", &report_path.display())]);
                false
            },
        };
        drop(output);
        lifecycle.advance(LifecycleState::ResultsCollected)?;

        let mut submitted = false;
        if plugin_config.get_bool(config::SUBMIT) {
            if let Err(source) = plugin.submit(&ctx) {
                return Err(fail(&mut lifecycle, Stage::Submit, source));
            }
            lifecycle.advance(LifecycleState::Submitted)?;
            submitted = true;
        }

        lifecycle.advance(LifecycleState::Done)?;
        logger.debug(
            "Plugin run complete",
            &[
                ("name", &name),
                ("passed", &results.passed.len()),
                ("failed", &results.failed.len()),
                ("errored", &results.errored.len()),
            ],
        );

        Ok(RunSummary {
            plugin: name,
            version,
            states: lifecycle.into_history(),
            results,
            report_path,
            report_written,
            submitted,
        })
    }
}

fn write_report(output: &mut impl Write, rendered: &[u8]) -> io::Result<()> {
    output.write_all(rendered)?;
    output.flush()
}

