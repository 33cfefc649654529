//! Test workspaces and orchestrator builders

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use preflight::config::{self, Config, Environment};
use preflight::plugin::{Plugin, PluginRegistry};
use preflight::runner::{Orchestrator, RESULTS_FILE};
use preflight::sink::{Console, SharedBuffer};
use tempfile::TempDir;

/// A temporary directory holding the log file and artifacts of a run
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn artifacts_dir(&self) -> PathBuf {
        self.dir.path().join("artifacts")
    }

    pub fn log_path(&self) -> PathBuf {
        self.dir.path().join("preflight.log")
    }

    pub fn report_path(&self) -> PathBuf {
        self.artifacts_dir().join(RESULTS_FILE)
    }

    /// Configuration pointing at this workspace, with an empty environment
    pub fn config(&self) -> Config {
        self.config_with_env(Environment::fixed(Vec::<(String, String)>::new()))
    }

    /// Configuration pointing at this workspace, resolving `environment`
    pub fn config_with_env(&self, environment: Environment) -> Config {
        let mut config = Config::with_environment(environment);
        config.set_harness_defaults();
        config.bind_flag(config::LOG_FILE, self.log_path().to_string_lossy());
        config.bind_flag(config::ARTIFACTS, self.artifacts_dir().to_string_lossy());
        config
    }

    pub fn report(&self) -> String {
        fs::read_to_string(self.report_path()).unwrap_or_default()
    }

    pub fn log(&self) -> String {
        fs::read_to_string(self.log_path()).unwrap_or_default()
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

/// Orchestrator over `plugins` with captured console and diagnostics
pub struct Harness {
    pub orchestrator: Orchestrator,
    pub console: SharedBuffer,
    pub diagnostics: SharedBuffer,
}

impl Harness {
    pub fn new(plugins: Vec<Arc<dyn Plugin>>) -> Self {
        let registry = plugins.into_iter().fold(PluginRegistry::new(), PluginRegistry::with);
        let console = SharedBuffer::new();
        let diagnostics = SharedBuffer::new();
        let orchestrator = Orchestrator::new(Arc::new(registry))
            .with_console(Console::Buffer(console.clone()))
            .with_diagnostics(Console::Buffer(diagnostics.clone()));
        Self {
            orchestrator,
            console,
            diagnostics,
        }
    }

    pub fn single(plugin: Arc<dyn Plugin>) -> Self {
        Self::new(vec![plugin])
    }
}
