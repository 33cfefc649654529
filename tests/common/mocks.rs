//! Mock plugins for exercising the orchestrator
//!
//! `RecordingPlugin` records every lifecycle call so tests can assert exactly
//! which stages ran and in what order.

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use preflight::config::Config;
use preflight::context::ExecutionContext;
use preflight::plugin::{Plugin, PluginFlag, ResultSet};
use preflight::runner::{RESULTS_FILE, ResultWriter};

/// Stage at which a [`RecordingPlugin`] returns an error
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    #[default]
    Nowhere,
    Init,
    ExecuteChecks,
    Submit,
}

type InitHook = Box<dyn Fn(&ExecutionContext, &mut Config) + Send + Sync>;

/// Plugin recording the calls it receives
pub struct RecordingPlugin {
    name: String,
    version: String,
    fail_at: FailAt,
    results: ResultSet,
    flags: Vec<PluginFlag>,
    init_hook: Option<InitHook>,
    calls: Mutex<Vec<&'static str>>,
    init_args: Mutex<Vec<String>>,
    init_config: Mutex<Option<Config>>,
    report_at_submit: Mutex<Option<String>>,
}

impl RecordingPlugin {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            version: "1.0.0".to_string(),
            fail_at: FailAt::Nowhere,
            results: ResultSet::new(),
            flags: Vec::new(),
            init_hook: None,
            calls: Mutex::new(Vec::new()),
            init_args: Mutex::new(Vec::new()),
            init_config: Mutex::new(None),
            report_at_submit: Mutex::new(None),
        }
    }

    pub fn failing_at(mut self, stage: FailAt) -> Self {
        self.fail_at = stage;
        self
    }

    pub fn with_results(mut self, results: ResultSet) -> Self {
        self.results = results;
        self
    }

    pub fn with_flag(mut self, flag: PluginFlag) -> Self {
        self.flags.push(flag);
        self
    }

    pub fn on_init(mut self, hook: impl Fn(&ExecutionContext, &mut Config) + Send + Sync + 'static) -> Self {
        self.init_hook = Some(Box::new(hook));
        self
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Lifecycle calls in the order received
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    /// How many times `stage` was called
    pub fn count(&self, stage: &str) -> usize {
        self.calls().iter().filter(|c| **c == stage).count()
    }

    /// Arguments received by `init`
    pub fn init_args(&self) -> Vec<String> {
        self.init_args.lock().unwrap().clone()
    }

    /// Configuration as it was at the end of `init`
    pub fn init_config(&self) -> Option<Config> {
        self.init_config.lock().unwrap().clone()
    }

    /// Content of the results file when `submit` was called
    pub fn report_at_submit(&self) -> Option<String> {
        self.report_at_submit.lock().unwrap().clone()
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Plugin for RecordingPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn description(&self) -> &str {
        "records lifecycle calls"
    }

    fn flags(&self) -> Vec<PluginFlag> {
        self.flags.clone()
    }

    fn init(&self, ctx: &ExecutionContext, config: &mut Config, args: &[String]) -> anyhow::Result<()> {
        self.record("init");
        *self.init_args.lock().unwrap() = args.to_vec();
        if let Some(hook) = &self.init_hook {
            hook(ctx, config);
        }
        *self.init_config.lock().unwrap() = Some(config.clone());
        if self.fail_at == FailAt::Init {
            anyhow::bail!("init exploded");
        }
        Ok(())
    }

    fn execute_checks(&self, _ctx: &ExecutionContext) -> anyhow::Result<()> {
        self.record("execute_checks");
        if self.fail_at == FailAt::ExecuteChecks {
            anyhow::bail!("checks exploded");
        }
        Ok(())
    }

    fn results(&self, _ctx: &ExecutionContext) -> ResultSet {
        self.record("results");
        self.results.clone()
    }

    fn submit(&self, ctx: &ExecutionContext) -> anyhow::Result<()> {
        self.record("submit");
        let report = fs::read_to_string(ctx.artifacts().path().join(RESULTS_FILE)).ok();
        *self.report_at_submit.lock().unwrap() = report;
        if self.fail_at == FailAt::Submit {
            anyhow::bail!("submission rejected");
        }
        Ok(())
    }
}

/// Result writer whose files reject every write
#[derive(Debug, Default)]
pub struct BrokenResultWriter;

struct BrokenFile;

impl Write for BrokenFile {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::other("disk full"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl ResultWriter for BrokenResultWriter {
    fn open_file(&self, _path: &Path) -> io::Result<Box<dyn Write + Send>> {
        Ok(Box::new(BrokenFile))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_plugin_starts_clean() {
        let plugin = RecordingPlugin::new("demo");
        assert!(plugin.calls().is_empty());
        assert_eq!(plugin.count("init"), 0);
        assert_eq!(plugin.name(), "demo");
    }
}
