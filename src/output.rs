//! Output formatting for human and JSON modes
//!
//! Informational commands (`list`, `version`) render either as
//! human-readable text or machine-parseable JSON. The check report itself is
//! always plain text; see [`crate::runner::report`].

use std::io::{self, Write};

use serde::Serialize;

use crate::plugin::PluginRegistry;

/// Output mode for the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output (machine-readable)
    Json,
}

/// A registered plugin as shown by `list`
#[derive(Debug, Clone, Serialize)]
pub struct PluginInfo {
    /// Plugin name
    pub name: String,
    /// Plugin version
    pub version: String,
    /// One-line description
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// Result of a `list` operation
#[derive(Debug, Clone, Serialize)]
pub struct PluginListResult {
    /// Registered plugins, sorted by name
    pub plugins: Vec<PluginInfo>,
}

impl PluginListResult {
    /// Describe every plugin in `registry`
    #[must_use]
    pub fn from_registry(registry: &PluginRegistry) -> Self {
        let plugins = registry
            .iter()
            .map(|(name, plugin)| PluginInfo {
                name: name.to_string(),
                version: plugin.version().to_string(),
                description: plugin.description().to_string(),
            })
            .collect();
        Self { plugins }
    }

    /// Render the result based on output mode
    pub fn render(&self, mode: OutputMode, out: &mut dyn Write) -> io::Result<()> {
        match mode {
            OutputMode::Human => self.render_human(out),
            OutputMode::Json => render_json(self, out),
        }
    }

    fn render_human(&self, out: &mut dyn Write) -> io::Result<()> {
        if self.plugins.is_empty() {
            return writeln!(out, "No plugins registered.");
        }

        let width = self.plugins.iter().map(|p| p.name.len()).max().unwrap_or(0);
        for p in &self.plugins {
            if p.description.is_empty() {
                writeln!(out, "{:<width$}  {}", p.name, p.version)?;
            } else {
                writeln!(out, "{:<width$}  {}  {}", p.name, p.version, p.description)?;
            }
        }
        Ok(())
    }
}

/// Result of a `version` operation
#[derive(Debug, Clone, Serialize)]
pub struct VersionResult {
    /// Harness version
    pub version: String,
}

impl VersionResult {
    /// Version of this build
    #[must_use]
    pub fn current() -> Self {
        Self {
            version: crate::VERSION.to_string(),
        }
    }

    /// Render the result based on output mode
    pub fn render(&self, mode: OutputMode, out: &mut dyn Write) -> io::Result<()> {
        match mode {
            OutputMode::Human => writeln!(out, "preflight v{}", self.version),
            OutputMode::Json => render_json(self, out),
        }
    }
}

fn render_json(value: &impl Serialize, out: &mut dyn Write) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)
}
