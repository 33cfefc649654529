//! Error types for the run orchestration
//!
//! Every fatal condition an invocation can hit maps to one [`RunError`]
//! variant. Plugin failures are carried as [`anyhow::Error`] because plugin
//! code is external to the harness.

use std::path::PathBuf;

use thiserror::Error;

use crate::runner::{LifecycleState, Stage};

/// Failures while preparing the collaborators of an invocation
#[derive(Debug, Error)]
pub enum SetupError {
    /// The artifacts path exists and is not a directory
    #[error("artifacts path {} is not a directory", path.display())]
    ArtifactsNotADirectory {
        /// Offending path
        path: PathBuf,
    },

    /// The artifacts directory could not be resolved or created
    #[error("unable to prepare artifacts directory {}: {source}", path.display())]
    ArtifactsDirectory {
        /// Directory that could not be prepared
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// An artifact could not be written
    #[error("unable to write artifact {name}: {source}")]
    WriteArtifact {
        /// Artifact file name
        name: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The results destination could not be opened
    #[error("unable to open results file {}: {source}", path.display())]
    OpenResults {
        /// Path of the results file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// A lifecycle transition that skips or reverses a stage
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("illegal lifecycle transition from {from} to {to}")]
pub struct IllegalTransition {
    /// State the run was in
    pub from: LifecycleState,
    /// State that was requested
    pub to: LifecycleState,
}

/// Failures while rendering a result set
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    /// A check was reported under more than one disposition
    #[error("check {name} is reported under more than one disposition")]
    DuplicateCheck {
        /// Name of the repeated check
        name: String,
    },
}

/// Fatal outcome of one invocation
#[derive(Debug, Error)]
pub enum RunError {
    /// No plugin is registered under the requested name
    #[error("plugin {0} is not registered")]
    PluginNotFound(String),

    /// Collaborator setup failed before the plugin ran
    #[error(transparent)]
    Setup(#[from] SetupError),

    /// A plugin lifecycle stage returned an error
    #[error("plugin {plugin} {version} failed during {stage}")]
    Plugin {
        /// Plugin name
        plugin: String,
        /// Plugin version
        version: String,
        /// Stage that failed
        stage: Stage,
        /// States visited, ending in [`LifecycleState::Failed`]
        states: Vec<LifecycleState>,
        /// Error returned by the plugin
        #[source]
        source: anyhow::Error,
    },

    /// The plugin results could not be rendered
    #[error("unable to format results of plugin {plugin}")]
    Format {
        /// Plugin name
        plugin: String,
        /// States visited, ending in [`LifecycleState::Failed`]
        states: Vec<LifecycleState>,
        /// Formatter error
        #[source]
        source: FormatError,
    },

    /// The harness attempted an out-of-order stage
    #[error(transparent)]
    Lifecycle(#[from] IllegalTransition),
}

impl RunError {
    /// The lifecycle stage that failed, when the failure came from the plugin
    #[must_use]
    pub const fn stage(&self) -> Option<Stage> {
        match self {
            Self::Plugin { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Lifecycle states the run went through before failing
    ///
    /// Empty for failures detected before the plugin was called.
    #[must_use]
    pub fn states(&self) -> &[LifecycleState] {
        match self {
            Self::Plugin { states, .. } | Self::Format { states, .. } => states,
            _ => &[],
        }
    }
}
