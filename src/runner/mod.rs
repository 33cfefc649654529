//! Run orchestration
//!
//! - [`lifecycle`] - stage ordering and the run state machine
//! - [`report`] - text rendering and the results destination
//! - [`orchestrator`] - wiring collaborators and driving a plugin

pub mod lifecycle;
pub mod orchestrator;
pub mod report;

pub use lifecycle::{Lifecycle, LifecycleState, Stage};
pub use orchestrator::{Orchestrator, RunSummary};
pub use report::{FileResultWriter, Formatter, RESULTS_FILE, ResultWriter, format_text};
