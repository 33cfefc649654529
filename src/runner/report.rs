//! Rendering and persisting the results report

use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::error::FormatError;
use crate::plugin::ResultSet;

/// Name of the report written to the artifacts directory
pub const RESULTS_FILE: &str = "results.txt";

/// Width the disposition tag is padded to
const TAG_WIDTH: usize = 7;

/// Renders a result set to bytes
pub type Formatter = fn(&ResultSet) -> Result<Vec<u8>, FormatError>;

/// Render `results` as one line per check
///
/// Lines are ordered passed, failed, errored, each in the order the plugin
/// reported them:
///
/// ```text
/// PASSED  check-a in 12ms
/// ERRORED check-b in 5ms
/// ```
///
/// A name repeated under one disposition renders once per outcome. A name
/// reported under two dispositions is rejected.
pub fn format_text(results: &ResultSet) -> Result<Vec<u8>, FormatError> {
    let mut seen = HashMap::new();
    let mut out = String::new();
    for (disposition, outcome) in results.iter() {
        let first = *seen.entry(outcome.name.as_str()).or_insert(disposition);
        if first != disposition {
            return Err(FormatError::DuplicateCheck {
                name: outcome.name.clone(),
            });
        }
        let _ = writeln!(
            out,
            "{:<width$} {} in {}ms",
            disposition.tag(),
            outcome.name,
            outcome.elapsed_millis(),
            width = TAG_WIDTH,
        );
    }
    Ok(out.into_bytes())
}

/// Opens the destination the rendered report is written to
pub trait ResultWriter: Send + Sync {
    /// Open `path` for writing, truncating previous content
    fn open_file(&self, path: &Path) -> io::Result<Box<dyn Write + Send>>;
}

/// [`ResultWriter`] backed by the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FileResultWriter;

impl ResultWriter for FileResultWriter {
    fn open_file(&self, path: &Path) -> io::Result<Box<dyn Write + Send>> {
        Ok(Box::new(File::create(path)?))
    }
}
