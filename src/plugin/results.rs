//! Check outcomes reported by plugins

use std::time::Duration;

use serde::Serialize;

/// How a single check ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Disposition {
    /// The check ran and passed
    Passed,
    /// The check ran and failed
    Failed,
    /// The check could not complete
    Errored,
}

impl Disposition {
    /// All dispositions, in report order
    pub const ALL: [Self; 3] = [Self::Passed, Self::Failed, Self::Errored];

    /// Tag printed in the text report
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Passed => "PASSED",
            Self::Failed => "FAILED",
            Self::Errored => "ERRORED",
        }
    }
}

impl std::fmt::Display for Disposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// One executed check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckOutcome {
    /// Check name
    pub name: String,
    /// Time the check took
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

impl CheckOutcome {
    /// Create an outcome
    #[must_use]
    pub fn new(name: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            name: name.into(),
            elapsed,
        }
    }

    /// Elapsed time in whole milliseconds
    #[must_use]
    pub const fn elapsed_millis(&self) -> u128 {
        self.elapsed.as_millis()
    }
}

fn serialize_millis<S: serde::Serializer>(elapsed: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
}

/// Outcomes of every check a plugin ran, partitioned by disposition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResultSet {
    /// Checks that passed
    pub passed: Vec<CheckOutcome>,
    /// Checks that failed
    pub failed: Vec<CheckOutcome>,
    /// Checks that errored
    pub errored: Vec<CheckOutcome>,
}

impl ResultSet {
    /// Create an empty result set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an outcome under `disposition`
    pub fn record(&mut self, disposition: Disposition, outcome: CheckOutcome) {
        match disposition {
            Disposition::Passed => self.passed.push(outcome),
            Disposition::Failed => self.failed.push(outcome),
            Disposition::Errored => self.errored.push(outcome),
        }
    }

    /// Builder form of [`ResultSet::record`]
    #[must_use]
    pub fn with(mut self, disposition: Disposition, name: &str, elapsed: Duration) -> Self {
        self.record(disposition, CheckOutcome::new(name, elapsed));
        self
    }

    /// Outcomes recorded under `disposition`
    #[must_use]
    pub fn outcomes(&self, disposition: Disposition) -> &[CheckOutcome] {
        match disposition {
            Disposition::Passed => &self.passed,
            Disposition::Failed => &self.failed,
            Disposition::Errored => &self.errored,
        }
    }

    /// Every outcome in report order: passed, failed, then errored
    pub fn iter(&self) -> impl Iterator<Item = (Disposition, &CheckOutcome)> {
        Disposition::ALL
            .into_iter()
            .flat_map(move |d| self.outcomes(d).iter().map(move |o| (d, o)))
    }

    /// Total number of outcomes
    #[must_use]
    pub fn len(&self) -> usize {
        self.passed.len() + self.failed.len() + self.errored.len()
    }

    /// Whether no check was reported
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether every check passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed.is_empty() && self.errored.is_empty()
    }
}
