//! Lifecycle state machine of one plugin run

use std::fmt;

use crate::error::IllegalTransition;

/// A plugin lifecycle stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// `Plugin::init`
    Init,
    /// `Plugin::execute_checks`
    ExecuteChecks,
    /// `Plugin::results` and rendering
    Results,
    /// `Plugin::submit`
    Submit,
}

impl Stage {
    /// Message logged when this stage fails
    #[must_use]
    pub const fn failure_message(self) -> &'static str {
        match self {
            Self::Init => "unable to initialize plugin",
            Self::ExecuteChecks => "unable to execute checks",
            Self::Results => "unable to format results",
            Self::Submit => "unable to call plugin submission",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Init => "init",
            Self::ExecuteChecks => "execute-checks",
            Self::Results => "results",
            Self::Submit => "submit",
        })
    }
}

/// Where a run currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    /// Nothing called yet
    Uninitialized,
    /// `init` succeeded
    Initialized,
    /// `execute_checks` succeeded
    ChecksExecuted,
    /// Results collected and written
    ResultsCollected,
    /// `submit` succeeded
    Submitted,
    /// Run completed
    Done,
    /// A stage failed; terminal
    Failed,
}

impl LifecycleState {
    /// Whether no further transition is possible
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Whether `self -> next` is a legal transition
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        use LifecycleState::{
            ChecksExecuted, Done, Failed, Initialized, ResultsCollected, Submitted, Uninitialized,
        };

        match (self, next) {
            (Done | Failed, _) => false,
            (_, Failed)
            | (Uninitialized, Initialized)
            | (Initialized, ChecksExecuted)
            | (ChecksExecuted, ResultsCollected)
            | (ResultsCollected, Submitted | Done)
            | (Submitted, Done) => true,
            _ => false,
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Ordered record of the states a run went through
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lifecycle {
    history: Vec<LifecycleState>,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    /// Start in [`LifecycleState::Uninitialized`]
    #[must_use]
    pub fn new() -> Self {
        Self {
            history: vec![LifecycleState::Uninitialized],
        }
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> LifecycleState {
        self.history.last().copied().unwrap_or(LifecycleState::Uninitialized)
    }

    /// Every state visited, oldest first
    #[must_use]
    pub fn history(&self) -> &[LifecycleState] {
        &self.history
    }

    /// Move to `next`
    pub fn advance(&mut self, next: LifecycleState) -> Result<(), IllegalTransition> {
        let from = self.state();
        if !from.can_transition_to(next) {
            return Err(IllegalTransition { from, to: next });
        }
        self.history.push(next);
        Ok(())
    }

    /// Move to [`LifecycleState::Failed`] unless already terminal
    pub fn fail(&mut self) {
        if !self.state().is_terminal() {
            self.history.push(LifecycleState::Failed);
        }
    }

    /// Consume the lifecycle, returning its history
    #[must_use]
    pub fn into_history(self) -> Vec<LifecycleState> {
        self.history
    }
}
