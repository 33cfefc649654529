//! Execution context handed to plugins

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use crate::artifacts::ArtifactWriter;
use crate::logging::Logger;

/// Cooperative cancellation flag shared between a caller and an invocation
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Create a token that is not cancelled
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

static NEXT_INVOCATION: AtomicU64 = AtomicU64::new(1);

/// Identity of one invocation
///
/// Every [`ExecutionContext`] built with [`ExecutionContext::new`] gets a fresh
/// id, shared by its clones. The id stays live while any of them exists.
#[derive(Debug, Clone)]
pub struct InvocationId(Arc<u64>);

impl InvocationId {
    fn next() -> Self {
        Self(Arc::new(NEXT_INVOCATION.fetch_add(1, Ordering::Relaxed)))
    }

    /// Numeric value, unique within the process
    #[must_use]
    pub fn get(&self) -> u64 {
        *self.0
    }

    /// Handle that outlives the invocation without keeping it live
    #[must_use]
    pub fn watch(&self) -> InvocationWatch {
        InvocationWatch(Arc::downgrade(&self.0))
    }
}

/// Weak handle on an [`InvocationId`]
#[derive(Debug, Clone, Default)]
pub struct InvocationWatch(Weak<u64>);

impl InvocationWatch {
    /// Whether a context of the invocation still exists
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.0.strong_count() > 0
    }
}

/// Collaborators bound to a single invocation
///
/// The harness builds one context per invocation and passes it by reference
/// into every plugin call. Nothing in it is shared with other invocations
/// except the cancellation token the caller chose to hand over.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    logger: Logger,
    artifacts: Arc<dyn ArtifactWriter>,
    cancellation: CancellationToken,
    invocation: InvocationId,
}

impl ExecutionContext {
    /// Bundle the collaborators of one invocation
    #[must_use]
    pub fn new(
        logger: Logger,
        artifacts: Arc<dyn ArtifactWriter>,
        cancellation: CancellationToken,
    ) -> Self {
        Self {
            logger,
            artifacts,
            cancellation,
            invocation: InvocationId::next(),
        }
    }

    /// Logger for plugin output
    #[must_use]
    pub const fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Artifact writer of this invocation
    #[must_use]
    pub fn artifacts(&self) -> &dyn ArtifactWriter {
        self.artifacts.as_ref()
    }

    /// Cancellation signal propagated from the caller
    #[must_use]
    pub const fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Identity of the invocation this context belongs to
    #[must_use]
    pub const fn invocation(&self) -> &InvocationId {
        &self.invocation
    }

    /// Shorthand for `self.cancellation().is_cancelled()`
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}
