//! Tokio-backed runners.
//!
//! | Strategy | Behavior |
//! |----------|----------|
//! | sync | Runs inline on the calling thread |
//! | async | `spawn_blocking` on the runtime's blocking pool |
//! | delayed | `tokio::time::sleep`, then `spawn_blocking` |
//!
//! Hook callbacks are ordinary blocking functions, so neither the async nor
//! the delayed strategy runs them on a runtime worker thread.

use core::time::Duration;
use std::sync::Arc;

use hookstage_engine::runner::{DelayedRunner, InlineRunner, Runners, Task, TaskRunner};
use tokio::runtime::{Handle, TryCurrentError};

/// Builds a [`Runners`] set on top of a tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioRunners {
    handle: Handle,
}

impl TokioRunners {
    /// Uses the given runtime handle.
    #[must_use]
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Uses the runtime the caller is running on.
    pub fn current() -> Result<Self, TryCurrentError> {
        Handle::try_current().map(Self::new)
    }

    /// The runtime handle.
    #[must_use]
    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    /// The runner set: inline sync, blocking-pool async, sleeping delayed.
    #[must_use]
    pub fn runners(&self) -> Runners {
        Runners::new(
            Arc::new(InlineRunner),
            Arc::new(BlockingRunner(self.handle.clone())),
            Arc::new(SleepRunner(self.handle.clone())),
        )
    }
}

impl From<TokioRunners> for Runners {
    fn from(tokio: TokioRunners) -> Self {
        tokio.runners()
    }
}

struct BlockingRunner(Handle);

impl TaskRunner for BlockingRunner {
    fn run(&self, task: Task) {
        // detached; a task refused by a shutting-down runtime is dropped
        drop(self.0.spawn_blocking(task));
    }
}

struct SleepRunner(Handle);

impl DelayedRunner for SleepRunner {
    fn run_delayed(&self, task: Task, delay: Duration) {
        let handle = self.0.clone();
        drop(self.0.spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(err) = handle.spawn_blocking(task).await {
                tracing::error!(error = %err, "delayed hook task failed");
            }
        }));
    }
}
