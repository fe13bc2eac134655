//! Task runner abstraction.
//!
//! The engine never spawns threads or timers of its own. Start, stop and
//! reload work is handed to one of three injected strategies:
//!
//! - **sync**: runs the task to completion on the host's primary context.
//!   Load and enable phases always go through this runner.
//! - **async**: hands the task to a background context and returns.
//!   Reloads of hooks with an asynchronous [`ReloadPolicy`](crate::component::ReloadPolicy)
//!   go through this runner.
//! - **delayed**: runs the task once after a delay. Used exactly once, to
//!   schedule the late phase at the end of the enable phase.
//!
//! Closures are runners too, so a host can plug in its scheduler without
//! defining types:
//!
//! ```
//! use std::sync::Arc;
//! use hookstage_engine::runner::{Runners, Task};
//!
//! let runners = Runners::default()
//!     .with_async(Arc::new(|task: Task| {
//!         std::thread::spawn(task);
//!     }));
//! # let _ = runners;
//! ```

use core::fmt;
use core::time::Duration;
use std::sync::Arc;

/// A unit of work handed to a runner.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

// ─────────────────────────────────────────────────────────────────────────────
// Runner traits
// ─────────────────────────────────────────────────────────────────────────────

/// Runs tasks immediately, inline or on another context.
///
/// Implementations that cannot run a task must drop it; the engine treats a
/// dropped task as abandoned and reports it rather than waiting forever.
pub trait TaskRunner: Send + Sync + 'static {
    /// Runs or schedules `task`.
    fn run(&self, task: Task);
}

/// Runs tasks once after a delay.
pub trait DelayedRunner: Send + Sync + 'static {
    /// Runs `task` after `delay` has elapsed.
    fn run_delayed(&self, task: Task, delay: Duration);
}

impl<F> TaskRunner for F
where
    F: Fn(Task) + Send + Sync + 'static,
{
    fn run(&self, task: Task) {
        self(task);
    }
}

impl<F> DelayedRunner for F
where
    F: Fn(Task, Duration) + Send + Sync + 'static,
{
    fn run_delayed(&self, task: Task, delay: Duration) {
        self(task, delay);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Built-in runners
// ─────────────────────────────────────────────────────────────────────────────

/// Runs every task on the calling thread.
///
/// As a [`DelayedRunner`] it ignores the delay. Hosts that need a real delay
/// must supply their own delayed runner.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineRunner;

impl TaskRunner for InlineRunner {
    fn run(&self, task: Task) {
        task();
    }
}

impl DelayedRunner for InlineRunner {
    fn run_delayed(&self, task: Task, _delay: Duration) {
        task();
    }
}

/// Runs every task on a freshly spawned, named thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRunner;

impl TaskRunner for ThreadRunner {
    fn run(&self, task: Task) {
        let spawned = std::thread::Builder::new()
            .name("hookstage-async".into())
            .spawn(task);
        if let Err(err) = spawned {
            // the task is dropped with the closure; its owner sees it as abandoned
            tracing::error!(error = %err, "failed to spawn background hook task");
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Runners
// ─────────────────────────────────────────────────────────────────────────────

/// The three runner strategies used by the engine.
///
/// The defaults are [`InlineRunner`] for sync, [`ThreadRunner`] for async and
/// [`InlineRunner`] (no actual delay) for delayed work.
#[derive(Clone)]
pub struct Runners {
    sync: Arc<dyn TaskRunner>,
    asynchronous: Arc<dyn TaskRunner>,
    delayed: Arc<dyn DelayedRunner>,
}

impl Default for Runners {
    fn default() -> Self {
        Self {
            sync: Arc::new(InlineRunner),
            asynchronous: Arc::new(ThreadRunner),
            delayed: Arc::new(InlineRunner),
        }
    }
}

impl Runners {
    /// Creates a runner set from three strategies.
    #[must_use]
    pub fn new(
        sync: Arc<dyn TaskRunner>,
        asynchronous: Arc<dyn TaskRunner>,
        delayed: Arc<dyn DelayedRunner>,
    ) -> Self {
        Self {
            sync,
            asynchronous,
            delayed,
        }
    }

    /// Replaces the synchronous runner.
    #[must_use]
    pub fn with_sync(mut self, runner: Arc<dyn TaskRunner>) -> Self {
        self.sync = runner;
        self
    }

    /// Replaces the async runner.
    #[must_use]
    pub fn with_async(mut self, runner: Arc<dyn TaskRunner>) -> Self {
        self.asynchronous = runner;
        self
    }

    /// Replaces the delayed runner.
    #[must_use]
    pub fn with_delayed(mut self, runner: Arc<dyn DelayedRunner>) -> Self {
        self.delayed = runner;
        self
    }

    /// The synchronous runner.
    #[must_use]
    pub fn sync(&self) -> &dyn TaskRunner {
        &*self.sync
    }

    /// The async runner.
    #[must_use]
    pub fn asynchronous(&self) -> &dyn TaskRunner {
        &*self.asynchronous
    }

    /// The delayed runner.
    #[must_use]
    pub fn delayed(&self) -> &dyn DelayedRunner {
        &*self.delayed
    }

    /// Selects the runner for a unit of reload work.
    #[must_use]
    pub fn for_reload(&self, asynchronous: bool) -> &dyn TaskRunner {
        if asynchronous {
            self.asynchronous()
        } else {
            self.sync()
        }
    }
}

impl fmt::Debug for Runners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runners").finish_non_exhaustive()
    }
}
