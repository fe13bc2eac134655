//! Reload fan-out and completion.
//!
//! A reload is a group of independent units, one per descriptor that needs
//! work. Each unit runs on the runner its reload policy selects and reports
//! exactly once into the shared [`ReloadGroup`]; the group resolves the
//! caller's [`ReloadHandle`] when the last unit reports.

use core::pin::Pin;
use core::task::{Context, Poll};
use std::borrow::Cow;
use std::sync::Arc;

use futures::FutureExt;
use futures::channel::oneshot;
use parking_lot::Mutex;

use super::Inner;
use super::active::Claim;
use crate::descriptor::HookDescriptor;
use crate::error::HookerError;

type ReloadResult = Result<usize, HookerError>;

// ─────────────────────────────────────────────────────────────────────────────
// ReloadHandle
// ─────────────────────────────────────────────────────────────────────────────

/// Completion of a reload.
///
/// Resolves to the number of hooks that were restarted or newly started once
/// every unit, sync and async, has finished. The first unit error is
/// returned; later ones are logged.
///
/// Await it from async code or call [`ReloadHandle::wait`] to block. Blocking
/// is only safe when the synchronous runner does not queue work onto the
/// blocked thread.
#[must_use = "a reload handle does nothing unless awaited or waited on"]
#[derive(Debug)]
pub struct ReloadHandle {
    rx: oneshot::Receiver<ReloadResult>,
}

impl ReloadHandle {
    fn ready(result: ReloadResult) -> Self {
        let (tx, rx) = oneshot::channel();
        // the receiver is alive, so the send cannot fail
        let _ = tx.send(result);
        Self { rx }
    }

    /// Blocks the current thread until the reload completes.
    pub fn wait(self) -> ReloadResult {
        futures::executor::block_on(self)
    }
}

impl Future for ReloadHandle {
    type Output = ReloadResult;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.rx.poll_unpin(cx).map(|received| {
            received.unwrap_or_else(|_| {
                Err(HookerError::TaskAbandoned {
                    task: Cow::Borrowed("reload"),
                })
            })
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ReloadGroup
// ─────────────────────────────────────────────────────────────────────────────

struct GroupState {
    pending: usize,
    count: usize,
    error: Option<HookerError>,
    tx: Option<oneshot::Sender<ReloadResult>>,
}

/// Counts outstanding units and resolves the handle when none remain.
struct ReloadGroup {
    state: Mutex<GroupState>,
}

impl ReloadGroup {
    fn new(units: usize) -> (Arc<Self>, ReloadHandle) {
        let (tx, rx) = oneshot::channel();
        let group = Self {
            state: Mutex::new(GroupState {
                pending: units,
                count: 0,
                error: None,
                tx: Some(tx),
            }),
        };
        (Arc::new(group), ReloadHandle { rx })
    }

    fn report(&self, id: &str, outcome: Result<bool, HookerError>) {
        let mut state = self.state.lock();
        match outcome {
            Ok(true) => state.count += 1,
            Ok(false) => {}
            Err(err) if state.error.is_none() => state.error = Some(err),
            Err(err) => tracing::error!(hook = id, error = %err, "additional reload failure"),
        }
        state.pending = state.pending.saturating_sub(1);
        if state.pending > 0 {
            return;
        }

        let result = match state.error.take() {
            Some(err) => Err(err),
            None => Ok(state.count),
        };
        match &result {
            Ok(count) => tracing::info!(count, "reloaded hooks"),
            Err(err) => tracing::error!(count = state.count, error = %err, "reload finished with errors"),
        }
        if let Some(tx) = state.tx.take() {
            // the caller may have dropped the handle
            let _ = tx.send(result);
        }
    }
}

/// Reports a unit's outcome exactly once, as abandoned if it never did.
struct UnitReporter {
    group: Arc<ReloadGroup>,
    id: Cow<'static, str>,
    reported: bool,
}

impl UnitReporter {
    fn report(mut self, outcome: Result<bool, HookerError>) {
        self.reported = true;
        self.group.report(&self.id, outcome);
    }
}

impl Drop for UnitReporter {
    fn drop(&mut self) {
        if !self.reported {
            let task = self.id.clone();
            self.group
                .report(&self.id, Err(HookerError::TaskAbandoned { task }));
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Planning and units
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    /// Stop then start the active instance.
    Restart,
    /// Start a fresh instance of an inactive reloadable hook.
    Start,
}

impl Inner {
    fn plan_reload(&self) -> Vec<(Arc<HookDescriptor>, Action)> {
        let active = self.active.lock();
        self.table
            .reload_candidates()
            .filter_map(|descriptor| {
                let is_active = active.contains(descriptor.key());
                match (is_active, descriptor.is_reloadable()) {
                    (true, true) => Some((Arc::clone(descriptor), Action::Restart)),
                    (false, true) => Some((Arc::clone(descriptor), Action::Start)),
                    (true, false) => {
                        tracing::debug!(hook = descriptor.id(), "hook is not reloadable, left running");
                        None
                    }
                    (false, false) => None,
                }
            })
            .collect()
    }

    /// Dispatches one unit per descriptor that needs reloading.
    pub(super) fn reload(self: &Arc<Self>) -> ReloadHandle {
        let plan = self.plan_reload();
        tracing::info!(units = plan.len(), "reloading hooks");
        if plan.is_empty() {
            tracing::info!(count = 0, "reloaded hooks");
            return ReloadHandle::ready(Ok(0));
        }

        let (group, handle) = ReloadGroup::new(plan.len());
        for (descriptor, action) in plan {
            let reporter = UnitReporter {
                group: Arc::clone(&group),
                id: descriptor.shared_id(),
                reported: false,
            };
            let inner = Arc::clone(self);
            let runner = self.runners.for_reload(descriptor.is_async());
            runner.run(Box::new(move || {
                let outcome = match action {
                    Action::Restart => inner.restart(&descriptor),
                    Action::Start => inner.activate(&descriptor),
                };
                reporter.report(outcome);
            }));
        }
        handle
    }

    /// Stops and restarts an active hook on the same instance.
    ///
    /// The hook leaves the active set while it restarts and only returns if
    /// start reports it active. A failed stop or start leaves it removed.
    fn restart(&self, descriptor: &Arc<HookDescriptor>) -> Result<bool, HookerError> {
        let Some((claim, hook)) = Claim::restart(&self.active, descriptor.key()) else {
            return Ok(false);
        };

        hook.instance.stop().map_err(|source| HookerError::Stop {
            id: descriptor.shared_id(),
            source,
        })?;

        let started = self.start_instance(claim, descriptor, hook.instance)?;
        if started {
            tracing::info!(hook = descriptor.id(), "hook reloaded");
        } else {
            tracing::info!(hook = descriptor.id(), "hook declined restart, removed");
        }
        Ok(started)
    }
}
