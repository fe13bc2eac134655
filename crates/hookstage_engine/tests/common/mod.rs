//! Shared fixtures for `hookstage_engine` integration tests.
//!
//! Import via `mod common;` in test files.

#![allow(
    dead_code,
    missing_docs,
    reason = "shared test fixtures, not all items used in every test binary"
)]

use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use core::time::Duration;
use std::sync::Arc;

use hookstage_engine::prelude::*;
use parking_lot::Mutex;

/// Ordered record of start/stop calls across probes.
pub type Journal = Arc<Mutex<Vec<String>>>;

/// Counters and switches shared between a probe's factory and its instances.
#[derive(Default)]
pub struct ProbeState {
    pub created: AtomicUsize,
    pub started: AtomicUsize,
    pub stopped: AtomicUsize,
    pub fail_create: AtomicBool,
    pub fail_start: AtomicBool,
    pub skip_start: AtomicBool,
    pub fail_stop: AtomicBool,
    pub last_thread: Mutex<Option<String>>,
    journal: Option<Journal>,
}

impl ProbeState {
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn stopped(&self) -> usize {
        self.stopped.load(Ordering::SeqCst)
    }

    pub fn set(flag: &AtomicBool, value: bool) {
        flag.store(value, Ordering::SeqCst);
    }
}

/// A component whose behavior is driven by its [`ProbeState`].
pub struct Probe {
    id: &'static str,
    state: Arc<ProbeState>,
}

impl Probe {
    pub fn state(&self) -> &ProbeState {
        &self.state
    }
}

impl Component for Probe {
    fn start(&self) -> Result<StartOutcome, BoxError> {
        self.state.started.fetch_add(1, Ordering::SeqCst);
        *self.state.last_thread.lock() = std::thread::current().name().map(str::to_owned);
        if let Some(journal) = &self.state.journal {
            journal.lock().push(format!("start:{}", self.id));
        }
        if self.state.fail_start.load(Ordering::SeqCst) {
            return Err(format!("{} refused to start", self.id).into());
        }
        if self.state.skip_start.load(Ordering::SeqCst) {
            return Ok(StartOutcome::Skipped);
        }
        Ok(StartOutcome::Active)
    }

    fn stop(&self) -> Result<(), BoxError> {
        self.state.stopped.fetch_add(1, Ordering::SeqCst);
        if let Some(journal) = &self.state.journal {
            journal.lock().push(format!("stop:{}", self.id));
        }
        if self.state.fail_stop.load(Ordering::SeqCst) {
            return Err(format!("{} refused to stop", self.id).into());
        }
        Ok(())
    }
}

/// Starts a probe descriptor. Callers add requirements or a reload policy
/// before building.
pub fn probe(id: &'static str, phase: Phase) -> (HookDescriptorBuilder, Arc<ProbeState>) {
    probe_with(id, phase, ProbeState::default())
}

/// Like [`probe`], recording start and stop calls into `journal`.
pub fn journaled(
    id: &'static str,
    phase: Phase,
    journal: &Journal,
) -> (HookDescriptorBuilder, Arc<ProbeState>) {
    probe_with(
        id,
        phase,
        ProbeState {
            journal: Some(Arc::clone(journal)),
            ..ProbeState::default()
        },
    )
}

fn probe_with(
    id: &'static str,
    phase: Phase,
    state: ProbeState,
) -> (HookDescriptorBuilder, Arc<ProbeState>) {
    let state = Arc::new(state);
    let factory_state = Arc::clone(&state);
    let builder = HookDescriptor::builder(id)
        .phase(phase)
        .factory(move || {
            factory_state.created.fetch_add(1, Ordering::SeqCst);
            if factory_state.fail_create.load(Ordering::SeqCst) {
                return Err(format!("{id} could not be constructed").into());
            }
            Ok(Probe {
                id,
                state: Arc::clone(&factory_state),
            })
        });
    (builder, state)
}

/// A runner that queues tasks until the test fires them.
#[derive(Clone, Default)]
pub struct TaskQueue {
    tasks: Arc<Mutex<Vec<(Task, Option<Duration>)>>>,
}

impl TaskQueue {
    pub fn pending(&self) -> usize {
        self.tasks.lock().len()
    }

    pub fn delays(&self) -> Vec<Duration> {
        self.tasks.lock().iter().filter_map(|(_, delay)| *delay).collect()
    }

    /// Runs every queued task on the calling thread. Returns how many ran.
    pub fn fire_all(&self) -> usize {
        let tasks = std::mem::take(&mut *self.tasks.lock());
        let ran = tasks.len();
        for (task, _) in tasks {
            task();
        }
        ran
    }

    /// Drops every queued task without running it.
    pub fn discard_all(&self) -> usize {
        let tasks = std::mem::take(&mut *self.tasks.lock());
        tasks.len()
    }
}

impl TaskRunner for TaskQueue {
    fn run(&self, task: Task) {
        self.tasks.lock().push((task, None));
    }
}

impl DelayedRunner for TaskQueue {
    fn run_delayed(&self, task: Task, delay: Duration) {
        self.tasks.lock().push((task, Some(delay)));
    }
}

/// Options with a queued delayed runner so late hooks only start on demand.
pub fn queued_late() -> (HookerOptions, TaskQueue) {
    let late = TaskQueue::default();
    let runners = Runners::default().with_delayed(Arc::new(late.clone()));
    (HookerOptions::new().with_runners(runners), late)
}

/// Wraps prebuilt descriptors as a discovery source.
pub fn source(descriptors: impl IntoIterator<Item = HookDescriptor>) -> HookSet {
    descriptors
        .into_iter()
        .fold(HookSet::new(), HookSet::add_descriptor)
}
