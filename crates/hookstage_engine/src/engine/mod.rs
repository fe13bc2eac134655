//! The lifecycle engine.
//!
//! [`Hooker`] owns the phase table built at registration, the requirement
//! registry, and the set of active hooks. It drives the phases in order:
//!
//! ```text
//! register ──► load ──► enable ──(late delay)──► late
//!                                        reload ◄──┘ (any time after enable)
//!                                        disable    (terminal, idempotent)
//! ```
//!
//! A hook is started at most once until it is stopped. Requirement checks
//! run before construction, so a hook whose requirements fail is never
//! built. Start and stop callbacks always run without any engine lock held,
//! so a callback may call back into the engine.
//!
//! # Example
//!
//! ```
//! use hookstage_engine::component::{BoxError, Component, Hook};
//! use hookstage_engine::discovery::HookSet;
//! use hookstage_engine::engine::Hooker;
//! use hookstage_engine::options::HookerOptions;
//! use hookstage_engine::phase::Phase;
//!
//! struct Economy;
//! impl Component for Economy {}
//! impl Hook for Economy {
//!     const ID: &'static str = "economy";
//!     const PHASE: Phase = Phase::Load;
//!     fn create() -> Result<Self, BoxError> { Ok(Self) }
//! }
//!
//! let hooks = HookSet::new().add::<Economy>();
//! let hooker = Hooker::register(&hooks, HookerOptions::new()).unwrap();
//!
//! assert_eq!(hooker.load().unwrap(), 1);
//! assert!(hooker.get::<Economy>().is_some());
//! assert_eq!(hooker.disable().unwrap(), 1);
//! ```

mod active;
mod reload;

use core::fmt;
use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use core::time::Duration;
use std::borrow::Cow;
use std::sync::Arc;

use futures::channel::oneshot;
use parking_lot::{Mutex, RwLock};

use self::active::{ActiveRegistry, Claim};
use crate::component::{Component, StartOutcome};
use crate::descriptor::{HookDescriptor, HookKey};
use crate::discovery::DiscoverySource;
use crate::error::HookerError;
use crate::options::HookerOptions;
use crate::phase::{Phase, PhaseTable};
use crate::requirement::{PLUGIN_REQUIREMENT, Requirement, RequirementRegistry};
use crate::runner::Runners;

pub use self::reload::ReloadHandle;

// ─────────────────────────────────────────────────────────────────────────────
// Hooker
// ─────────────────────────────────────────────────────────────────────────────

/// Handle to a registered hook engine.
///
/// Cheap to clone; clones share the same state. The host is expected to
/// serialize `load`, `enable`, `reload` and `disable` relative to each other.
#[derive(Clone)]
pub struct Hooker {
    inner: Arc<Inner>,
}

pub(crate) struct Inner {
    table: PhaseTable,
    requirements: RwLock<RequirementRegistry>,
    active: Mutex<ActiveRegistry>,
    runners: Runners,
    late_delay: Duration,
    late_scheduled: AtomicBool,
    /// Bumped by every disable. A pending late phase only runs while the
    /// generation it was scheduled in is current.
    generation: AtomicU64,
}

impl Hooker {
    /// Discovers hooks and creates an engine without running any phase.
    ///
    /// Ignores [`HookerOptions::load_now`]; [`Hooker::register`] honors it.
    pub fn new(source: &dyn DiscoverySource, options: &HookerOptions) -> Result<Self, HookerError> {
        let mut requirements = RequirementRegistry::new();
        if let Some(check) = options.dependency_check() {
            let check = Arc::clone(check);
            requirements.register(PLUGIN_REQUIREMENT, move |value| check(value));
        }

        let table = PhaseTable::discover(source, options.roots())?;
        tracing::info!(
            load = table.bucket(Phase::Load).len(),
            enable = table.bucket(Phase::Enable).len(),
            late = table.bucket(Phase::Late).len(),
            "discovered hooks"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                table,
                requirements: RwLock::new(requirements),
                active: Mutex::new(ActiveRegistry::default()),
                runners: options.runners().clone(),
                late_delay: options.late_delay(),
                late_scheduled: AtomicBool::new(false),
                generation: AtomicU64::new(0),
            }),
        })
    }

    /// Discovers hooks and creates an engine, running the load phase right
    /// away if [`HookerOptions::load_now`] is set.
    ///
    /// If that load phase fails, hooks it already started are disabled
    /// before the error is returned.
    pub fn register(source: &dyn DiscoverySource, options: HookerOptions) -> Result<Self, HookerError> {
        let hooker = Self::new(source, &options)?;
        if options.load_now()
            && let Err(err) = hooker.load()
        {
            if let Err(stop_err) = hooker.disable() {
                tracing::error!(error = %stop_err, "cleanup after failed load did not stop cleanly");
            }
            return Err(err);
        }
        Ok(hooker)
    }

    /// Registers a requirement predicate.
    ///
    /// Fails if a predicate already exists for `kind`, including the default
    /// `"plugin"` check installed from the options.
    pub fn requirement(
        &self,
        kind: impl Into<String>,
        predicate: impl Fn(&str) -> bool + Send + Sync + 'static,
    ) -> Result<(), HookerError> {
        self.inner
            .requirements
            .write()
            .try_register(kind, predicate)?;
        Ok(())
    }

    /// Returns true if a predicate is registered for `kind`.
    #[must_use]
    pub fn has_requirement(&self, kind: &str) -> bool {
        self.inner.requirements.read().exists(kind)
    }

    /// Runs the load phase on the synchronous runner and waits for it.
    ///
    /// Returns the number of newly active hooks. Hooks already active are
    /// left alone, so running a phase again only retries the others.
    ///
    /// The calling thread blocks until the runner has run the phase. A sync
    /// runner that queues work onto the calling thread deadlocks here.
    pub fn load(&self) -> Result<usize, HookerError> {
        self.run_blocking(Phase::Load)
    }

    /// Runs the enable phase on the synchronous runner and waits for it.
    ///
    /// On success the late phase is scheduled once on the delayed runner.
    /// After [`Hooker::disable`] the next successful enable schedules it
    /// again, and a late phase still pending from before is dropped.
    ///
    /// Blocks like [`Hooker::load`].
    pub fn enable(&self) -> Result<usize, HookerError> {
        let count = self.run_blocking(Phase::Enable)?;
        self.schedule_late();
        Ok(count)
    }

    /// Runs the late phase on the synchronous runner and waits for it.
    ///
    /// Normally the delayed runner does this after [`Hooker::enable`].
    /// Blocks like [`Hooker::load`].
    pub fn late(&self) -> Result<usize, HookerError> {
        self.run_blocking(Phase::Late)
    }

    /// Restarts reloadable hooks in the enable and late phases.
    ///
    /// Active reloadable hooks are stopped and started again on the same
    /// instance; inactive reloadable hooks get a fresh start; active hooks
    /// that are not reloadable are left untouched. A hook whose restart fails
    /// or declines is removed from the active set.
    pub fn reload(&self) -> ReloadHandle {
        self.inner.reload()
    }

    /// Stops every active hook, newest first, and empties the active set.
    ///
    /// Hooks are removed even if their stop callback fails; the first such
    /// error is returned after all hooks were processed. Calling this again
    /// returns zero. A late phase that has not fired yet never will.
    pub fn disable(&self) -> Result<usize, HookerError> {
        self.inner.generation.fetch_add(1, Ordering::AcqRel);
        self.inner.late_scheduled.store(false, Ordering::Release);
        let drained = self.inner.active.lock().drain_newest_first();
        tracing::info!(count = drained.len(), "disabling hooks");

        let mut count = 0;
        let mut first_error = None;
        for hook in drained {
            let id = hook.descriptor.id();
            match hook.instance.stop() {
                Ok(()) => tracing::info!(hook = id, "hook disabled"),
                Err(source) => {
                    tracing::error!(hook = id, error = %source, "hook failed to stop, removed anyway");
                    first_error.get_or_insert(HookerError::Stop {
                        id: hook.descriptor.shared_id(),
                        source,
                    });
                }
            }
            count += 1;
        }

        tracing::info!(count, "disabled hooks");
        match first_error {
            Some(err) => Err(err),
            None => Ok(count),
        }
    }

    /// Returns the active instance for a descriptor key.
    #[must_use]
    pub fn get_hook(&self, key: HookKey) -> Option<Arc<dyn Component>> {
        self.inner
            .active
            .lock()
            .get(key)
            .map(|hook| Arc::clone(&hook.instance))
    }

    /// Returns the first active instance of type `H`, in phase-table order.
    #[must_use]
    pub fn get<H: Component>(&self) -> Option<Arc<H>> {
        self.loaded_hooks()
            .into_iter()
            .find_map(|instance| instance.downcast_arc::<H>().ok())
    }

    /// Returns true if the descriptor's hook is active.
    #[must_use]
    pub fn is_active(&self, key: HookKey) -> bool {
        self.inner.active.lock().contains(key)
    }

    /// Returns every active instance in phase-table order.
    #[must_use]
    pub fn loaded_hooks(&self) -> Vec<Arc<dyn Component>> {
        let active = self.inner.active.lock();
        self.inner
            .table
            .iter()
            .filter_map(|descriptor| active.get(descriptor.key()))
            .map(|hook| Arc::clone(&hook.instance))
            .collect()
    }

    /// Returns the descriptors of every active hook in phase-table order.
    #[must_use]
    pub fn loaded_descriptors(&self) -> Vec<Arc<HookDescriptor>> {
        let active = self.inner.active.lock();
        self.inner
            .table
            .iter()
            .filter(|descriptor| active.contains(descriptor.key()))
            .cloned()
            .collect()
    }

    /// Returns the number of active hooks.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.inner.active.lock().len()
    }

    /// Descriptors discovered for `phase`, in discovery order.
    #[must_use]
    pub fn descriptors(&self, phase: Phase) -> &[Arc<HookDescriptor>] {
        self.inner.table.bucket(phase)
    }

    /// Finds a discovered descriptor by id. Ids are not unique; the first
    /// match in phase-table order wins.
    #[must_use]
    pub fn descriptor(&self, id: &str) -> Option<&Arc<HookDescriptor>> {
        self.inner.table.iter().find(|descriptor| descriptor.id() == id)
    }

    /// The phase table built at registration.
    #[must_use]
    pub fn phase_table(&self) -> &PhaseTable {
        &self.inner.table
    }

    /// Returns true if the late phase has been scheduled since the last
    /// disable.
    #[must_use]
    pub fn is_late_scheduled(&self) -> bool {
        self.inner.late_scheduled.load(Ordering::Acquire)
    }

    fn run_blocking(&self, phase: Phase) -> Result<usize, HookerError> {
        let (tx, rx) = oneshot::channel();
        let inner = Arc::clone(&self.inner);
        self.inner.runners.sync().run(Box::new(move || {
            // the caller is blocked on the receiver
            let _ = tx.send(inner.run_phase(phase));
        }));

        futures::executor::block_on(rx).unwrap_or_else(|_| {
            Err(HookerError::TaskAbandoned {
                task: Cow::Borrowed(phase.as_str()),
            })
        })
    }

    fn schedule_late(&self) {
        if self.inner.late_scheduled.swap(true, Ordering::AcqRel) {
            return;
        }
        tracing::debug!(delay = ?self.inner.late_delay, "scheduling late hooks");

        let generation = self.inner.generation.load(Ordering::Acquire);
        let inner = Arc::clone(&self.inner);
        self.inner.runners.delayed().run_delayed(
            Box::new(move || {
                if inner.generation.load(Ordering::Acquire) != generation {
                    tracing::debug!(phase = Phase::Late.as_str(), "engine disabled, late hooks skipped");
                    return;
                }
                if let Err(err) = inner.run_phase(Phase::Late) {
                    tracing::error!(phase = Phase::Late.as_str(), error = %err, "late hooks failed");
                }
            }),
            self.inner.late_delay,
        );
    }
}

impl fmt::Debug for Hooker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooker")
            .field("discovered", &self.inner.table.len())
            .field("active", &self.active_count())
            .field("late_delay", &self.inner.late_delay)
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Phase execution
// ─────────────────────────────────────────────────────────────────────────────

impl Inner {
    fn run_phase(&self, phase: Phase) -> Result<usize, HookerError> {
        let bucket = self.table.bucket(phase);
        tracing::info!(phase = phase.as_str(), hooks = bucket.len(), "loading hooks");

        let mut count = 0;
        for descriptor in bucket {
            if self.activate(descriptor)? {
                count += 1;
            }
        }

        tracing::info!(phase = phase.as_str(), count, "loaded hooks");
        Ok(count)
    }

    /// Evaluates requirements, constructs and starts one hook.
    ///
    /// Returns `Ok(false)` if the hook is already active, a requirement
    /// failed, or start declined.
    fn activate(&self, descriptor: &Arc<HookDescriptor>) -> Result<bool, HookerError> {
        let Some(claim) = Claim::acquire(&self.active, descriptor.key()) else {
            return Ok(false);
        };

        if let Err(failed) = self.requirements_hold(descriptor.requirements()) {
            tracing::debug!(hook = descriptor.id(), requirement = %failed, "requirement not met, skipping");
            return Ok(false);
        }

        let instance = descriptor
            .instantiate()
            .map_err(|source| HookerError::Construct {
                id: descriptor.shared_id(),
                source,
            })?;

        let started = self.start_instance(claim, descriptor, instance)?;
        if started {
            tracing::info!(hook = descriptor.id(), phase = descriptor.phase().as_str(), "hook loaded");
        }
        Ok(started)
    }

    /// Checks requirements in order without holding the registry lock while
    /// a predicate runs.
    fn requirements_hold<'r>(&self, requirements: &'r [Requirement]) -> Result<(), &'r Requirement> {
        for requirement in requirements {
            let predicate = self.requirements.read().predicate(requirement.kind());
            if !predicate.is_some_and(|predicate| predicate(requirement.value())) {
                return Err(requirement);
            }
        }
        Ok(())
    }

    fn start_instance(
        &self,
        claim: Claim<'_>,
        descriptor: &Arc<HookDescriptor>,
        instance: Arc<dyn Component>,
    ) -> Result<bool, HookerError> {
        let outcome = instance.start().map_err(|source| HookerError::Start {
            id: descriptor.shared_id(),
            source,
        })?;

        match outcome {
            StartOutcome::Active => {
                claim.commit(Arc::clone(descriptor), instance);
                Ok(true)
            }
            StartOutcome::Skipped => {
                tracing::debug!(hook = descriptor.id(), "hook declined to start");
                Ok(false)
            }
        }
    }
}
