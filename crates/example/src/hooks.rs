//! The demo's hooks, one per phase.

use core::sync::atomic::{AtomicUsize, Ordering};

use hookstage_engine::prelude::*;

/// Config key that gates [`ConfigReporter`].
pub const REPORTER_KEY: &str = "test-hook";

/// Plugin that gates [`PlaceholderBridge`].
pub const PLACEHOLDER_PLUGIN: &str = "PlaceholderAPI";

// ─────────────────────────────────────────────────────────────────────────────
// Load
// ─────────────────────────────────────────────────────────────────────────────

/// Reports configuration as soon as the host loads. Never reloaded.
#[derive(Debug)]
pub struct ConfigReporter;

impl Component for ConfigReporter {
    fn start(&self) -> Result<StartOutcome, BoxError> {
        tracing::info!(hook = Self::ID, "configuration reported");
        Ok(StartOutcome::Active)
    }
}

impl Hook for ConfigReporter {
    const ID: &'static str = "config-reporter";
    const PHASE: Phase = Phase::Load;

    fn requirements() -> Vec<Requirement> {
        vec![Requirement::new("config", REPORTER_KEY)]
    }

    fn create() -> Result<Self, BoxError> {
        Ok(Self)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Enable
// ─────────────────────────────────────────────────────────────────────────────

/// Bridges to an optional placeholder plugin. Restarts inline on reload.
#[derive(Debug, Default)]
pub struct PlaceholderBridge {
    starts: AtomicUsize,
}

impl PlaceholderBridge {
    /// How many times this instance was started.
    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }
}

impl Component for PlaceholderBridge {
    fn start(&self) -> Result<StartOutcome, BoxError> {
        let generation = self.starts.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!(hook = Self::ID, generation, "placeholders registered");
        Ok(StartOutcome::Active)
    }

    fn stop(&self) -> Result<(), BoxError> {
        tracing::info!(hook = Self::ID, "placeholders unregistered");
        Ok(())
    }
}

impl Hook for PlaceholderBridge {
    const ID: &'static str = "placeholder-bridge";

    fn requirements() -> Vec<Requirement> {
        vec![Requirement::plugin(PLACEHOLDER_PLUGIN)]
    }

    fn reload_policy() -> Option<ReloadPolicy> {
        Some(ReloadPolicy::sync())
    }

    fn create() -> Result<Self, BoxError> {
        Ok(Self::default())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Late
// ─────────────────────────────────────────────────────────────────────────────

/// Warms a cache once the host is fully up. Reloads off the main thread.
#[derive(Debug, Default)]
pub struct CacheWarmer {
    warmed: AtomicUsize,
}

impl CacheWarmer {
    /// How many times the cache was warmed.
    pub fn warmed(&self) -> usize {
        self.warmed.load(Ordering::SeqCst)
    }
}

impl Component for CacheWarmer {
    fn start(&self) -> Result<StartOutcome, BoxError> {
        self.warmed.fetch_add(1, Ordering::SeqCst);
        tracing::info!(
            hook = Self::ID,
            thread = std::thread::current().name().unwrap_or("unnamed"),
            "cache warmed"
        );
        Ok(StartOutcome::Active)
    }
}

impl Hook for CacheWarmer {
    const ID: &'static str = "cache-warmer";
    const PHASE: Phase = Phase::Late;

    fn reload_policy() -> Option<ReloadPolicy> {
        Some(ReloadPolicy::asynchronous())
    }

    fn create() -> Result<Self, BoxError> {
        Ok(Self::default())
    }
}

/// Every hook the demo ships.
pub fn all() -> HookSet {
    HookSet::new()
        .add::<ConfigReporter>()
        .add::<PlaceholderBridge>()
        .add::<CacheWarmer>()
}
