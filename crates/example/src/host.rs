//! A stand-in for the host platform: installed plugins and config flags.

use core::time::Duration;
use std::collections::HashSet;
use std::sync::Arc;

use hookstage_engine::prelude::*;
use hookstage_runtime::{RuntimeOptions, TracingSetup};
use tokio::runtime::Handle;

use crate::hooks;

/// Scan root holding the demo's hooks.
pub const HOOK_ROOT: &str = "example::hooks";

/// What the host knows about its environment.
#[derive(Debug, Clone, Default)]
pub struct DemoHost {
    plugins: Arc<HashSet<String>>,
    config: Arc<HashSet<String>>,
    late_delay: Option<Duration>,
    tracing: Option<TracingSetup>,
}

impl DemoHost {
    /// An empty host: no plugins, no config flags.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a plugin as installed.
    #[must_use]
    pub fn with_plugin(mut self, name: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.plugins).insert(name.into());
        self
    }

    /// Turns a config flag on.
    #[must_use]
    pub fn with_config(mut self, key: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).insert(key.into());
        self
    }

    /// Overrides the late-phase delay.
    #[must_use]
    pub fn with_late_delay(mut self, delay: Duration) -> Self {
        self.late_delay = Some(delay);
        self
    }

    /// Installs this subscriber when options are prepared.
    #[must_use]
    pub fn with_tracing(mut self, tracing: TracingSetup) -> Self {
        self.tracing = Some(tracing);
        self
    }

    /// Engine options for this host on `handle`.
    pub fn options(&self, handle: Handle) -> HookerOptions {
        let mut runtime = RuntimeOptions::new().with_root(HOOK_ROOT);
        if let Some(delay) = self.late_delay {
            runtime = runtime.with_late_delay(delay);
        }
        if let Some(tracing) = &self.tracing {
            runtime = runtime.with_tracing(tracing.clone());
        }

        let plugins = Arc::clone(&self.plugins);
        runtime
            .prepare(handle)
            .with_dependency_check(move |name| plugins.contains(name))
    }

    /// Predicate for the `"config"` requirement.
    pub fn config_check(&self) -> impl Fn(&str) -> bool + Send + Sync + 'static {
        let config = Arc::clone(&self.config);
        move |key| config.contains(key)
    }

    /// Registers a standalone engine over the demo's hooks.
    pub fn register(&self, handle: Handle) -> Result<Hooker, HookerError> {
        let hooker = Hooker::register(&hooks::all(), self.options(handle))?;
        hooker.requirement("config", self.config_check())?;
        Ok(hooker)
    }
}
