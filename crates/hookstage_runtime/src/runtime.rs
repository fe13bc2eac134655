//! Host runtime bundle.

use core::time::Duration;

use hookstage_engine::options::{DEFAULT_LATE_DELAY, HookerOptions};
use tokio::runtime::Handle;

use crate::tokio_runner::TokioRunners;
use crate::tracing_setup::TracingSetup;

/// Everything a tokio host needs to register the engine.
///
/// [`RuntimeOptions::prepare`] installs logging and returns
/// [`HookerOptions`] wired to [`TokioRunners`].
///
/// ```
/// use std::time::Duration;
/// use hookstage_runtime::{RuntimeOptions, TracingSetup};
///
/// let runtime = tokio::runtime::Builder::new_multi_thread()
///     .enable_time()
///     .build()
///     .unwrap();
///
/// let options = RuntimeOptions::new()
///     .with_tracing(TracingSetup::new())
///     .with_late_delay(Duration::from_millis(100))
///     .with_root("my_plugin::hooks")
///     .prepare(runtime.handle().clone());
///
/// assert_eq!(options.late_delay(), Duration::from_millis(100));
/// assert_eq!(options.roots(), ["my_plugin::hooks"]);
/// ```
#[derive(Debug, Clone)]
#[must_use]
pub struct RuntimeOptions {
    tracing: Option<TracingSetup>,
    late_delay: Duration,
    roots: Vec<String>,
    load_now: bool,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            tracing: None,
            late_delay: DEFAULT_LATE_DELAY,
            roots: Vec::new(),
            load_now: false,
        }
    }
}

impl RuntimeOptions {
    /// Creates options with the defaults: no logging setup, 5 s late delay.
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs this subscriber in [`RuntimeOptions::prepare`].
    pub fn with_tracing(mut self, tracing: TracingSetup) -> Self {
        self.tracing = Some(tracing);
        self
    }

    /// Sets the delay before the late phase.
    pub fn with_late_delay(mut self, delay: Duration) -> Self {
        self.late_delay = delay;
        self
    }

    /// Adds a scan root.
    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.roots.push(root.into());
        self
    }

    /// Runs the load phase during registration.
    pub fn with_load_now(mut self, load_now: bool) -> Self {
        self.load_now = load_now;
        self
    }

    /// Installs logging and builds engine options on `handle`.
    pub fn prepare(self, handle: Handle) -> HookerOptions {
        if let Some(tracing) = &self.tracing {
            tracing.install();
        }

        HookerOptions::new()
            .with_runners(TokioRunners::new(handle).into())
            .with_late_delay(self.late_delay)
            .with_roots(self.roots)
            .with_load_now(self.load_now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn prepare_carries_settings() {
        let options = RuntimeOptions::new()
            .with_late_delay(Duration::from_secs(1))
            .with_root("a")
            .with_root("b")
            .with_load_now(true)
            .prepare(Handle::current());

        assert_eq!(options.late_delay(), Duration::from_secs(1));
        assert_eq!(options.roots(), ["a", "b"]);
        assert!(options.load_now());
    }

    #[test]
    fn default_late_delay_matches_engine() {
        assert_eq!(RuntimeOptions::default().late_delay, DEFAULT_LATE_DELAY);
    }
}
