//! Registration options.

use core::fmt;
use core::time::Duration;
use std::sync::Arc;

use crate::requirement::Predicate;
use crate::runner::Runners;

/// Grace period between the end of the enable phase and the late phase.
pub const DEFAULT_LATE_DELAY: Duration = Duration::from_secs(5);

/// Options passed to [`Hooker::register`](crate::engine::Hooker::register).
///
/// ```
/// use std::time::Duration;
/// use hookstage_engine::options::HookerOptions;
///
/// let options = HookerOptions::new()
///     .with_load_now(true)
///     .with_root("my_plugin::hooks")
///     .with_late_delay(Duration::from_secs(1))
///     .with_dependency_check(|name: &str| name == "PlaceholderAPI");
/// assert!(options.load_now());
/// ```
#[derive(Clone)]
#[must_use]
pub struct HookerOptions {
    load_now: bool,
    roots: Vec<String>,
    late_delay: Duration,
    runners: Runners,
    dependency_check: Option<Predicate>,
}

impl Default for HookerOptions {
    fn default() -> Self {
        Self {
            load_now: false,
            roots: Vec::new(),
            late_delay: DEFAULT_LATE_DELAY,
            runners: Runners::default(),
            dependency_check: None,
        }
    }
}

impl HookerOptions {
    /// Creates options with the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the load phase as part of registration.
    pub fn with_load_now(mut self, load_now: bool) -> Self {
        self.load_now = load_now;
        self
    }

    /// Adds a scan root handed to the discovery source.
    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.roots.push(root.into());
        self
    }

    /// Replaces the scan roots.
    pub fn with_roots<I, S>(mut self, roots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roots = roots.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the delay before the late phase.
    pub fn with_late_delay(mut self, delay: Duration) -> Self {
        self.late_delay = delay;
        self
    }

    /// Sets the runner strategies.
    pub fn with_runners(mut self, runners: Runners) -> Self {
        self.runners = runners;
        self
    }

    /// Installs the default [`"plugin"`](crate::requirement::PLUGIN_REQUIREMENT)
    /// requirement predicate.
    pub fn with_dependency_check(
        mut self,
        check: impl Fn(&str) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.dependency_check = Some(Arc::new(check));
        self
    }

    /// Whether registration runs the load phase.
    #[must_use]
    pub fn load_now(&self) -> bool {
        self.load_now
    }

    /// Scan roots.
    #[must_use]
    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    /// Delay before the late phase.
    #[must_use]
    pub fn late_delay(&self) -> Duration {
        self.late_delay
    }

    /// Runner strategies.
    #[must_use]
    pub fn runners(&self) -> &Runners {
        &self.runners
    }

    /// The default `"plugin"` predicate, if any.
    #[must_use]
    pub fn dependency_check(&self) -> Option<&Predicate> {
        self.dependency_check.as_ref()
    }
}

impl fmt::Debug for HookerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookerOptions")
            .field("load_now", &self.load_now)
            .field("roots", &self.roots)
            .field("late_delay", &self.late_delay)
            .field("runners", &self.runners)
            .field("dependency_check", &self.dependency_check.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = HookerOptions::default();
        assert!(!options.load_now());
        assert!(options.roots().is_empty());
        assert_eq!(options.late_delay(), Duration::from_secs(5));
        assert!(options.dependency_check().is_none());
    }

    #[test]
    fn roots_accumulate_and_replace() {
        let options = HookerOptions::new().with_root("a").with_root("b");
        assert_eq!(options.roots(), ["a", "b"]);

        let options = options.with_roots(["c"]);
        assert_eq!(options.roots(), ["c"]);
    }

    #[test]
    fn dependency_check_is_kept() {
        let options = HookerOptions::new().with_dependency_check(|name| name == "Vault");
        let check = options.dependency_check().unwrap();
        assert!(check("Vault"));
        assert!(!check("Essentials"));
    }
}
