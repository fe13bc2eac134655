//! Named requirement predicates.
//!
//! A hook declares an ordered list of `(type, value)` [`Requirement`]s. Each
//! requirement type maps to a predicate over the value in the
//! [`RequirementRegistry`]; all of a hook's requirements must hold for it to
//! be constructed. A requirement whose type has no predicate fails.
//!
//! # Example
//!
//! ```
//! use hookstage_engine::requirement::{Requirement, RequirementRegistry};
//!
//! let mut registry = RequirementRegistry::new();
//! registry
//!     .try_register("config", |key: &str| key == "enable-metrics")
//!     .unwrap();
//!
//! assert!(registry.check("config", "enable-metrics"));
//! assert!(!registry.check("config", "something-else"));
//! assert!(!registry.check("unknown", "anything"));
//!
//! let reqs = [Requirement::new("config", "enable-metrics")];
//! assert!(registry.evaluate(&reqs).is_ok());
//! ```

use core::fmt;
use std::sync::Arc;

use hashbrown::HashMap;

/// Requirement type used when a hook names a dependency without a type.
pub const PLUGIN_REQUIREMENT: &str = "plugin";

/// A predicate over a requirement value.
pub type Predicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

// ─────────────────────────────────────────────────────────────────────────────
// Requirement
// ─────────────────────────────────────────────────────────────────────────────

/// A named, parameterized precondition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Requirement {
    kind: String,
    value: String,
}

impl Requirement {
    /// Creates a requirement of the given type.
    #[must_use]
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
        }
    }

    /// Creates a requirement of the default [`PLUGIN_REQUIREMENT`] type.
    #[must_use]
    pub fn plugin(value: impl Into<String>) -> Self {
        Self::new(PLUGIN_REQUIREMENT, value)
    }

    /// The requirement type (the registry key).
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The value handed to the predicate.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.kind, self.value)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// RequirementError
// ─────────────────────────────────────────────────────────────────────────────

/// Errors raised by explicit requirement registration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequirementError {
    /// A predicate is already registered for this type.
    #[error("requirement '{0}' already exists")]
    Duplicate(String),
}

// ─────────────────────────────────────────────────────────────────────────────
// RequirementRegistry
// ─────────────────────────────────────────────────────────────────────────────

/// Maps requirement types to predicates.
#[derive(Default, Clone)]
pub struct RequirementRegistry {
    predicates: HashMap<String, Predicate>,
}

impl RequirementRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            predicates: HashMap::new(),
        }
    }

    /// Registers a predicate, replacing any existing one for `kind`.
    ///
    /// Used for defaults installed by the host. Returns the replaced
    /// predicate, if any.
    pub fn register(
        &mut self,
        kind: impl Into<String>,
        predicate: impl Fn(&str) -> bool + Send + Sync + 'static,
    ) -> Option<Predicate> {
        self.predicates.insert(kind.into(), Arc::new(predicate))
    }

    /// Registers a predicate, failing if `kind` already has one.
    pub fn try_register(
        &mut self,
        kind: impl Into<String>,
        predicate: impl Fn(&str) -> bool + Send + Sync + 'static,
    ) -> Result<(), RequirementError> {
        let kind = kind.into();
        if self.predicates.contains_key(&kind) {
            return Err(RequirementError::Duplicate(kind));
        }
        self.predicates.insert(kind, Arc::new(predicate));
        Ok(())
    }

    /// Returns true if a predicate is registered for `kind`.
    #[must_use]
    pub fn exists(&self, kind: &str) -> bool {
        self.predicates.contains_key(kind)
    }

    /// Returns the predicate registered for `kind`.
    #[must_use]
    pub fn predicate(&self, kind: &str) -> Option<Predicate> {
        self.predicates.get(kind).cloned()
    }

    /// Checks one requirement. Unknown types fail.
    #[must_use]
    pub fn check(&self, kind: &str, value: &str) -> bool {
        self.predicates
            .get(kind)
            .is_some_and(|predicate| predicate(value))
    }

    /// Checks every requirement in order, stopping at the first failure.
    ///
    /// An empty list always passes.
    pub fn evaluate<'r>(&self, requirements: &'r [Requirement]) -> Result<(), &'r Requirement> {
        match requirements
            .iter()
            .find(|req| !self.check(req.kind(), req.value()))
        {
            Some(failed) => Err(failed),
            None => Ok(()),
        }
    }

    /// Returns the number of registered requirement types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    /// Returns true if no requirement types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

impl fmt::Debug for RequirementRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequirementRegistry")
            .field("types", &self.predicates.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn unknown_type_fails_closed() {
        let registry = RequirementRegistry::new();
        assert!(!registry.exists("plugin"));
        assert!(!registry.check("plugin", "PlaceholderAPI"));
    }

    #[test]
    fn register_overwrites_silently() {
        let mut registry = RequirementRegistry::new();
        assert!(registry.register("plugin", |_| false).is_none());
        assert!(registry.register("plugin", |_| true).is_some());
        assert!(registry.check("plugin", "anything"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn try_register_rejects_duplicates() {
        let mut registry = RequirementRegistry::new();
        registry.try_register("config", |_| true).unwrap();

        let err = registry.try_register("config", |_| false).unwrap_err();
        assert_eq!(err, RequirementError::Duplicate("config".into()));
        assert_eq!(err.to_string(), "requirement 'config' already exists");
        // the first predicate survives
        assert!(registry.check("config", "x"));
    }

    #[test]
    fn predicate_receives_value() {
        let mut registry = RequirementRegistry::new();
        registry.register("plugin", |name| name == "Vault");
        assert!(registry.check("plugin", "Vault"));
        assert!(!registry.check("plugin", "Essentials"));
    }

    #[test]
    fn evaluate_empty_passes() {
        let registry = RequirementRegistry::new();
        assert!(registry.evaluate(&[]).is_ok());
    }

    #[test]
    fn evaluate_short_circuits_on_first_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = RequirementRegistry::new();
        let counter = Arc::clone(&calls);
        registry.register("counted", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        });
        registry.register("never", |_| false);

        let reqs = [
            Requirement::new("counted", "a"),
            Requirement::new("never", "b"),
            Requirement::new("counted", "c"),
        ];

        let failed = registry.evaluate(&reqs).unwrap_err();
        assert_eq!(failed, &reqs[1]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn plugin_requirement_uses_default_type() {
        let req = Requirement::plugin("PlaceholderAPI");
        assert_eq!(req.kind(), PLUGIN_REQUIREMENT);
        assert_eq!(req.value(), "PlaceholderAPI");
        assert_eq!(req.to_string(), "plugin=PlaceholderAPI");
    }
}
