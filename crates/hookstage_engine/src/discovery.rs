//! Discovery sources.
//!
//! The engine does not find hooks itself. At registration it asks a
//! [`DiscoverySource`] for every candidate under the configured scan roots
//! and builds its [`PhaseTable`](crate::phase::PhaseTable) from the answer.
//!
//! [`HookSet`] is the built-in source: an explicit registration list, in the
//! spirit of a plugin group.
//!
//! ```
//! use hookstage_engine::component::{BoxError, Component, Hook};
//! use hookstage_engine::discovery::{DiscoverySource, HookSet};
//!
//! struct Economy;
//! impl Component for Economy {}
//! impl Hook for Economy {
//!     const ID: &'static str = "economy";
//!     fn create() -> Result<Self, BoxError> { Ok(Self) }
//! }
//!
//! let hooks = HookSet::new().add::<Economy>();
//! let found = hooks.discover(&[]).unwrap();
//! assert_eq!(found.len(), 1);
//! ```

use crate::component::Hook;
use crate::descriptor::{DescriptorError, HookDescriptor};

/// One discovered candidate: a descriptor, or the reason it was rejected.
pub type Candidate = Result<HookDescriptor, CandidateError>;

/// Everything a discovery run produced.
pub type Discovered = Result<Vec<Candidate>, DiscoveryError>;

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Failure of the discovery mechanism itself. Aborts registration.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    /// Reading the hook index or artifacts failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    /// The source could not produce a candidate list for another reason.
    #[error("{0}")]
    Source(String),
}

/// Failure of a single candidate. The candidate is skipped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("candidate '{candidate}' rejected: {source}")]
pub struct CandidateError {
    candidate: String,
    #[source]
    source: DescriptorError,
}

impl CandidateError {
    /// Creates a candidate error.
    #[must_use]
    pub fn new(candidate: impl Into<String>, source: DescriptorError) -> Self {
        Self {
            candidate: candidate.into(),
            source,
        }
    }

    /// Name of the rejected candidate.
    #[must_use]
    pub fn candidate(&self) -> &str {
        &self.candidate
    }

    /// Why the candidate was rejected.
    #[must_use]
    pub fn reason(&self) -> &DescriptorError {
        &self.source
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// DiscoverySource
// ─────────────────────────────────────────────────────────────────────────────

/// Supplies hook descriptors under a set of scan roots.
///
/// Called exactly once, when the engine is registered. An empty root list
/// means "everything this source knows about".
///
/// Closures of the shape `Fn(&[String]) -> Discovered` are sources too.
pub trait DiscoverySource: Send + Sync {
    /// Returns every candidate under `roots`, in discovery order.
    fn discover(&self, roots: &[String]) -> Discovered;
}

impl<F> DiscoverySource for F
where
    F: Fn(&[String]) -> Discovered + Send + Sync,
{
    fn discover(&self, roots: &[String]) -> Discovered {
        self(roots)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// HookSet
// ─────────────────────────────────────────────────────────────────────────────

/// An explicit, ordered list of hooks.
///
/// Typed hooks that fail descriptor validation are kept as rejected
/// candidates so that discovery reports and skips them.
#[derive(Debug, Default, Clone)]
#[must_use]
pub struct HookSet {
    candidates: Vec<Candidate>,
}

impl HookSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self {
            candidates: Vec::new(),
        }
    }

    /// Adds a typed hook.
    pub fn add<H: Hook>(mut self) -> Self {
        let candidate = HookDescriptor::of::<H>()
            .map_err(|err| CandidateError::new(core::any::type_name::<H>(), err));
        self.candidates.push(candidate);
        self
    }

    /// Adds a prebuilt descriptor.
    pub fn add_descriptor(mut self, descriptor: HookDescriptor) -> Self {
        self.candidates.push(Ok(descriptor));
        self
    }

    /// Removes a typed hook from the set. No-op if it is absent.
    pub fn disable<H: Hook>(mut self) -> Self {
        let target = core::any::type_name::<H>();
        self.candidates.retain(|candidate| match candidate {
            Ok(descriptor) => descriptor.path() != Some(target),
            Err(err) => err.candidate() != target,
        });
        self
    }

    /// Returns the number of candidates, rejected ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Returns true if the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

impl DiscoverySource for HookSet {
    fn discover(&self, roots: &[String]) -> Discovered {
        let candidates = self
            .candidates
            .iter()
            .filter(|candidate| match candidate {
                Ok(descriptor) => {
                    roots.is_empty() || roots.iter().any(|root| descriptor.is_under(root))
                }
                Err(_) => true,
            })
            .cloned()
            .collect();
        Ok(candidates)
    }
}
