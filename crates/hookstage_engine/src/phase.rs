//! Load phases and the phase table.
//!
//! Phases are strictly ordered `Load < Enable < Late`. The [`PhaseTable`]
//! partitions discovered descriptors into one bucket per phase, preserving
//! discovery order within each bucket. It is built exactly once, when the
//! engine is registered.

use core::fmt;
use std::sync::Arc;

use hashbrown::HashSet;

use crate::descriptor::{HookDescriptor, HookKey};
use crate::discovery::{DiscoveryError, DiscoverySource};

// ─────────────────────────────────────────────────────────────────────────────
// Phase
// ─────────────────────────────────────────────────────────────────────────────

/// The stage at which a hook is activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Phase {
    /// Activated while the host is loading. Load hooks should not depend on
    /// other plugins, which may not be available yet.
    Load,
    /// Activated while the host is enabling. Most hooks use this phase.
    #[default]
    Enable,
    /// Activated after a grace period once the host considers itself started.
    Late,
}

impl Phase {
    /// All phases in execution order.
    pub const ALL: [Phase; 3] = [Phase::Load, Phase::Enable, Phase::Late];

    /// Lower-case phase name, as used in log fields.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Phase::Load => "load",
            Phase::Enable => "enable",
            Phase::Late => "late",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// PhaseTable
// ─────────────────────────────────────────────────────────────────────────────

/// Descriptors bucketed by phase.
#[derive(Debug, Default, Clone)]
pub struct PhaseTable {
    load: Vec<Arc<HookDescriptor>>,
    enable: Vec<Arc<HookDescriptor>>,
    late: Vec<Arc<HookDescriptor>>,
}

impl PhaseTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs discovery and partitions the result.
    ///
    /// Candidates that fail individually are logged and skipped. A failure
    /// of the discovery mechanism itself aborts with an error.
    pub fn discover(
        source: &dyn DiscoverySource,
        roots: &[String],
    ) -> Result<Self, DiscoveryError> {
        let candidates = source.discover(roots)?;
        let descriptors = candidates.into_iter().filter_map(|candidate| match candidate {
            Ok(descriptor) => Some(descriptor),
            Err(err) => {
                tracing::warn!(candidate = %err.candidate(), error = %err, "skipping hook candidate");
                None
            }
        });
        Ok(Self::from_descriptors(descriptors))
    }

    /// Partitions descriptors by phase, keeping the first occurrence of
    /// each key.
    #[must_use]
    pub fn from_descriptors(descriptors: impl IntoIterator<Item = HookDescriptor>) -> Self {
        let mut table = Self::new();
        let mut seen = HashSet::new();
        for descriptor in descriptors {
            if !seen.insert(descriptor.key()) {
                tracing::warn!(hook = descriptor.id(), "duplicate hook descriptor ignored");
                continue;
            }
            table.bucket_mut(descriptor.phase()).push(Arc::new(descriptor));
        }
        table
    }

    fn bucket_mut(&mut self, phase: Phase) -> &mut Vec<Arc<HookDescriptor>> {
        match phase {
            Phase::Load => &mut self.load,
            Phase::Enable => &mut self.enable,
            Phase::Late => &mut self.late,
        }
    }

    /// Descriptors of one phase, in discovery order.
    #[must_use]
    pub fn bucket(&self, phase: Phase) -> &[Arc<HookDescriptor>] {
        match phase {
            Phase::Load => &self.load,
            Phase::Enable => &self.enable,
            Phase::Late => &self.late,
        }
    }

    /// All descriptors, phase by phase.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<HookDescriptor>> {
        Phase::ALL
            .into_iter()
            .flat_map(|phase| self.bucket(phase).iter())
    }

    /// Descriptors considered by a reload: the enable and late buckets.
    pub fn reload_candidates(&self) -> impl Iterator<Item = &Arc<HookDescriptor>> {
        self.enable.iter().chain(self.late.iter())
    }

    /// Finds a descriptor by key.
    #[must_use]
    pub fn find(&self, key: HookKey) -> Option<&Arc<HookDescriptor>> {
        self.iter().find(|descriptor| descriptor.key() == key)
    }

    /// Total number of descriptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.load.len() + self.enable.len() + self.late.len()
    }

    /// Returns true if no descriptors were discovered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Component;
    use crate::descriptor::DescriptorError;
    use crate::discovery::{CandidateError, Discovered};

    struct Noop;
    impl Component for Noop {}

    fn descriptor(id: &'static str, phase: Phase) -> HookDescriptor {
        HookDescriptor::builder(id)
            .phase(phase)
            .factory(|| Ok(Noop))
            .build()
            .unwrap()
    }

    fn ids(descriptors: &[Arc<HookDescriptor>]) -> Vec<&str> {
        descriptors.iter().map(|d| d.id()).collect()
    }

    #[test]
    fn phases_are_strictly_ordered() {
        assert!(Phase::Load < Phase::Enable);
        assert!(Phase::Enable < Phase::Late);
        assert_eq!(Phase::default(), Phase::Enable);
        assert_eq!(Phase::Late.to_string(), "late");
    }

    #[test]
    fn table_partitions_by_phase_in_order() {
        let table = PhaseTable::from_descriptors([
            descriptor("a", Phase::Enable),
            descriptor("b", Phase::Load),
            descriptor("c", Phase::Late),
            descriptor("d", Phase::Enable),
        ]);

        assert_eq!(ids(table.bucket(Phase::Load)), ["b"]);
        assert_eq!(ids(table.bucket(Phase::Enable)), ["a", "d"]);
        assert_eq!(ids(table.bucket(Phase::Late)), ["c"]);
        assert_eq!(table.len(), 4);

        let all: Vec<&str> = table.iter().map(|d| d.id()).collect();
        assert_eq!(all, ["b", "a", "d", "c"]);

        let reload: Vec<&str> = table.reload_candidates().map(|d| d.id()).collect();
        assert_eq!(reload, ["a", "d", "c"]);
    }

    #[test]
    fn duplicate_keys_are_kept_once() {
        let a = descriptor("a", Phase::Enable);
        let table = PhaseTable::from_descriptors([a.clone(), a.clone()]);
        assert_eq!(table.len(), 1);
        assert!(table.find(a.key()).is_some());
    }

    #[test]
    fn same_id_different_descriptors_are_distinct() {
        let table = PhaseTable::from_descriptors([
            descriptor("same", Phase::Enable),
            descriptor("same", Phase::Enable),
        ]);
        assert_eq!(table.bucket(Phase::Enable).len(), 2);
    }

    #[test]
    fn discover_swallows_candidate_errors() {
        let good = descriptor("good", Phase::Load);
        let source = move |_roots: &[String]| -> Discovered {
            Ok(vec![
                Ok(good.clone()),
                Err(CandidateError::new(
                    "Broken",
                    DescriptorError::MissingFactory("Broken".into()),
                )),
            ])
        };

        let table = PhaseTable::discover(&source, &[]).unwrap();
        assert_eq!(ids(table.bucket(Phase::Load)), ["good"]);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn discover_propagates_mechanism_failures() {
        let source = |_roots: &[String]| -> Discovered {
            Err(DiscoveryError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "hook index missing",
            )))
        };

        let err = PhaseTable::discover(&source, &[]).unwrap_err();
        assert!(matches!(err, DiscoveryError::Io(_)));
    }
}
