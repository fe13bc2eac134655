//! The active registry.
//!
//! Tracks exactly the instances that were started and not yet stopped. A key
//! being started or restarted is "in flight": it cannot be claimed again
//! until the owning [`Claim`] commits or is dropped.

use std::sync::Arc;

use hashbrown::{HashMap, HashSet};
use parking_lot::Mutex;

use crate::component::Component;
use crate::descriptor::{HookDescriptor, HookKey};

/// A started hook.
#[derive(Clone)]
pub(crate) struct ActiveHook {
    pub(crate) descriptor: Arc<HookDescriptor>,
    pub(crate) instance: Arc<dyn Component>,
    seq: u64,
}

#[derive(Default)]
pub(crate) struct ActiveRegistry {
    entries: HashMap<HookKey, ActiveHook>,
    in_flight: HashSet<HookKey>,
    next_seq: u64,
}

impl ActiveRegistry {
    pub(crate) fn get(&self, key: HookKey) -> Option<&ActiveHook> {
        self.entries.get(&key)
    }

    pub(crate) fn contains(&self, key: HookKey) -> bool {
        self.entries.contains_key(&key)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    fn claim(&mut self, key: HookKey) -> bool {
        !self.entries.contains_key(&key) && self.in_flight.insert(key)
    }

    /// Removes an active hook for a restart, keeping its key claimed.
    fn take_for_restart(&mut self, key: HookKey) -> Option<ActiveHook> {
        if self.in_flight.contains(&key) {
            return None;
        }
        let hook = self.entries.remove(&key)?;
        self.in_flight.insert(key);
        Some(hook)
    }

    fn commit(&mut self, descriptor: Arc<HookDescriptor>, instance: Arc<dyn Component>) {
        let key = descriptor.key();
        self.in_flight.remove(&key);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert(
            key,
            ActiveHook {
                descriptor,
                instance,
                seq,
            },
        );
    }

    fn release(&mut self, key: HookKey) {
        self.in_flight.remove(&key);
    }

    /// Empties the registry, newest activation first.
    pub(crate) fn drain_newest_first(&mut self) -> Vec<ActiveHook> {
        let mut hooks: Vec<ActiveHook> = self.entries.drain().map(|(_, hook)| hook).collect();
        hooks.sort_unstable_by(|a, b| b.seq.cmp(&a.seq));
        hooks
    }
}

/// Exclusive right to start one key.
///
/// Dropping the claim without committing releases the key.
pub(crate) struct Claim<'a> {
    registry: &'a Mutex<ActiveRegistry>,
    key: HookKey,
}

impl<'a> Claim<'a> {
    /// Claims an inactive key. Returns `None` if the key is active or in flight.
    pub(crate) fn acquire(registry: &'a Mutex<ActiveRegistry>, key: HookKey) -> Option<Self> {
        let claimed = registry.lock().claim(key);
        claimed.then(|| Self { registry, key })
    }

    /// Takes an active hook out of the registry for a restart.
    pub(crate) fn restart(
        registry: &'a Mutex<ActiveRegistry>,
        key: HookKey,
    ) -> Option<(Self, ActiveHook)> {
        let hook = registry.lock().take_for_restart(key)?;
        Some((Self { registry, key }, hook))
    }

    /// Records the instance as active.
    pub(crate) fn commit(self, descriptor: Arc<HookDescriptor>, instance: Arc<dyn Component>) {
        self.registry.lock().commit(descriptor, instance);
        core::mem::forget(self);
    }
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        self.registry.lock().release(self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;
    impl Component for Noop {}

    fn descriptor(id: &'static str) -> Arc<HookDescriptor> {
        Arc::new(
            HookDescriptor::builder(id)
                .factory(|| Ok(Noop))
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn claim_is_exclusive_until_released() {
        let registry = Mutex::new(ActiveRegistry::default());
        let d = descriptor("a");

        let claim = Claim::acquire(&registry, d.key()).unwrap();
        assert!(Claim::acquire(&registry, d.key()).is_none());
        drop(claim);
        assert!(Claim::acquire(&registry, d.key()).is_some());
    }

    #[test]
    fn committed_keys_cannot_be_claimed() {
        let registry = Mutex::new(ActiveRegistry::default());
        let d = descriptor("a");

        Claim::acquire(&registry, d.key())
            .unwrap()
            .commit(Arc::clone(&d), Arc::new(Noop));
        assert!(registry.lock().contains(d.key()));
        assert!(Claim::acquire(&registry, d.key()).is_none());
    }

    #[test]
    fn restart_takes_entry_out() {
        let registry = Mutex::new(ActiveRegistry::default());
        let d = descriptor("a");
        Claim::acquire(&registry, d.key())
            .unwrap()
            .commit(Arc::clone(&d), Arc::new(Noop));

        let (claim, hook) = Claim::restart(&registry, d.key()).unwrap();
        assert!(!registry.lock().contains(d.key()));
        assert!(Claim::restart(&registry, d.key()).is_none());
        assert!(Claim::acquire(&registry, d.key()).is_none());

        claim.commit(hook.descriptor, hook.instance);
        assert!(registry.lock().contains(d.key()));
    }

    #[test]
    fn dropped_restart_claim_leaves_hook_removed() {
        let registry = Mutex::new(ActiveRegistry::default());
        let d = descriptor("a");
        Claim::acquire(&registry, d.key())
            .unwrap()
            .commit(Arc::clone(&d), Arc::new(Noop));

        let (claim, _hook) = Claim::restart(&registry, d.key()).unwrap();
        drop(claim);
        assert_eq!(registry.lock().len(), 0);
        assert!(Claim::acquire(&registry, d.key()).is_some());
    }

    #[test]
    fn drain_returns_newest_first() {
        let registry = Mutex::new(ActiveRegistry::default());
        let hooks = [descriptor("a"), descriptor("b"), descriptor("c")];
        for d in &hooks {
            Claim::acquire(&registry, d.key())
                .unwrap()
                .commit(Arc::clone(d), Arc::new(Noop));
        }

        let drained = registry.lock().drain_newest_first();
        let ids: Vec<&str> = drained.iter().map(|hook| hook.descriptor.id()).collect();
        assert_eq!(ids, ["c", "b", "a"]);
        assert_eq!(registry.lock().len(), 0);
    }
}
