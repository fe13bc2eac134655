//! Integration test for the process-wide engine slot.
//!
//! The slot is shared by every test in a binary, so the whole scenario runs
//! as one sequential test.

use core::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use hookstage_engine::global;
use hookstage_engine::prelude::*;

static SEEN_BY_START: AtomicUsize = AtomicUsize::new(usize::MAX);

struct Storage;
impl Component for Storage {}
impl Hook for Storage {
    const ID: &'static str = "storage";
    const PHASE: Phase = Phase::Load;
    fn create() -> Result<Self, BoxError> {
        Ok(Self)
    }
}

/// Queries the slot from inside its own start callback.
struct Introspective;
impl Component for Introspective {
    fn start(&self) -> Result<StartOutcome, BoxError> {
        let loaded = global::loaded_hooks()?;
        SEEN_BY_START.store(loaded.len(), Ordering::SeqCst);
        Ok(StartOutcome::Active)
    }
}
impl Hook for Introspective {
    const ID: &'static str = "introspective";
    fn reload_policy() -> Option<ReloadPolicy> {
        Some(ReloadPolicy::sync())
    }
    fn create() -> Result<Self, BoxError> {
        Ok(Self)
    }
}

fn hooks() -> HookSet {
    HookSet::new().add::<Storage>().add::<Introspective>()
}

#[test]
fn global_slot_lifecycle() {
    // before registration
    assert!(!global::is_registered());
    assert!(matches!(global::load(), Err(HookerError::NotInitialized)));
    assert!(matches!(global::enable(), Err(HookerError::NotInitialized)));
    assert!(matches!(global::late(), Err(HookerError::NotInitialized)));
    assert!(matches!(global::reload(), Err(HookerError::NotInitialized)));
    assert!(matches!(global::loaded_hooks(), Err(HookerError::NotInitialized)));
    assert!(matches!(global::get::<Storage>(), Err(HookerError::NotInitialized)));
    assert!(matches!(
        global::requirement("config", |_| true),
        Err(HookerError::NotInitialized)
    ));
    assert_eq!(global::disable().unwrap(), 0);
    assert_eq!(global::shutdown().unwrap(), 0);

    // registration with load_now
    let hooker = global::register(&hooks(), HookerOptions::new().with_load_now(true)).unwrap();
    assert!(global::is_registered());
    assert!(global::get::<Storage>().unwrap().is_some());
    assert!(matches!(
        global::register(&hooks(), HookerOptions::new()),
        Err(HookerError::AlreadyRegistered)
    ));

    global::requirement("config", |_| true).unwrap();
    assert!(global::requirement("config", |_| true).is_err());

    // the start callback reads the slot without deadlocking
    assert_eq!(global::enable().unwrap(), 1);
    assert_eq!(SEEN_BY_START.load(Ordering::SeqCst), 1);

    let introspective = global::get::<Introspective>().unwrap().unwrap();
    let key = hooker.descriptor("introspective").unwrap().key();
    let erased = global::get_hook(key).unwrap().unwrap();
    assert!(Arc::ptr_eq(&(introspective as Arc<dyn Component>), &erased));

    assert_eq!(global::reload().unwrap().wait().unwrap(), 1);
    assert_eq!(SEEN_BY_START.load(Ordering::SeqCst), 1);
    assert_eq!(global::loaded_hooks().unwrap().len(), 2);

    // teardown
    assert_eq!(global::shutdown().unwrap(), 2);
    assert!(!global::is_registered());
    assert!(hooker.loaded_hooks().is_empty());
    assert!(matches!(global::load(), Err(HookerError::NotInitialized)));

    // a fresh engine may be registered after shutdown
    global::register(&hooks(), HookerOptions::new()).unwrap();
    assert_eq!(global::load().unwrap(), 1);
    assert_eq!(global::disable().unwrap(), 1);
    assert_eq!(global::disable().unwrap(), 0);
    assert_eq!(global::shutdown().unwrap(), 0);
}
