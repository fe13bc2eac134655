//! The process-wide engine slot.
//!
//! Hosts that prefer a single global engine over threading a [`Hooker`]
//! handle around use these free functions. The slot is filled once by
//! [`register`] and emptied by [`shutdown`]; every other operation fails with
//! [`HookerError::NotInitialized`] while it is empty, except [`disable`]
//! which is then a no-op.
//!
//! The slot lock is never held while hooks run, so hook callbacks may use
//! these functions themselves.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::component::Component;
use crate::descriptor::HookKey;
use crate::discovery::DiscoverySource;
use crate::engine::{Hooker, ReloadHandle};
use crate::error::HookerError;
use crate::options::HookerOptions;

static HOOKER: RwLock<Option<Hooker>> = parking_lot::const_rwlock(None);

fn current() -> Result<Hooker, HookerError> {
    HOOKER.read().clone().ok_or(HookerError::NotInitialized)
}

/// Registers the process-wide engine.
///
/// Fails with [`HookerError::AlreadyRegistered`] if the slot is filled. The
/// load phase runs after the engine is in the slot when
/// [`HookerOptions::load_now`] is set.
pub fn register(source: &dyn DiscoverySource, options: HookerOptions) -> Result<Hooker, HookerError> {
    if is_registered() {
        return Err(HookerError::AlreadyRegistered);
    }

    let hooker = Hooker::new(source, &options)?;
    {
        let mut slot = HOOKER.write();
        if slot.is_some() {
            return Err(HookerError::AlreadyRegistered);
        }
        *slot = Some(hooker.clone());
    }

    if options.load_now() {
        hooker.load()?;
    }
    Ok(hooker)
}

/// Returns true if the slot holds an engine.
#[must_use]
pub fn is_registered() -> bool {
    HOOKER.read().is_some()
}

/// Returns a handle to the registered engine.
pub fn hooker() -> Result<Hooker, HookerError> {
    current()
}

/// See [`Hooker::load`].
pub fn load() -> Result<usize, HookerError> {
    current()?.load()
}

/// See [`Hooker::enable`].
pub fn enable() -> Result<usize, HookerError> {
    current()?.enable()
}

/// See [`Hooker::late`].
pub fn late() -> Result<usize, HookerError> {
    current()?.late()
}

/// See [`Hooker::reload`].
pub fn reload() -> Result<ReloadHandle, HookerError> {
    Ok(current()?.reload())
}

/// See [`Hooker::disable`]. Returns zero if nothing is registered.
pub fn disable() -> Result<usize, HookerError> {
    match current() {
        Ok(hooker) => hooker.disable(),
        Err(_) => Ok(0),
    }
}

/// See [`Hooker::requirement`].
pub fn requirement(
    kind: impl Into<String>,
    predicate: impl Fn(&str) -> bool + Send + Sync + 'static,
) -> Result<(), HookerError> {
    current()?.requirement(kind, predicate)
}

/// See [`Hooker::get_hook`].
pub fn get_hook(key: HookKey) -> Result<Option<Arc<dyn Component>>, HookerError> {
    Ok(current()?.get_hook(key))
}

/// See [`Hooker::get`].
pub fn get<H: Component>() -> Result<Option<Arc<H>>, HookerError> {
    Ok(current()?.get::<H>())
}

/// See [`Hooker::loaded_hooks`].
pub fn loaded_hooks() -> Result<Vec<Arc<dyn Component>>, HookerError> {
    Ok(current()?.loaded_hooks())
}

/// Disables every hook and empties the slot.
///
/// The slot is emptied even if a stop callback fails; that error is
/// returned. A new engine may be registered afterwards.
pub fn shutdown() -> Result<usize, HookerError> {
    let Some(hooker) = HOOKER.write().take() else {
        return Ok(0);
    };
    hooker.disable()
}
