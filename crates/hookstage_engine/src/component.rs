//! Component capabilities and the typed [`Hook`] declaration.
//!
//! A component is the live object a descriptor's factory produces. Its start
//! and stop behavior are optional: the default [`Component::start`] always
//! reports [`StartOutcome::Active`] and the default [`Component::stop`] does
//! nothing, so a component only overrides the callbacks it cares about.
//!
//! # Example
//!
//! ```
//! use hookstage_engine::component::{BoxError, Component, Hook, ReloadPolicy, StartOutcome};
//! use hookstage_engine::phase::Phase;
//! use hookstage_engine::requirement::Requirement;
//!
//! struct PlaceholderHook;
//!
//! impl Component for PlaceholderHook {
//!     fn start(&self) -> Result<StartOutcome, BoxError> {
//!         // register placeholders...
//!         Ok(StartOutcome::Active)
//!     }
//! }
//!
//! impl Hook for PlaceholderHook {
//!     const ID: &'static str = "placeholders";
//!     const PHASE: Phase = Phase::Enable;
//!
//!     fn requirements() -> Vec<Requirement> {
//!         vec![Requirement::plugin("PlaceholderAPI")]
//!     }
//!
//!     fn reload_policy() -> Option<ReloadPolicy> {
//!         Some(ReloadPolicy::sync())
//!     }
//!
//!     fn create() -> Result<Self, BoxError> {
//!         Ok(Self)
//!     }
//! }
//! ```

use downcast_rs::{DowncastSync, impl_downcast};

use crate::phase::Phase;
use crate::requirement::Requirement;

/// Boxed error returned by component factories and callbacks.
pub type BoxError = Box<dyn core::error::Error + Send + Sync + 'static>;

// ─────────────────────────────────────────────────────────────────────────────
// StartOutcome
// ─────────────────────────────────────────────────────────────────────────────

/// Result of a successful [`Component::start`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StartOutcome {
    /// The component is running and should be tracked as active.
    #[default]
    Active,
    /// The component decided it does not apply (for example an optional
    /// runtime setting is missing). The instance is discarded.
    Skipped,
}

impl StartOutcome {
    /// Returns true for [`StartOutcome::Active`].
    #[must_use]
    pub fn is_active(self) -> bool {
        self == Self::Active
    }
}

impl From<bool> for StartOutcome {
    fn from(active: bool) -> Self {
        if active { Self::Active } else { Self::Skipped }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Component
// ─────────────────────────────────────────────────────────────────────────────

/// A live hook instance.
///
/// Callbacks take `&self` because a reload may run on a background runner
/// while the engine keeps handing the same instance out through
/// [`Hooker::get_hook`](crate::engine::Hooker::get_hook). Components that keep
/// mutable state use interior mutability.
pub trait Component: DowncastSync {
    /// Activates the component.
    ///
    /// Returning [`StartOutcome::Skipped`] is not an error: the instance is
    /// dropped and the load is reported as a non-load.
    fn start(&self) -> Result<StartOutcome, BoxError> {
        Ok(StartOutcome::Active)
    }

    /// Deactivates the component.
    ///
    /// The engine removes the component from its active set even when this
    /// returns an error.
    fn stop(&self) -> Result<(), BoxError> {
        Ok(())
    }
}

impl_downcast!(sync Component);

// ─────────────────────────────────────────────────────────────────────────────
// ReloadPolicy
// ─────────────────────────────────────────────────────────────────────────────

/// Marks a hook as safely restartable at runtime.
///
/// `asynchronous` selects the runner used for the stop-then-start unit: the
/// async runner when true, the synchronous runner otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReloadPolicy {
    asynchronous: bool,
}

impl ReloadPolicy {
    /// Reload on the synchronous runner.
    #[must_use]
    pub const fn sync() -> Self {
        Self {
            asynchronous: false,
        }
    }

    /// Reload on the async runner, off the host's primary context.
    #[must_use]
    pub const fn asynchronous() -> Self {
        Self { asynchronous: true }
    }

    /// Returns true if reloads run on the async runner.
    #[must_use]
    pub const fn is_async(&self) -> bool {
        self.asynchronous
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Hook
// ─────────────────────────────────────────────────────────────────────────────

/// Static declaration of a hook type.
///
/// This is the typed form of a descriptor: the associated items are read once
/// by [`HookDescriptor::of`](crate::descriptor::HookDescriptor::of) and the
/// engine never inspects the type again.
pub trait Hook: Component + Sized {
    /// Identifier used in log lines. Not required to be unique.
    const ID: &'static str;

    /// Phase in which the hook is activated.
    const PHASE: Phase = Phase::Enable;

    /// Requirements that must all hold before the hook is constructed.
    fn requirements() -> Vec<Requirement> {
        Vec::new()
    }

    /// Returns `Some` if the hook may be restarted by a reload.
    fn reload_policy() -> Option<ReloadPolicy> {
        None
    }

    /// Constructs a fresh instance.
    fn create() -> Result<Self, BoxError>;
}
