//! A staged component lifecycle manager.
//!
//! Hooks are discovered once, bucketed into load, enable and late phases,
//! gated behind named requirement predicates, and started in phase order.
//! Reloadable hooks can be restarted later, and disable stops everything
//! newest first.

pub use hookstage_internal::*;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use hookstage_internal::prelude::*;
}
