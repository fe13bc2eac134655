//! Staged hook lifecycle engine.
//!
//! `hookstage_engine` discovers self-contained hooks, orders them into load
//! phases, gates each one behind declarative requirement checks, starts them
//! in phase order, and supports reloading and orderly shutdown:
//!
//! - [`component`] - The `Component` capability trait and typed `Hook` declaration
//! - [`descriptor`] - Static hook metadata and the descriptor builder
//! - [`discovery`] - Discovery sources and the explicit `HookSet`
//! - [`engine`] - The `Hooker` lifecycle engine
//! - [`global`] - The process-wide engine slot
//! - [`phase`] - Load phases and the phase table
//! - [`requirement`] - Named requirement predicates
//! - [`runner`] - Injectable sync, async and delayed task runners
//!
//! # Example
//!
//! ```
//! use hookstage_engine::prelude::*;
//!
//! struct Placeholders;
//! impl Component for Placeholders {}
//! impl Hook for Placeholders {
//!     const ID: &'static str = "placeholders";
//!     fn requirements() -> Vec<Requirement> {
//!         vec![Requirement::plugin("PlaceholderAPI")]
//!     }
//!     fn create() -> Result<Self, BoxError> { Ok(Self) }
//! }
//!
//! let options = HookerOptions::new().with_dependency_check(|name: &str| name == "PlaceholderAPI");
//! let hooker = Hooker::register(&HookSet::new().add::<Placeholders>(), options).unwrap();
//!
//! assert_eq!(hooker.load().unwrap(), 0);
//! assert_eq!(hooker.enable().unwrap(), 1);
//! assert_eq!(hooker.reload().wait().unwrap(), 0);
//! assert_eq!(hooker.disable().unwrap(), 1);
//! ```

/// Component capabilities and typed hooks.
pub mod component;

/// Hook descriptors.
pub mod descriptor;

/// Discovery sources.
pub mod discovery;

/// The lifecycle engine.
pub mod engine;

/// Engine errors.
pub mod error;

/// The process-wide engine slot.
pub mod global;

/// Registration options.
pub mod options;

/// Load phases.
pub mod phase;

/// Requirement predicates.
pub mod requirement;

/// Task runners.
pub mod runner;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::component::*;
    pub use crate::descriptor::*;
    pub use crate::discovery::*;
    pub use crate::engine::*;
    pub use crate::error::*;
    pub use crate::options::*;
    pub use crate::phase::*;
    pub use crate::requirement::*;
    pub use crate::runner::*;
}
