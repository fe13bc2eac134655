//! # Hookstage Internal Library
//!
//! Re-exports the hookstage crates for convenience.

/// Lifecycle engine: phases, requirements, reload and disable.
pub use hookstage_engine;

/// Host integrations: tokio runners and tracing setup.
pub use hookstage_runtime;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use hookstage_engine::global;
    pub use hookstage_engine::prelude::*;
    pub use hookstage_runtime::{RuntimeOptions, TokioRunners, TracingFormat, TracingSetup};
}
