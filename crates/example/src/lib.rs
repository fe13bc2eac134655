//! Example host built with hookstage.
//!
//! Three hooks, one per phase:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Load      config-reporter      config "test-hook"           │
//! │  Enable    placeholder-bridge   plugin "PlaceholderAPI"      │
//! │                                 reloads inline               │
//! │  Late      cache-warmer         reloads on blocking pool     │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`DemoHost`] plays the host platform: it knows which plugins are
//! installed and which config flags are on, and turns that into requirement
//! predicates.

pub mod hooks;
mod host;

pub use host::{DemoHost, HOOK_ROOT};
