//! Host integrations for hookstage.
//!
//! The engine is runtime-agnostic: it never spawns threads, timers, or a
//! log subscriber of its own. This crate provides what a typical tokio host
//! plugs in:
//!
//! - [`TokioRunners`] - Async and delayed runners on a tokio runtime
//! - [`TracingSetup`] - Logging initialization via `tracing-subscriber`
//! - [`RuntimeOptions`] - Bundles both into engine options
//!
//! # Example
//!
//! ```no_run
//! use hookstage_engine::discovery::HookSet;
//! use hookstage_engine::engine::Hooker;
//! use hookstage_runtime::{RuntimeOptions, TracingSetup};
//!
//! #[tokio::main]
//! async fn main() {
//!     let options = RuntimeOptions::new()
//!         .with_tracing(TracingSetup::new())
//!         .prepare(tokio::runtime::Handle::current());
//!
//!     let hooker = Hooker::register(&HookSet::new(), options).unwrap();
//!     hooker.load().unwrap();
//!     hooker.enable().unwrap();
//!     let reloaded = hooker.reload().await.unwrap();
//!     tracing::info!(reloaded, "reload finished");
//!     hooker.disable().unwrap();
//! }
//! ```

mod runtime;
mod tokio_runner;
mod tracing_setup;

pub use runtime::RuntimeOptions;
pub use tokio_runner::TokioRunners;
pub use tracing_setup::{TracingFormat, TracingSetup};
