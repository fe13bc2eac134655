//! Logging initialization.
//!
//! The engine only emits `tracing` events. [`TracingSetup`] installs a
//! subscriber for hosts that do not bring their own.
//!
//! # Example
//!
//! ```
//! use hookstage_runtime::{TracingFormat, TracingSetup};
//! use tracing::Level;
//!
//! // Development: pretty output with span enter/exit
//! let dev = TracingSetup::new()
//!     .with_level(Level::DEBUG)
//!     .with_format(TracingFormat::Pretty)
//!     .with_span_events(true);
//!
//! // Production: JSON for log aggregation, engine at debug
//! let prod = TracingSetup::new()
//!     .with_format(TracingFormat::Json)
//!     .with_env_filter("hookstage_engine=debug,info");
//! # let _ = (dev, prod);
//! ```

use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

// ─────────────────────────────────────────────────────────────────────────────
// TracingFormat
// ─────────────────────────────────────────────────────────────────────────────

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingFormat {
    /// Human-readable colored output (default).
    #[default]
    Pretty,
    /// Compact single-line output.
    Compact,
    /// JSON structured output for log aggregation.
    Json,
}

// ─────────────────────────────────────────────────────────────────────────────
// TracingSetup
// ─────────────────────────────────────────────────────────────────────────────

/// Subscriber configuration.
///
/// [`TracingSetup::install`] uses `try_init`, so installing twice, or
/// installing when the host already set a global subscriber, is a no-op.
#[derive(Debug, Clone)]
#[must_use]
pub struct TracingSetup {
    level: Level,
    format: TracingFormat,
    env_filter: Option<String>,
    span_events: bool,
}

impl Default for TracingSetup {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: TracingFormat::Pretty,
            env_filter: None,
            span_events: false,
        }
    }
}

impl TracingSetup {
    /// Creates a setup with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum log level. Ignored when an env filter is set.
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Sets the output format.
    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets a filter directive string, e.g. `hookstage_engine=debug,warn`.
    ///
    /// An invalid directive falls back to the configured level.
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Enables span enter/exit events.
    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.span_events = enabled;
        self
    }

    /// The configured level.
    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }

    /// The configured format.
    #[must_use]
    pub fn format(&self) -> TracingFormat {
        self.format
    }

    /// The configured directives, or the level when they are absent or do
    /// not parse.
    fn filter(&self) -> EnvFilter {
        self.env_filter
            .as_deref()
            .and_then(|directives| EnvFilter::try_new(directives).ok())
            .unwrap_or_else(|| EnvFilter::new(self.level.as_str()))
    }

    fn span_events(&self) -> FmtSpan {
        if self.span_events {
            FmtSpan::ENTER | FmtSpan::EXIT
        } else {
            FmtSpan::NONE
        }
    }

    /// Output layer for the configured format.
    fn output(&self) -> Box<dyn Layer<Registry> + Send + Sync> {
        let span_events = self.span_events();
        let layer = tracing_subscriber::fmt::layer();
        match self.format {
            TracingFormat::Pretty => layer.pretty().with_span_events(span_events).boxed(),
            TracingFormat::Compact => layer.compact().with_span_events(span_events).boxed(),
            TracingFormat::Json => layer.json().with_span_events(span_events).boxed(),
        }
    }

    /// Installs the global subscriber.
    ///
    /// Returns false if a global subscriber was already set.
    pub fn install(&self) -> bool {
        let installed = tracing_subscriber::registry()
            .with(self.output())
            .with(self.filter())
            .try_init()
            .is_ok();

        if installed {
            tracing::debug!(level = %self.level, format = ?self.format, "tracing installed");
        }
        installed
    }
}
