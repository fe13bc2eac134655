//! Engine error taxonomy.

use std::borrow::Cow;

use crate::component::BoxError;
use crate::discovery::DiscoveryError;
use crate::requirement::RequirementError;

/// Errors returned by [`Hooker`](crate::engine::Hooker) operations and the
/// process-wide slot in [`global`](crate::global).
#[derive(Debug, thiserror::Error)]
pub enum HookerError {
    /// The process-wide engine was registered twice.
    #[error("hook engine is already registered")]
    AlreadyRegistered,

    /// An operation was called before the process-wide engine was registered.
    #[error("hook engine is not initialized")]
    NotInitialized,

    /// Explicit requirement registration failed.
    #[error(transparent)]
    Requirement(#[from] RequirementError),

    /// The discovery mechanism failed during registration.
    #[error("hook discovery failed: {0}")]
    Discovery(#[from] DiscoveryError),

    /// A hook factory failed. Construction is never retried.
    #[error("failed to construct hook '{id}': {source}")]
    Construct {
        /// Hook id.
        id: Cow<'static, str>,
        /// Factory error.
        #[source]
        source: BoxError,
    },

    /// A start callback failed.
    #[error("failed to start hook '{id}': {source}")]
    Start {
        /// Hook id.
        id: Cow<'static, str>,
        /// Callback error.
        #[source]
        source: BoxError,
    },

    /// A stop callback failed. The hook was still removed from the active set.
    #[error("failed to stop hook '{id}': {source}")]
    Stop {
        /// Hook id.
        id: Cow<'static, str>,
        /// Callback error.
        #[source]
        source: BoxError,
    },

    /// A scheduled unit of work was dropped or panicked before reporting.
    #[error("task '{task}' was abandoned before completing")]
    TaskAbandoned {
        /// Hook id, or the phase name for phase runs.
        task: Cow<'static, str>,
    },
}

impl HookerError {
    /// Id of the hook whose construction or callback failed, if any.
    #[must_use]
    pub fn hook_id(&self) -> Option<&str> {
        match self {
            Self::Construct { id, .. }
            | Self::Start { id, .. }
            | Self::Stop { id, .. } => Some(id.as_ref()),
            Self::AlreadyRegistered
            | Self::TaskAbandoned { .. }
            | Self::NotInitialized
            | Self::Requirement(_)
            | Self::Discovery(_) => None,
        }
    }
}
