//! Error types for the panel coordinator.
//!
//! None of these escape to UI code through `present()`; the session logs
//! them and degrades to "nothing happened". They are public so host and hook
//! implementations can produce them.

use thiserror::Error;

/// Failure reported by a `HostSurface` while inserting an entry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("host surface is no longer attached")]
    Detached,
    #[error("host surface rejected entry: {0}")]
    Rejected(String),
}

/// Failure reported by a pre-dismiss hook or a state-changed callback.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HookError {
    #[error("hook failed: {0}")]
    Failed(String),
    #[error("hook was cancelled")]
    Cancelled,
}

impl HookError {
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }
}

#[derive(Debug, Error)]
pub(crate) enum PresentError {
    #[error("presentation context is no longer mounted")]
    StaleContext,
    #[error(transparent)]
    Insert(#[from] HostError),
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LocatorError {
    #[error("a panel service is already installed on this thread")]
    AlreadyInstalled,
    #[error("no panel service is installed on this thread")]
    NotInstalled,
}
