//! Typed errors for coordinator operations.
//!
//! Operations that a host can legitimately get wrong (a stale position, a
//! request arriving after shutdown began) return `CoordinatorError`.
//! Persistence failures inside close callbacks are logged, not returned: the
//! close sequence always proceeds once a save reports back.

use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by [`crate::tab::TabCoordinator`] operations
#[derive(Debug, Error)]
pub enum CoordinatorError {
    /// A position outside `0..count` was supplied
    #[error("tab position {position} is out of range ({count} tabs open)")]
    InvalidPosition { position: usize, count: usize },

    /// The shutdown sequence has started; no documents may be created or closed
    #[error("shutdown in progress")]
    ShuttingDown,

    /// The document at this position already has a close in flight
    #[error("tab {0} is already closing")]
    AlreadyClosing(usize),

    /// A file path could not be resolved to an absolute path
    #[error("failed to resolve path {path:?}: {source}")]
    PathResolution {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An existing file could not be read into its buffer
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience alias used by coordinator operations
pub type Result<T> = std::result::Result<T, CoordinatorError>;
