//! Error types for tether-engine.

use std::path::PathBuf;

use thiserror::Error;

use tether_core::StoreError;

/// All errors that can arise from sync operations.
///
/// Per-item failures never surface here — they are folded into the batch
/// report so one candidate cannot abort the rest. These variants are for
/// batch-level contract violations only.
#[derive(Debug, Error)]
pub enum SyncError {
    /// An error from the artifact registry.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error (event batch input).
    #[error("event batch JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// `moved` and `movedFrom` must be parallel, index-aligned sequences.
    #[error("malformed batch: {moved} moved paths but {moved_from} movedFrom paths")]
    BatchShape { moved: usize, moved_from: usize },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
