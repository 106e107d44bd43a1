//! Error types for tether-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from registry operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying I/O failure, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML serialization error (write/save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load — includes file path and line context from serde_yaml.
    #[error("failed to parse artifact at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// No artifact exists at the given path (relocation source).
    #[error("no artifact found at {path}")]
    NotFound { path: PathBuf },

    /// A file already occupies the target path of a create.
    #[error("path collision: {path} already exists")]
    PathCollision { path: PathBuf },

    /// A different file already occupies the target path of a relocation.
    #[error("relocation target occupied: {from} -> {to}")]
    TargetOccupied { from: PathBuf, to: PathBuf },
}

/// Convenience constructor for [`StoreError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.into(),
        source,
    }
}
