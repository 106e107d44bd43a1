//! Source-handle resolution and the qualification seam.

use std::io::ErrorKind;
use std::path::Path;

use sha2::{Digest, Sha256};
use thiserror::Error;

use tether_core::SourceHandle;

/// Resolve the content-addressable handle for a source file.
///
/// Returns `None` when the file cannot be read — a source that is mid-write,
/// unreadable, or already gone is expected transient state, not an error; the
/// next event for the path retries naturally.
pub fn resolve_handle(path: &Path) -> Option<SourceHandle> {
    match std::fs::read(path) {
        Ok(bytes) => {
            let mut h = Sha256::new();
            h.update(&bytes);
            Some(SourceHandle(hex::encode(h.finalize())))
        }
        Err(err) if err.kind() == ErrorKind::NotFound => None,
        Err(err) => {
            tracing::debug!("unreadable source {}: {err}", path.display());
            None
        }
    }
}

/// Failure inside an external qualification predicate.
///
/// The engine catches this and treats the source as not qualifying.
#[derive(Debug, Error)]
#[error("qualification failed for {path}: {message}")]
pub struct QualifyError {
    pub path: std::path::PathBuf,
    pub message: String,
}

/// The external decision of whether a source file warrants an artifact.
///
/// Treated as possibly expensive and fallible; implementations should not
/// assume they are called at most once per path.
pub trait Qualifier {
    fn qualifies(&self, path: &Path, handle: &SourceHandle) -> Result<bool, QualifyError>;
}

/// Qualifies a source when its content contains a marker token.
///
/// The stock predicate for hosts without a richer classifier such as a
/// compiler or type loader.
pub struct MarkerQualifier {
    marker: String,
}

impl MarkerQualifier {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }
}

impl Qualifier for MarkerQualifier {
    fn qualifies(&self, path: &Path, _handle: &SourceHandle) -> Result<bool, QualifyError> {
        let contents = std::fs::read_to_string(path).map_err(|err| QualifyError {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        Ok(contents.contains(&self.marker))
    }
}

/// Every source qualifies. Test predicate.
pub struct AlwaysQualifier;

impl Qualifier for AlwaysQualifier {
    fn qualifies(&self, _path: &Path, _handle: &SourceHandle) -> Result<bool, QualifyError> {
        Ok(true)
    }
}
