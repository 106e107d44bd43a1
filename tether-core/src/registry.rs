//! Artifact registry — filesystem-backed store of artifact YAML documents.
//!
//! # Storage layout
//!
//! One YAML document per artifact, living next to its source file:
//!
//! ```text
//! <root>/
//!   Scripts/
//!     Foo.src
//!     Foo.art     (artifact document — link, id, timestamps)
//! ```
//!
//! # API pattern
//!
//! The engine talks to the store only through the [`ArtifactStore`] trait;
//! [`FsStore`] is the stock implementation. Enumeration is performed fresh on
//! every query — never cached across calls — because the registry mutates as
//! a side effect of create/relocate within the same batch, and because
//! artifacts can be created or moved outside the engine's control between
//! batches.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;

use crate::error::{io_err, StoreError};
use crate::types::{Artifact, SourceHandle};

// ---------------------------------------------------------------------------
// Store seam
// ---------------------------------------------------------------------------

/// Outcome of a relocation that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relocation {
    /// The artifact's storage location changed.
    Moved,
    /// `from == to`; nothing to do.
    NoOp,
}

/// The registry capability the sync engine depends on.
///
/// `get_link` / `set_link` form the link accessor: implementations may back
/// them with direct field access or a serialization layer; the engine never
/// depends on the mechanism.
pub trait ArtifactStore {
    /// First artifact in scope whose link equals `handle`, or `None`.
    ///
    /// Linear in artifact count per call; callers batch their queries.
    fn find_linked(&self, handle: &SourceHandle) -> Result<Option<PathBuf>, StoreError>;

    /// Whether any file occupies `path` (linked or not).
    fn exists(&self, path: &Path) -> bool;

    /// Persist a new artifact document at `path`.
    ///
    /// Fails with [`StoreError::PathCollision`] if anything already occupies
    /// `path` — the store never silently overwrites.
    fn create(&self, path: &Path, artifact: &Artifact) -> Result<(), StoreError>;

    /// Move an artifact's storage location, link field unchanged.
    ///
    /// Fails with [`StoreError::NotFound`] if `from` is absent and
    /// [`StoreError::TargetOccupied`] if `to` is already taken.
    fn relocate(&self, from: &Path, to: &Path) -> Result<Relocation, StoreError>;

    /// Read the link field of the artifact at `path`.
    fn get_link(&self, path: &Path) -> Result<Option<SourceHandle>, StoreError>;

    /// Overwrite the link field of the artifact at `path`.
    fn set_link(&self, path: &Path, handle: &SourceHandle) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// Filesystem store
// ---------------------------------------------------------------------------

/// Filesystem-backed [`ArtifactStore`] rooted at a scope directory.
pub struct FsStore {
    root: PathBuf,
    artifact_ext: String,
    // Serializes the check-then-act sections of create/relocate so two
    // concurrent candidates cannot both observe "slot free" and both write.
    write_lock: Mutex<()>,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>, artifact_ext: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            artifact_ext: artifact_ext.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Walk the root scope and parse every artifact document, in sorted order.
    ///
    /// Unparseable documents are skipped with a warning — a corrupt or
    /// foreign file in the artifact slot must not fail the whole walk.
    pub fn enumerate(&self) -> Result<Vec<(PathBuf, Artifact)>, StoreError> {
        let mut found = Vec::new();
        for path in self.artifact_paths()? {
            match load_artifact(&path) {
                Ok(artifact) => found.push((path, artifact)),
                Err(StoreError::Parse { path, source }) => {
                    tracing::warn!(
                        "skipping unparseable artifact {}: {source}",
                        path.display()
                    );
                }
                Err(err) => return Err(err),
            }
        }
        Ok(found)
    }

    /// Sorted list of all `*.{artifact_ext}` files under the root.
    fn artifact_paths(&self) -> Result<Vec<PathBuf>, StoreError> {
        let mut dirs = vec![self.root.clone()];
        let mut files = Vec::new();
        let mut cursor = 0;
        while cursor < dirs.len() {
            let current = dirs[cursor].clone();
            cursor += 1;
            let entries = match std::fs::read_dir(&current) {
                Ok(entries) => entries,
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue,
                Err(err) => return Err(io_err(&current, err)),
            };
            for entry in entries {
                let entry = entry.map_err(|e| io_err(&current, e))?;
                let ty = entry.file_type().map_err(|e| io_err(entry.path(), e))?;
                if ty.is_dir() {
                    dirs.push(entry.path());
                } else if has_ext(&entry.path(), &self.artifact_ext) {
                    files.push(entry.path());
                }
            }
        }
        files.sort();
        files.dedup();
        Ok(files)
    }

    fn guard(&self) -> std::sync::MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ArtifactStore for FsStore {
    fn find_linked(&self, handle: &SourceHandle) -> Result<Option<PathBuf>, StoreError> {
        for (path, artifact) in self.enumerate()? {
            if artifact.link.as_ref() == Some(handle) {
                return Ok(Some(path));
            }
        }
        Ok(None)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create(&self, path: &Path, artifact: &Artifact) -> Result<(), StoreError> {
        let _guard = self.guard();
        if path.exists() {
            return Err(StoreError::PathCollision {
                path: path.to_path_buf(),
            });
        }
        save_artifact(path, artifact)?;
        tracing::info!("created artifact {}", path.display());
        Ok(())
    }

    fn relocate(&self, from: &Path, to: &Path) -> Result<Relocation, StoreError> {
        let _guard = self.guard();
        if from == to {
            return Ok(Relocation::NoOp);
        }
        if !from.exists() {
            return Err(StoreError::NotFound {
                path: from.to_path_buf(),
            });
        }
        if to.exists() {
            return Err(StoreError::TargetOccupied {
                from: from.to_path_buf(),
                to: to.to_path_buf(),
            });
        }
        if let Some(parent) = to.parent() {
            std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }
        std::fs::rename(from, to).map_err(|e| io_err(from, e))?;

        // Bump updated_at when the moved document parses; a foreign blob that
        // happened to be relocated stays byte-identical.
        if let Ok(mut artifact) = load_artifact(to) {
            artifact.updated_at = Utc::now();
            save_artifact(to, &artifact)?;
        }

        tracing::info!("relocated artifact {} -> {}", from.display(), to.display());
        Ok(Relocation::Moved)
    }

    fn get_link(&self, path: &Path) -> Result<Option<SourceHandle>, StoreError> {
        Ok(load_artifact(path)?.link)
    }

    fn set_link(&self, path: &Path, handle: &SourceHandle) -> Result<(), StoreError> {
        let mut artifact = load_artifact(path)?;
        artifact.link = Some(handle.clone());
        artifact.updated_at = Utc::now();
        save_artifact(path, &artifact)
    }
}

// ---------------------------------------------------------------------------
// Document I/O
// ---------------------------------------------------------------------------

/// Load a single artifact document.
///
/// Returns `StoreError::NotFound` if absent, `StoreError::Parse` (with path +
/// line context) if malformed YAML.
pub fn load_artifact(path: &Path) -> Result<Artifact, StoreError> {
    if !path.exists() {
        return Err(StoreError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    serde_yaml::from_str(&contents).map_err(|e| StoreError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Atomically save an artifact document.
///
/// Write flow: serialize → `.tmp` sibling → `rename`. The `.tmp` is always in
/// the same directory as the target (same filesystem — no EXDEV).
pub fn save_artifact(path: &Path, artifact: &Artifact) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = path.with_file_name(format!("{file_name}.tmp"));

    let yaml = serde_yaml::to_string(artifact)?;
    std::fs::write(&tmp, yaml).map_err(|e| io_err(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(path, e));
    }
    Ok(())
}

fn has_ext(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(ext))
        .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
