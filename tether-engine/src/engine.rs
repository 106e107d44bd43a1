//! The batch sync engine.
//!
//! ## Batch protocol
//!
//! 1. Filter candidates to the qualifying source extension.
//! 2. Creates: resolve handle → qualify → look up linked artifact → check the
//!    expected slot → create. Each step can bail into a skip or a warning.
//! 3. Moves: run the create path against the new location first (covers a
//!    file moved into scope), then relocate the old expected artifact if one
//!    exists and the expected paths differ.
//! 4. Outcomes aggregate in input order; the batch never aborts early —
//!    every candidate is attempted regardless of prior failures.
//!
//! The engine is stateless across batches. World state is re-derived from the
//! store on every query, so artifacts created or moved outside the engine's
//! control are seen on the next batch.

use std::path::Path;

use tether_core::paths::expected_artifact_path;
use tether_core::{Artifact, ArtifactStore, Relocation, StoreError};

use crate::batch::EventBatch;
use crate::error::SyncError;
use crate::report::{BatchReport, SkipReason, SyncAction};
use crate::source::{resolve_handle, Qualifier};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Extension pair the engine synchronizes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Extension of qualifying source files (no leading dot).
    pub source_ext: String,
    /// Extension of artifact documents (no leading dot).
    pub artifact_ext: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            source_ext: "src".to_string(),
            artifact_ext: "art".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Orchestrates one event batch against the registry and path resolver.
pub struct SyncEngine<S, Q> {
    store: S,
    qualifier: Q,
    config: SyncConfig,
}

impl<S: ArtifactStore, Q: Qualifier> SyncEngine<S, Q> {
    pub fn new(store: S, qualifier: Q, config: SyncConfig) -> Self {
        Self {
            store,
            qualifier,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Process one host-delivered batch to completion.
    ///
    /// Only batch-level contract violations (`moved`/`movedFrom` mismatch)
    /// return `Err`; every per-item failure is folded into the report.
    pub fn process_batch(&self, batch: &EventBatch) -> Result<BatchReport, SyncError> {
        batch.validate()?;
        let mut report = BatchReport::new();
        if batch.is_empty() {
            return Ok(report);
        }

        for path in &batch.created {
            if !self.is_source(path) {
                continue;
            }
            self.process_create(path, &mut report);
        }

        for (old, new) in batch.move_pairs() {
            if !self.is_source(new) {
                // Renamed to a non-qualifying extension: the stale artifact,
                // if any, stays where it is.
                continue;
            }
            self.process_create(new, &mut report);
            self.process_relocation(old, new, &mut report);
        }

        if !batch.deleted.is_empty() {
            tracing::debug!("ignoring {} deleted path(s)", batch.deleted.len());
        }

        Ok(report)
    }

    /// Steps 2a–2e for a single candidate. Never propagates an error.
    fn process_create(&self, path: &Path, report: &mut BatchReport) {
        let Some(handle) = resolve_handle(path) else {
            tracing::debug!("source not resolvable yet: {}", path.display());
            report.push(
                path,
                SyncAction::Skipped {
                    reason: SkipReason::Unresolvable,
                },
            );
            return;
        };

        match self.qualifier.qualifies(path, &handle) {
            Ok(true) => {}
            Ok(false) => {
                report.push(
                    path,
                    SyncAction::Skipped {
                        reason: SkipReason::NotQualifying,
                    },
                );
                return;
            }
            Err(err) => {
                // A failing predicate means "does not qualify", non-fatal.
                tracing::warn!("qualifier error, treating as non-qualifying: {err}");
                report.push(
                    path,
                    SyncAction::Skipped {
                        reason: SkipReason::NotQualifying,
                    },
                );
                return;
            }
        }

        match self.store.find_linked(&handle) {
            Ok(Some(existing)) => {
                tracing::debug!(
                    "already linked: {} -> {}",
                    path.display(),
                    existing.display()
                );
                // Already-synchronized skips report the artifact's path, like
                // creates do, so a "created then skipped" pair lines up.
                report.push(
                    existing,
                    SyncAction::Skipped {
                        reason: SkipReason::AlreadyLinked,
                    },
                );
                return;
            }
            Ok(None) => {}
            Err(err) => {
                report.push(
                    path,
                    SyncAction::Failed {
                        detail: err.to_string(),
                    },
                );
                return;
            }
        }

        let expected = expected_artifact_path(path, &self.config.artifact_ext);
        if self.store.exists(&expected) {
            // The slot is taken by something not linked to this source. Never
            // overwrite it, never adopt it.
            tracing::warn!(
                "expected artifact slot already occupied: {}",
                expected.display()
            );
            report.push(
                expected,
                SyncAction::Warning {
                    detail: "expected artifact path occupied by an unrelated file".to_string(),
                },
            );
            return;
        }

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        match self.store.create(&expected, &Artifact::linked(&stem, handle)) {
            Ok(()) => report.push(expected, SyncAction::Created),
            Err(StoreError::PathCollision { path }) => report.push(
                path,
                SyncAction::Warning {
                    detail: "expected artifact path occupied by an unrelated file".to_string(),
                },
            ),
            Err(err) => report.push(
                expected,
                SyncAction::Failed {
                    detail: err.to_string(),
                },
            ),
        }
    }

    /// Steps 3b–3c for one move pair.
    fn process_relocation(&self, old: &Path, new: &Path, report: &mut BatchReport) {
        let from = expected_artifact_path(old, &self.config.artifact_ext);
        let to = expected_artifact_path(new, &self.config.artifact_ext);
        if from == to || !self.store.exists(&from) {
            // Source never had an artifact here (or the move does not change
            // the artifact path): nothing to relocate, not an error.
            return;
        }

        match self.store.relocate(&from, &to) {
            Ok(Relocation::Moved) => report.push(to, SyncAction::Relocated { from }),
            Ok(Relocation::NoOp) => {}
            Err(StoreError::NotFound { .. }) => {}
            Err(StoreError::TargetOccupied { from, to }) => {
                tracing::warn!(
                    "relocation target occupied: {} -> {}",
                    from.display(),
                    to.display()
                );
                report.push(
                    to,
                    SyncAction::Warning {
                        detail: format!("relocation target occupied (from {})", from.display()),
                    },
                );
            }
            Err(err) => report.push(
                to,
                SyncAction::Failed {
                    detail: err.to_string(),
                },
            ),
        }
    }

    fn is_source(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case(&self.config.source_ext))
            .unwrap_or(false)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use tempfile::TempDir;
    use tether_core::registry::load_artifact;
    use tether_core::{FsStore, SourceHandle};

    use super::*;
    use crate::source::{AlwaysQualifier, QualifyError};

    struct NeverQualifier;
    impl Qualifier for NeverQualifier {
        fn qualifies(&self, _: &Path, _: &SourceHandle) -> Result<bool, QualifyError> {
            Ok(false)
        }
    }

    struct BrokenQualifier;
    impl Qualifier for BrokenQualifier {
        fn qualifies(&self, path: &Path, _: &SourceHandle) -> Result<bool, QualifyError> {
            Err(QualifyError {
                path: path.to_path_buf(),
                message: "classifier crashed".to_string(),
            })
        }
    }

    fn engine_at<Q: Qualifier>(root: &Path, qualifier: Q) -> SyncEngine<FsStore, Q> {
        SyncEngine::new(FsStore::new(root, "art"), qualifier, SyncConfig::default())
    }

    fn write_source(root: &Path, rel: &str, content: &str) -> PathBuf {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn create_batch_produces_artifact_at_expected_path() {
        let root = TempDir::new().unwrap();
        let source = write_source(root.path(), "Scripts/Foo.src", "hello");
        let engine = engine_at(root.path(), AlwaysQualifier);

        let report = engine
            .process_batch(&EventBatch::created([source]))
            .unwrap();

        assert_eq!(report.created(), 1);
        let artifact_path = root.path().join("Scripts/Foo.art");
        assert_eq!(report.outcomes[0].path, artifact_path);
        let doc = load_artifact(&artifact_path).unwrap();
        assert_eq!(doc.id.0, "Foo");
        assert!(doc.link.is_some());
    }

    #[test]
    fn rerunning_create_batch_is_idempotent() {
        let root = TempDir::new().unwrap();
        let source = write_source(root.path(), "Scripts/Foo.src", "hello");
        let engine = engine_at(root.path(), AlwaysQualifier);
        let batch = EventBatch::created([source]);

        let first = engine.process_batch(&batch).unwrap();
        assert_eq!(first.created(), 1);

        let second = engine.process_batch(&batch).unwrap();
        assert_eq!(second.created(), 0);
        assert_eq!(second.skipped(), second.outcomes.len());
        assert!(matches!(
            second.outcomes[0].action,
            SyncAction::Skipped {
                reason: SkipReason::AlreadyLinked
            }
        ));
        assert_eq!(
            second.outcomes[0].path,
            root.path().join("Scripts/Foo.art"),
            "already-linked skip reports the artifact path, matching the create"
        );
    }

    #[test]
    fn empty_batch_yields_empty_report() {
        let root = TempDir::new().unwrap();
        let engine = engine_at(root.path(), AlwaysQualifier);

        let report = engine.process_batch(&EventBatch::default()).unwrap();

        assert!(report.outcomes.is_empty());
        assert!(engine.store().enumerate().unwrap().is_empty());
    }

    #[test]
    fn duplicate_paths_in_one_batch_create_one_artifact() {
        let root = TempDir::new().unwrap();
        let source = write_source(root.path(), "Foo.src", "hello");
        let engine = engine_at(root.path(), AlwaysQualifier);

        let report = engine
            .process_batch(&EventBatch::created([source.clone(), source]))
            .unwrap();

        assert_eq!(report.created(), 1);
        assert_eq!(report.skipped(), 1);
        assert_eq!(engine.store().enumerate().unwrap().len(), 1);
    }

    #[test]
    fn non_qualifying_source_is_inert() {
        let root = TempDir::new().unwrap();
        let source = write_source(root.path(), "Foo.src", "hello");
        let engine = engine_at(root.path(), NeverQualifier);

        let report = engine
            .process_batch(&EventBatch::created([source]))
            .unwrap();

        assert!(matches!(
            report.outcomes[0].action,
            SyncAction::Skipped {
                reason: SkipReason::NotQualifying
            }
        ));
        assert!(engine.store().enumerate().unwrap().is_empty());
    }

    #[test]
    fn qualifier_failure_is_treated_as_non_qualifying() {
        let root = TempDir::new().unwrap();
        let source = write_source(root.path(), "Foo.src", "hello");
        let engine = engine_at(root.path(), BrokenQualifier);

        let report = engine
            .process_batch(&EventBatch::created([source]))
            .unwrap();

        assert_eq!(report.failures(), 0, "qualifier failure must be non-fatal");
        assert!(matches!(
            report.outcomes[0].action,
            SyncAction::Skipped {
                reason: SkipReason::NotQualifying
            }
        ));
    }

    #[test]
    fn missing_source_is_skipped_silently() {
        let root = TempDir::new().unwrap();
        let engine = engine_at(root.path(), AlwaysQualifier);

        let report = engine
            .process_batch(&EventBatch::created([root.path().join("gone.src")]))
            .unwrap();

        assert!(matches!(
            report.outcomes[0].action,
            SyncAction::Skipped {
                reason: SkipReason::Unresolvable
            }
        ));
    }

    #[test]
    fn non_source_extensions_are_filtered_out() {
        let root = TempDir::new().unwrap();
        let txt = write_source(root.path(), "notes.txt", "hello");
        // The artifact extension itself never counts as a source.
        let art = write_source(root.path(), "stray.art", "id: stray");
        let engine = engine_at(root.path(), AlwaysQualifier);

        let report = engine
            .process_batch(&EventBatch::created([txt, art]))
            .unwrap();

        assert!(report.outcomes.is_empty());
    }

    #[test]
    fn occupied_expected_slot_is_warned_not_overwritten() {
        let root = TempDir::new().unwrap();
        let source = write_source(root.path(), "Foo.src", "hello");
        let occupant = root.path().join("Foo.art");
        std::fs::write(&occupant, "unrelated bytes").unwrap();
        let engine = engine_at(root.path(), AlwaysQualifier);

        let report = engine
            .process_batch(&EventBatch::created([source]))
            .unwrap();

        assert_eq!(report.warnings(), 1);
        assert_eq!(report.created(), 0);
        let contents = std::fs::read_to_string(&occupant).unwrap();
        assert_eq!(contents, "unrelated bytes");
    }

    #[test]
    fn one_bad_candidate_does_not_abort_the_batch() {
        let root = TempDir::new().unwrap();
        let missing = root.path().join("gone.src");
        let good = write_source(root.path(), "Good.src", "hello");
        let engine = engine_at(root.path(), AlwaysQualifier);

        let report = engine
            .process_batch(&EventBatch::created([missing, good]))
            .unwrap();

        assert_eq!(report.skipped(), 1);
        assert_eq!(report.created(), 1, "later candidates must still run");
    }

    #[test]
    fn move_without_prior_artifact_creates_one() {
        let root = TempDir::new().unwrap();
        // File moved into the watched scope: only the new path exists.
        let new = write_source(root.path(), "Scripts/Incoming.src", "hello");
        let engine = engine_at(root.path(), AlwaysQualifier);

        let report = engine
            .process_batch(&EventBatch::moved(root.path().join("outside/Incoming.src"), new))
            .unwrap();

        assert_eq!(report.created(), 1);
        assert_eq!(report.relocated(), 0, "nothing to relocate on first sight");
    }

    #[test]
    fn rename_to_non_qualifying_extension_leaves_artifact_in_place() {
        let root = TempDir::new().unwrap();
        let source = write_source(root.path(), "Foo.src", "hello");
        let engine = engine_at(root.path(), AlwaysQualifier);
        engine
            .process_batch(&EventBatch::created([source.clone()]))
            .unwrap();

        let renamed = root.path().join("Foo.txt");
        std::fs::rename(&source, &renamed).unwrap();
        let report = engine
            .process_batch(&EventBatch::moved(source, renamed))
            .unwrap();

        assert!(report.outcomes.is_empty());
        assert!(root.path().join("Foo.art").exists(), "stale artifact stays");
    }
}
