//! Event batch input — the host's view of one file-system operation.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{io_err, SyncError};

/// One delivery of source-file lifecycle events.
///
/// `moved` and `moved_from` are parallel, index-aligned sequences: the new
/// path at index *i* corresponds to the old path at index *i*. `deleted` is
/// accepted for interface completeness but ignored — removing a source does
/// not remove its artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventBatch {
    pub created: Vec<PathBuf>,
    pub deleted: Vec<PathBuf>,
    pub moved: Vec<PathBuf>,
    pub moved_from: Vec<PathBuf>,
}

impl EventBatch {
    /// A batch containing only created paths.
    pub fn created(paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            created: paths.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// A batch containing a single move event.
    pub fn moved(from: impl Into<PathBuf>, to: impl Into<PathBuf>) -> Self {
        Self {
            moved: vec![to.into()],
            moved_from: vec![from.into()],
            ..Self::default()
        }
    }

    /// Parse a batch from its JSON wire form.
    pub fn from_json(json: &str) -> Result<Self, SyncError> {
        let batch: Self = serde_json::from_str(json)?;
        batch.validate()?;
        Ok(batch)
    }

    /// Read and parse a batch from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, SyncError> {
        let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
        Self::from_json(&contents)
    }

    /// Reject batches whose move sequences are not index-aligned.
    pub fn validate(&self) -> Result<(), SyncError> {
        if self.moved.len() != self.moved_from.len() {
            return Err(SyncError::BatchShape {
                moved: self.moved.len(),
                moved_from: self.moved_from.len(),
            });
        }
        Ok(())
    }

    /// `(old, new)` pairs, old path first.
    pub fn move_pairs(&self) -> impl Iterator<Item = (&Path, &Path)> {
        self.moved_from
            .iter()
            .zip(self.moved.iter())
            .map(|(old, new)| (old.as_path(), new.as_path()))
    }

    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.moved.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_roundtrip_uses_camel_case_moved_from() {
        let batch = EventBatch::moved("A/Foo.src", "B/Bar.src");
        let json = serde_json::to_string(&batch).expect("serialize");
        assert!(json.contains("movedFrom"), "wire form is camelCase: {json}");
        let back = EventBatch::from_json(&json).expect("parse");
        assert_eq!(back, batch);
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let batch = EventBatch::from_json(r#"{"created":["Scripts/Foo.src"]}"#).expect("parse");
        assert_eq!(batch.created, vec![PathBuf::from("Scripts/Foo.src")]);
        assert!(batch.moved.is_empty() && batch.deleted.is_empty());
    }

    #[test]
    fn mismatched_move_sequences_are_rejected() {
        let err = EventBatch::from_json(r#"{"moved":["a","b"],"movedFrom":["a"]}"#).unwrap_err();
        assert!(matches!(
            err,
            SyncError::BatchShape {
                moved: 2,
                moved_from: 1
            }
        ));
    }

    #[test]
    fn move_pairs_are_index_aligned() {
        let batch = EventBatch {
            moved: vec![PathBuf::from("n1"), PathBuf::from("n2")],
            moved_from: vec![PathBuf::from("o1"), PathBuf::from("o2")],
            ..EventBatch::default()
        };
        let pairs: Vec<_> = batch.move_pairs().collect();
        assert_eq!(
            pairs,
            vec![
                (Path::new("o1"), Path::new("n1")),
                (Path::new("o2"), Path::new("n2")),
            ]
        );
    }
}
