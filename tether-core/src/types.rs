//! Domain types for the Tether registry.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.
//! The artifact document is serializable/deserializable via serde + serde_yaml.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::paths::sanitize_identifier;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Content-addressable identity of a source file.
///
/// A hex SHA-256 digest of the file's bytes. The digest survives renames and
/// moves (content is unchanged), which is what lets the engine find an
/// existing artifact for a source regardless of where the source lives now.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceHandle(pub String);

impl fmt::Display for SourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for SourceHandle {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SourceHandle {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A sanitized display identifier for an artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactId(pub String);

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ArtifactId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ArtifactId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Artifact document
// ---------------------------------------------------------------------------

/// A derived artifact as persisted on disk (one YAML document per artifact).
///
/// `link` holds the handle of the owning source file, or `None` for artifacts
/// created outside Tether's control. Unlinked artifacts are never touched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub id: ArtifactId,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub link: Option<SourceHandle>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Artifact {
    /// New artifact linked to `handle`, identified by the source's path stem.
    pub fn linked(stem: &str, handle: SourceHandle) -> Self {
        let now = Utc::now();
        Self {
            id: ArtifactId::from(stem),
            link: Some(handle),
            created_at: now,
            updated_at: now,
        }
    }

    /// New artifact with a human-entered display name, sanitized for use as
    /// an identifier. Path-stem-derived ids skip sanitizing; entered names
    /// must not.
    pub fn named(display_name: &str, handle: SourceHandle) -> Self {
        Self::linked(&sanitize_identifier(display_name), handle)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
