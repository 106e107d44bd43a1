//! Tether core library — domain types, artifact registry, path resolver.
//!
//! Public API surface:
//! - [`types`] — newtypes and the on-disk artifact document
//! - [`error`] — [`StoreError`]
//! - [`paths`] — pure source-path → artifact-path mapping and identifier sanitizing
//! - [`registry`] — the [`ArtifactStore`] seam and its filesystem implementation

pub mod error;
pub mod paths;
pub mod registry;
pub mod types;

pub use error::StoreError;
pub use registry::{ArtifactStore, FsStore, Relocation};
pub use types::{Artifact, ArtifactId, SourceHandle};
