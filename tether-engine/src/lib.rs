//! # tether-engine
//!
//! Batch synchronization of source files to derived artifacts.
//!
//! The host delivers an [`EventBatch`] of created/moved/deleted paths; the
//! engine reconciles it against the artifact registry and reports a per-item
//! [`BatchReport`]. Call [`SyncEngine::process_batch`] once per host-delivered
//! batch — the engine holds no state between batches.

pub mod batch;
pub mod engine;
pub mod error;
pub mod report;
pub mod source;

pub use batch::EventBatch;
pub use engine::{SyncConfig, SyncEngine};
pub use error::SyncError;
pub use report::{BatchReport, ItemOutcome, SkipReason, SyncAction};
pub use source::{resolve_handle, AlwaysQualifier, MarkerQualifier, Qualifier, QualifyError};
