//! Per-item outcomes and the aggregated batch report.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Why a candidate was skipped. None of these are errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Handle could not be resolved (unreadable / mid-write source).
    Unresolvable,
    /// The qualification predicate said no, or failed.
    NotQualifying,
    /// An artifact already links this source — nothing to do.
    AlreadyLinked,
}

/// What the engine did (or declined to do) for one candidate path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SyncAction {
    /// A new artifact was written at the reported path.
    Created,
    /// An existing artifact was moved to the reported path.
    Relocated { from: PathBuf },
    /// No action needed; the reason says why.
    Skipped { reason: SkipReason },
    /// A conflict was detected and deliberately left for manual resolution.
    Warning { detail: String },
    /// Unexpected per-item failure. The batch continued past it.
    Failed { detail: String },
}

/// One entry of the outcome report.
///
/// For `Created`, `Relocated`, and already-linked skips the path is the
/// artifact's; for the rest it is the candidate source path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemOutcome {
    pub path: PathBuf,
    #[serde(flatten)]
    pub action: SyncAction,
}

/// Ordered outcomes for one processed batch.
#[derive(Debug, Serialize)]
pub struct BatchReport {
    pub started_at: DateTime<Utc>,
    pub outcomes: Vec<ItemOutcome>,
}

impl BatchReport {
    pub(crate) fn new() -> Self {
        Self {
            started_at: Utc::now(),
            outcomes: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, path: impl Into<PathBuf>, action: SyncAction) {
        self.outcomes.push(ItemOutcome {
            path: path.into(),
            action,
        });
    }

    pub fn created(&self) -> usize {
        self.count(|a| matches!(a, SyncAction::Created))
    }

    pub fn relocated(&self) -> usize {
        self.count(|a| matches!(a, SyncAction::Relocated { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|a| matches!(a, SyncAction::Skipped { .. }))
    }

    pub fn warnings(&self) -> usize {
        self.count(|a| matches!(a, SyncAction::Warning { .. }))
    }

    pub fn failures(&self) -> usize {
        self.count(|a| matches!(a, SyncAction::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&SyncAction) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.action)).count()
    }
}
