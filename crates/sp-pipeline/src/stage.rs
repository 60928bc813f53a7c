//! Stage and state vocabulary of the pipeline.

use std::fmt;

/// One transformation step in the fixed sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    Backup,
    Stamp,
    Normalize,
    Optimize,
    Route,
    Archive,
}

/// Failure policy of a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagePolicy {
    /// A failure stalls the document.
    Blocking,
    /// A failure is logged and the sequence continues.
    BestEffort,
}

impl StageKind {
    /// Optimization is advisory; everything else stops the document.
    pub fn policy(&self) -> StagePolicy {
        match self {
            StageKind::Optimize => StagePolicy::BestEffort,
            _ => StagePolicy::Blocking,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StageKind::Backup => "backup",
            StageKind::Stamp => "stamp",
            StageKind::Normalize => "normalize",
            StageKind::Optimize => "optimize",
            StageKind::Route => "route",
            StageKind::Archive => "archive",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a document is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocState {
    Discovered,
    BackedUp,
    Stamped,
    Normalized,
    /// Optimization ran, or was skipped after a best-effort failure.
    Optimized,
    Routed,
    Archived,
    /// Absorbing: left in place, retried on a later poll cycle.
    Stalled,
}

impl DocState {
    /// The state reached when the given stage completes.
    pub fn after(stage: StageKind) -> DocState {
        match stage {
            StageKind::Backup => DocState::BackedUp,
            StageKind::Stamp => DocState::Stamped,
            StageKind::Normalize => DocState::Normalized,
            StageKind::Optimize => DocState::Optimized,
            StageKind::Route => DocState::Routed,
            StageKind::Archive => DocState::Archived,
        }
    }
}
