//! The per-document state machine.
//!
//! A document runs backup → stamp → normalize → optimize → route → archive
//! in order. Blocking stage failures convert to a [`DocOutcome::Stalled`]
//! for that document only; nothing escapes to the scheduler loop.

use crate::fsops;
use crate::stage::{DocState, StageKind, StagePolicy};
use sp_core::config::{OverlayRule, SealpostConfig};
use sp_core::document::Document;
use sp_core::engine::DocEngine;
use sp_core::error::{Result, SpError};
use sp_router::RoutingTable;
use std::path::PathBuf;
use std::sync::Arc;

/// Terminal result of one processing attempt.
#[derive(Debug)]
pub enum DocOutcome {
    /// Delivered to `dest` and moved into the sent archive.
    Archived {
        dest: PathBuf,
        optimize_skipped: bool,
    },
    /// Left in place after a blocking failure; retried next cycle.
    Stalled { stage: StageKind, error: SpError },
}

impl DocOutcome {
    pub fn is_archived(&self) -> bool {
        matches!(self, DocOutcome::Archived { .. })
    }

    pub fn final_state(&self) -> DocState {
        match self {
            DocOutcome::Archived { .. } => DocState::Archived,
            DocOutcome::Stalled { .. } => DocState::Stalled,
        }
    }
}

type StageResult<T> = std::result::Result<T, (StageKind, SpError)>;

/// Executes the stage sequence for one document at a time.
pub struct DocumentPipeline {
    config: SealpostConfig,
    table: RoutingTable,
    engine: Arc<dyn DocEngine>,
}

impl DocumentPipeline {
    pub fn new(config: SealpostConfig, table: RoutingTable, engine: Arc<dyn DocEngine>) -> Self {
        Self {
            config,
            table,
            engine,
        }
    }

    pub fn config(&self) -> &SealpostConfig {
        &self.config
    }

    pub fn overlays(&self) -> &[OverlayRule] {
        &self.config.stamp.overlays
    }

    /// Run one document end-to-end. Never returns an error: every failure
    /// is folded into the outcome, so the scheduler loop cannot be aborted
    /// by a single document.
    pub fn process(&self, doc: &Document) -> DocOutcome {
        match self.run(doc) {
            Ok((dest, optimize_skipped)) => {
                tracing::info!(file = %doc.name, dest = %dest.display(), "archived");
                DocOutcome::Archived {
                    dest,
                    optimize_skipped,
                }
            }
            Err((stage, error)) => {
                tracing::error!(file = %doc.name, stage = %stage, %error, "document stalled");
                DocOutcome::Stalled { stage, error }
            }
        }
    }

    fn run(&self, doc: &Document) -> StageResult<(PathBuf, bool)> {
        // Discovered → Backed-up: the document is untouched until the
        // provenance copy exists.
        let backup = doc
            .directory()
            .join(&self.config.watch.backup_dir_name)
            .join(&doc.name);
        self.gate(doc, StageKind::Backup, fsops::backup_copy(&doc.path, &backup))?;
        tracing::info!(file = %doc.name, "backed up");

        // Backed-up → Stamped.
        self.gate(doc, StageKind::Stamp, self.stamp(doc))?;
        tracing::info!(file = %doc.name, tag = %doc.parsed.outcome_tag, "stamped");

        // Stamped → Normalized.
        let target = self.config.page.target();
        self.gate(
            doc,
            StageKind::Normalize,
            fsops::apply_atomic(&doc.path, |out| self.engine.normalize(&doc.path, target, out)),
        )?;
        tracing::info!(file = %doc.name, "normalized");

        // Normalized → Compressed-or-skipped: `gate` consults the stage
        // policy, and optimization is the one best-effort stage.
        let optimize_skipped = self.gate(
            doc,
            StageKind::Optimize,
            fsops::apply_atomic(&doc.path, |out| self.engine.optimize(&doc.path, out)),
        )?;
        if !optimize_skipped {
            tracing::info!(file = %doc.name, "compressed");
        }

        // → Routed: parse, then table lookup. Both blocking; a document
        // with no destination stays in place for manual handling.
        let (id, dest_dir) = block(StageKind::Route, self.route(doc))?;
        tracing::info!(file = %doc.name, id, dest = %dest_dir.display(), "routed");

        // Routed → Archived: deliver, then relocate. Re-runs after a failed
        // move re-deliver (last-write-wins) and retry the move.
        self.gate(
            doc,
            StageKind::Archive,
            fsops::deliver_copy(&doc.path, &dest_dir.join(&doc.name)),
        )?;
        let sent = block(StageKind::Archive, self.sent_dir(doc))?.join(&doc.name);
        self.gate(doc, StageKind::Archive, fsops::archive_move(&doc.path, &sent))?;

        Ok((dest_dir, optimize_skipped))
    }

    /// Fold a stage result through the stage's failure policy. Returns
    /// whether the stage was skipped (best-effort failure).
    fn gate(&self, doc: &Document, stage: StageKind, result: Result<()>) -> StageResult<bool> {
        match result {
            Ok(()) => Ok(false),
            Err(error) => match stage.policy() {
                StagePolicy::Blocking => Err((stage, error)),
                StagePolicy::BestEffort => {
                    tracing::warn!(file = %doc.name, stage = %stage, %error, "stage failed, continuing");
                    Ok(true)
                }
            },
        }
    }

    fn stamp(&self, doc: &Document) -> Result<()> {
        let rule = self
            .overlays()
            .iter()
            .find(|rule| rule.tag == doc.parsed.outcome_tag)
            .ok_or_else(|| {
                SpError::Asset(format!("no overlay for tag '{}'", doc.parsed.outcome_tag))
            })?;
        if !rule.image.is_file() {
            return Err(SpError::Asset(format!(
                "overlay image missing: {}",
                rule.image.display()
            )));
        }
        let placement = self.config.stamp.placement();
        fsops::apply_atomic(&doc.path, |out| {
            self.engine.composite(&doc.path, &rule.image, &placement, out)
        })
    }

    fn route(&self, doc: &Document) -> Result<(u32, PathBuf)> {
        let id = doc.require_routing_id()?;
        let rule = self.table.route_or_err(id)?;
        Ok((id, rule.dest.clone()))
    }

    /// The sent archive lives next to the watched directory.
    fn sent_dir(&self, doc: &Document) -> Result<PathBuf> {
        let parent = doc.directory().parent().ok_or_else(|| {
            SpError::Access(format!(
                "no parent directory for {}",
                doc.directory().display()
            ))
        })?;
        Ok(parent.join(&self.config.watch.sent_dir_name))
    }
}

/// A value-producing stage has no best-effort mode: without its value the
/// sequence cannot continue, so failures are blocking by construction.
fn block<T>(stage: StageKind, result: Result<T>) -> StageResult<T> {
    result.map_err(|error| (stage, error))
}
