//! Polling scheduler.
//!
//! One logical worker: each poll cycle re-reads the directory listing and
//! processes the documents sequentially, one fully before the next. A
//! document failure never ends the loop; only the shutdown signal does.

use chrono::{DateTime, Utc};
use sp_core::document::Document;
use sp_core::error::{Result, SpError};
use sp_pipeline::{DocOutcome, DocumentPipeline};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Running tally across poll cycles.
#[derive(Debug, Clone)]
pub struct RunStats {
    pub started_at: DateTime<Utc>,
    pub cycles: u64,
    pub discovered: u64,
    pub archived: u64,
    pub stalled: u64,
}

impl Default for RunStats {
    fn default() -> Self {
        Self {
            started_at: Utc::now(),
            cycles: 0,
            discovered: 0,
            archived: 0,
            stalled: 0,
        }
    }
}

pub struct Scheduler {
    watch_dir: PathBuf,
    pipeline: Arc<DocumentPipeline>,
    stats: RunStats,
}

impl Scheduler {
    pub fn new(watch_dir: impl Into<PathBuf>, pipeline: DocumentPipeline) -> Self {
        Self {
            watch_dir: watch_dir.into(),
            pipeline: Arc::new(pipeline),
            stats: RunStats::default(),
        }
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Poll until the shutdown signal flips. A cycle that found work is
    /// followed by an immediate re-poll; an idle cycle waits the full
    /// interval; an unreachable inbox backs off on the short retry.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) {
        let watch_config = self.pipeline.config().watch.clone();
        tracing::info!(dir = %self.watch_dir.display(), "watching");
        loop {
            if *shutdown.borrow() {
                break;
            }
            let wait_secs = match self.run_cycle().await {
                Ok(found) if found > 0 => continue,
                Ok(_) => watch_config.poll_interval_secs,
                Err(error) => {
                    tracing::warn!(%error, "inbox unreachable, backing off");
                    watch_config.retry_interval_secs
                }
            };
            if self
                .wait(wait_secs, watch_config.show_countdown, &mut shutdown)
                .await
            {
                break;
            }
        }
        let stats = &self.stats;
        tracing::info!(
            cycles = stats.cycles,
            discovered = stats.discovered,
            archived = stats.archived,
            stalled = stats.stalled,
            "watcher stopped"
        );
    }

    /// One poll: fresh enumeration, then sequential processing. Returns
    /// the number of documents the cycle discovered.
    pub async fn run_cycle(&mut self) -> Result<usize> {
        let candidates = enumerate(&self.watch_dir)?;
        self.stats.cycles += 1;
        if candidates.is_empty() {
            return Ok(0);
        }
        tracing::info!(count = candidates.len(), "documents discovered");

        let mut archived = 0u64;
        let mut stalled = 0u64;
        for path in &candidates {
            self.stats.discovered += 1;
            let doc = match Document::discover(path.clone(), self.pipeline.overlays()) {
                Ok(doc) => doc,
                Err(error) => {
                    tracing::error!(path = %path.display(), %error, "skipping candidate");
                    stalled += 1;
                    continue;
                }
            };
            match self.process_one(doc).await {
                Some(DocOutcome::Archived { .. }) => archived += 1,
                _ => stalled += 1,
            }
        }
        self.stats.archived += archived;
        self.stats.stalled += stalled;
        tracing::info!(
            total = candidates.len(),
            archived,
            stalled,
            run_archived = self.stats.archived,
            run_stalled = self.stats.stalled,
            "cycle complete"
        );
        Ok(candidates.len())
    }

    /// The blocking stage work runs off the async thread. A panicking
    /// stage is absorbed here as a stalled document.
    async fn process_one(&self, doc: Document) -> Option<DocOutcome> {
        let pipeline = Arc::clone(&self.pipeline);
        let name = doc.name.clone();
        match tokio::task::spawn_blocking(move || pipeline.process(&doc)).await {
            Ok(outcome) => Some(outcome),
            Err(error) => {
                tracing::error!(file = %name, %error, "processing task aborted");
                None
            }
        }
    }

    /// Sleep in 1 s steps so the loop stays responsive to shutdown.
    /// Returns true when shutdown was signalled.
    async fn wait(
        &self,
        secs: u64,
        show_countdown: bool,
        shutdown: &mut watch::Receiver<bool>,
    ) -> bool {
        for remaining in (1..=secs).rev() {
            if show_countdown {
                eprint!("\rnext poll in {:02}:{:02}", remaining / 60, remaining % 60);
                let _ = std::io::stderr().flush();
            }
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(1)) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        if show_countdown {
                            eprintln!();
                        }
                        return true;
                    }
                }
            }
        }
        if show_countdown && secs > 0 {
            eprint!("\r                    \r");
            let _ = std::io::stderr().flush();
        }
        false
    }
}

/// Fresh listing of routable candidates: plain files with a `.pdf`
/// extension (any case), in stable name order. Subdirectories — including
/// the backup folder — are never descended into.
pub fn enumerate(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| SpError::Access(format!("list {}: {e}", dir.display())))?;
    let mut candidates = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| SpError::Access(format!("list entry: {e}")))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let is_pdf = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);
        if is_pdf {
            candidates.push(path);
        }
    }
    candidates.sort();
    Ok(candidates)
}
