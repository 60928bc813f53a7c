//! The concrete [`DocEngine`] backed by lopdf.

use sp_core::engine::{DocEngine, PageSize, StampPlacement};
use sp_core::error::Result;
use std::path::Path;

/// Stateless engine; all inputs arrive per call.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfEngine;

impl PdfEngine {
    pub fn new() -> Self {
        Self
    }
}

impl DocEngine for PdfEngine {
    fn composite(
        &self,
        base: &Path,
        stamp_image: &Path,
        placement: &StampPlacement,
        out: &Path,
    ) -> Result<()> {
        crate::stamp::composite(base, stamp_image, placement, out)
    }

    fn normalize(&self, source: &Path, target: PageSize, out: &Path) -> Result<()> {
        crate::normalize::normalize_to_target(source, target, out)
    }

    fn optimize(&self, source: &Path, out: &Path) -> Result<()> {
        let (before, after) = crate::optimize::optimize(source, out)?;
        tracing::debug!(before, after, source = %source.display(), "optimized");
        Ok(())
    }
}
