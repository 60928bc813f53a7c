//! The narrow interface the pipeline requires from the PDF/image libraries.
//!
//! Every operation reads a source document and writes a distinct output
//! path; implementations must never mutate the source. The caller owns the
//! atomic-replace step (see `sp-pipeline`), so a failed operation leaves the
//! working file exactly as it was.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Pixel-to-point factor at the fixed 300 DPI reference resolution.
///
/// Stamp producers measure in pixels of a 300 DPI page raster; all on-page
/// placement and sizing is derived from this single factor.
pub const PX_TO_PT: f64 = 72.0 / 300.0;

/// A page size in PDF points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width_pt: f64,
    pub height_pt: f64,
}

impl PageSize {
    /// ISO A4 in points, the default normalization target.
    pub const A4: PageSize = PageSize {
        width_pt: 595.0,
        height_pt: 842.0,
    };

    pub fn new(width_pt: f64, height_pt: f64) -> Self {
        Self { width_pt, height_pt }
    }

    /// A box with zero or negative extent cannot be scaled into.
    pub fn is_degenerate(&self) -> bool {
        !(self.width_pt > 0.0 && self.height_pt > 0.0)
            || !self.width_pt.is_finite()
            || !self.height_pt.is_finite()
    }
}

/// Stamp placement in pixel space of the reference page raster.
///
/// Pixel coordinates use a top-left origin (how raster producers measure);
/// engines convert to PDF bottom-left space internally.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StampPlacement {
    pub reference_width_px: f64,
    pub reference_height_px: f64,
    pub center_x_px: f64,
    pub center_y_px: f64,
}

/// Document-composition, image, and page-geometry primitives.
pub trait DocEngine: Send + Sync {
    /// Composite the stamp image onto the base document.
    ///
    /// The stamp is centered at the placement point; its on-page size is its
    /// native pixel size converted through [`PX_TO_PT`] — no independent
    /// scaling. The merged document is written to `out`.
    fn composite(
        &self,
        base: &Path,
        stamp_image: &Path,
        placement: &StampPlacement,
        out: &Path,
    ) -> Result<()>;

    /// Rescale and center every page into the target page size, writing the
    /// normalized document to `out`. Content is uniformly scaled, never
    /// cropped or distorted.
    fn normalize(&self, source: &Path, target: PageSize, out: &Path) -> Result<()>;

    /// Rewrite internal stream encoding to a denser lossless form, writing
    /// the optimized document to `out`.
    fn optimize(&self, source: &Path, out: &Path) -> Result<()>;
}
