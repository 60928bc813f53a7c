//! Page normalizer.
//!
//! Uniformly scales every page's content into a fixed target page size and
//! centers it, then rewrites the declared page bounds to the target.
//! Content is never cropped and aspect ratio is never distorted.

use crate::doc::{media_box, real};
use lopdf::{Document, Object};
use sp_core::engine::PageSize;
use sp_core::error::{Result, SpError};
use std::path::Path;

/// Normalize every page of `source` to `target`, writing the result to
/// `out`. The source document is never modified.
pub fn normalize_to_target(source: &Path, target: PageSize, out: &Path) -> Result<()> {
    if target.is_degenerate() {
        return Err(SpError::Normalization(format!(
            "degenerate target page size {}x{}",
            target.width_pt, target.height_pt
        )));
    }

    let mut doc = Document::load(source)
        .map_err(|e| SpError::Normalization(format!("parse {}: {e}", source.display())))?;

    let page_ids: Vec<_> = doc.get_pages().values().copied().collect();
    if page_ids.is_empty() {
        return Err(SpError::Normalization("document has no pages".into()));
    }

    for page_id in page_ids {
        let rect = media_box(&doc, page_id).ok_or_else(|| {
            SpError::Normalization(format!("page {page_id:?}: no readable media box"))
        })?;
        let width = rect[2] - rect[0];
        let height = rect[3] - rect[1];
        if !(width > 0.0 && height > 0.0) || !width.is_finite() || !height.is_finite() {
            return Err(SpError::Normalization(format!(
                "page {page_id:?}: degenerate media box {width}x{height}"
            )));
        }

        let scale = (target.width_pt / width).min(target.height_pt / height);
        let offset_x = (target.width_pt - width * scale) / 2.0 - rect[0] * scale;
        let offset_y = (target.height_pt - height * scale) / 2.0 - rect[1] * scale;

        let content = doc
            .get_page_content(page_id)
            .map_err(|e| SpError::Normalization(format!("page content: {e}")))?;
        let mut wrapped = format!(
            "q\n{scale:.6} 0 0 {scale:.6} {offset_x:.6} {offset_y:.6} cm\n"
        )
        .into_bytes();
        wrapped.extend_from_slice(&content);
        wrapped.extend_from_slice(b"\nQ");
        doc.change_page_content(page_id, wrapped)
            .map_err(|e| SpError::Normalization(format!("replace content: {e}")))?;

        let page_dict = doc
            .get_object_mut(page_id)
            .and_then(Object::as_dict_mut)
            .map_err(|e| SpError::Normalization(format!("page dictionary: {e}")))?;
        page_dict.set(
            "MediaBox",
            vec![
                Object::Integer(0),
                Object::Integer(0),
                real(target.width_pt),
                real(target.height_pt),
            ],
        );
        // A stale crop box would clip the recentered content.
        page_dict.remove(b"CropBox");
    }

    doc.save(out)
        .map_err(|e| SpError::Normalization(format!("save {}: {e}", out.display())))?;
    Ok(())
}
