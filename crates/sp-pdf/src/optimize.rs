//! Size optimizer.
//!
//! Re-encodes plain streams with FlateDecode and renumbers objects. The
//! rewrite is lossless: rendered appearance is unchanged. When the rewrite
//! does not actually shrink the file, the original bytes are kept.

use lopdf::Document;
use sp_core::error::{Result, SpError};
use std::path::Path;

/// Optimize `source` into `out`, returning `(bytes_before, bytes_after)`.
/// The source document is never modified.
pub fn optimize(source: &Path, out: &Path) -> Result<(u64, u64)> {
    let before = std::fs::metadata(source)
        .map_err(|e| SpError::Optimization(format!("stat {}: {e}", source.display())))?
        .len();

    let mut doc = Document::load(source)
        .map_err(|e| SpError::Optimization(format!("parse {}: {e}", source.display())))?;
    doc.compress();
    doc.renumber_objects();
    doc.save(out)
        .map_err(|e| SpError::Optimization(format!("save {}: {e}", out.display())))?;

    let after = std::fs::metadata(out)
        .map_err(|e| SpError::Optimization(format!("stat {}: {e}", out.display())))?
        .len();
    if after >= before {
        // The rewrite did not pay off; ship the original bytes unchanged.
        std::fs::copy(source, out)
            .map_err(|e| SpError::Optimization(format!("restore {}: {e}", out.display())))?;
        return Ok((before, before));
    }
    Ok((before, after))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc::testdoc;
    use lopdf::{dictionary, Stream};

    /// A document padded with a large, highly compressible content stream.
    fn padded_pdf(path: &Path) {
        let mut doc = testdoc::single_page(595.0, 842.0);
        let page_id = *doc.get_pages().values().next().unwrap();
        let mut ops = String::new();
        for i in 0..2000 {
            ops.push_str(&format!("{} 10 m 100 100 l S\n", i % 50));
        }
        let content_id = doc.add_object(Stream::new(dictionary! {}, ops.into_bytes()));
        doc.get_object_mut(page_id)
            .unwrap()
            .as_dict_mut()
            .unwrap()
            .set("Contents", content_id);
        doc.save(path).unwrap();
    }

    #[test]
    fn test_optimize_shrinks_padded_document() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("src.pdf");
        let out = tmp.path().join("out.pdf");
        padded_pdf(&source);

        let (before, after) = optimize(&source, &out).unwrap();
        assert!(after < before);
        assert_eq!(std::fs::metadata(&out).unwrap().len(), after);

        // Still a loadable document with the same page count.
        let doc = Document::load(&out).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_optimize_source_untouched() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("src.pdf");
        let out = tmp.path().join("out.pdf");
        padded_pdf(&source);
        let before = std::fs::read(&source).unwrap();

        optimize(&source, &out).unwrap();
        assert_eq!(std::fs::read(&source).unwrap(), before);
    }

    #[test]
    fn test_optimize_keeps_original_when_not_smaller() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("src.pdf");
        let out = tmp.path().join("out.pdf");
        // Tiny document: structural overhead will not shrink.
        testdoc::single_page(595.0, 842.0).save(&source).unwrap();

        let (before, after) = optimize(&source, &out).unwrap();
        assert!(after <= before);
        if after == before {
            assert_eq!(
                std::fs::read(&out).unwrap(),
                std::fs::read(&source).unwrap()
            );
        }
    }

    #[test]
    fn test_optimize_unparseable_source_is_optimization_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("src.pdf");
        let out = tmp.path().join("out.pdf");
        std::fs::write(&source, b"garbage").unwrap();

        let err = optimize(&source, &out).unwrap_err();
        assert!(matches!(err, SpError::Optimization(_)));
        assert!(!out.exists());
    }
}
