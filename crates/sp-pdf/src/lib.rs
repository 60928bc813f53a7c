//! Sealpost PDF primitives — overlay stamping, page normalization, and
//! lossless size optimization over `lopdf`.
//!
//! Each operation reads a source document and writes a separate output
//! path; the source is never touched, so callers can replace the working
//! file atomically only after full success.

pub mod doc;
pub mod engine;
pub mod normalize;
pub mod optimize;
pub mod stamp;

pub use engine::PdfEngine;
