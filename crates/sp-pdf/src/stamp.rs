//! Overlay compositor.
//!
//! Places a raster stamp onto the first page of a document. Placement and
//! sizing are expressed in pixel space of a fixed 300 DPI reference raster
//! (see [`sp_core::engine::PX_TO_PT`]); pixel coordinates use a top-left
//! origin and are converted to PDF bottom-left space here.

use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use sp_core::engine::{StampPlacement, PX_TO_PT};
use sp_core::error::{Result, SpError};
use std::io::Write;
use std::path::Path;

const STAMP_XOBJECT_NAME: &str = "SpStamp";

/// Composite `stamp_image` onto the first page of `base`, writing the
/// merged document to `out`. The base document is never modified.
pub fn composite(
    base: &Path,
    stamp_image: &Path,
    placement: &StampPlacement,
    out: &Path,
) -> Result<()> {
    let mut doc = Document::load(base)
        .map_err(|e| SpError::Composition(format!("parse {}: {e}", base.display())))?;
    let stamp = load_stamp(stamp_image)?;

    let page_id = first_page(&doc)?;
    let (img_id, width_px, height_px) = embed_stamp(&mut doc, stamp);
    register_xobject(&mut doc, page_id, img_id)?;

    let width_pt = width_px as f64 * PX_TO_PT;
    let height_pt = height_px as f64 * PX_TO_PT;
    let x0 = placement.center_x_px * PX_TO_PT - width_pt / 2.0;
    // Flip: placement y is measured from the top edge of the reference
    // raster, PDF user space grows upward from the bottom.
    let y0 = (placement.reference_height_px - placement.center_y_px) * PX_TO_PT - height_pt / 2.0;

    let mut content = doc
        .get_page_content(page_id)
        .map_err(|e| SpError::Composition(format!("page content: {e}")))?;
    content.extend_from_slice(
        format!(
            "\nq\n{width_pt:.6} 0 0 {height_pt:.6} {x0:.6} {y0:.6} cm\n/{STAMP_XOBJECT_NAME} Do\nQ"
        )
        .as_bytes(),
    );
    doc.change_page_content(page_id, content)
        .map_err(|e| SpError::Composition(format!("replace content: {e}")))?;

    doc.save(out)
        .map_err(|e| SpError::Composition(format!("save {}: {e}", out.display())))?;
    Ok(())
}

struct StampPixels {
    width: u32,
    height: u32,
    rgb: Vec<u8>,
    /// Present only when the image carries partial transparency.
    alpha: Option<Vec<u8>>,
}

fn load_stamp(path: &Path) -> Result<StampPixels> {
    let img = image::open(path)
        .map_err(|e| SpError::Asset(format!("open stamp {}: {e}", path.display())))?;
    let rgba = img.to_rgba8();
    let (width, height) = (rgba.width(), rgba.height());
    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    let mut alpha = Vec::with_capacity((width * height) as usize);
    let mut translucent = false;
    for pixel in rgba.pixels() {
        let [r, g, b, a] = pixel.0;
        rgb.extend_from_slice(&[r, g, b]);
        alpha.push(a);
        translucent |= a != u8::MAX;
    }
    Ok(StampPixels {
        width,
        height,
        rgb,
        alpha: translucent.then_some(alpha),
    })
}

/// Add the stamp as a Flate-encoded image XObject (with an SMask for the
/// alpha channel when present). Returns the object id and pixel size.
fn embed_stamp(doc: &mut Document, stamp: StampPixels) -> (ObjectId, u32, u32) {
    let StampPixels {
        width,
        height,
        rgb,
        alpha,
    } = stamp;

    let smask_id = alpha.map(|alpha| {
        let dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 8,
            "Filter" => "FlateDecode",
        };
        doc.add_object(Stream::new(dict, deflate(&alpha)))
    });

    let mut dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => width as i64,
        "Height" => height as i64,
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => 8,
        "Filter" => "FlateDecode",
    };
    if let Some(smask_id) = smask_id {
        dict.set("SMask", Object::Reference(smask_id));
    }
    let img_id = doc.add_object(Stream::new(dict, deflate(&rgb)));
    (img_id, width, height)
}

/// Make the stamp visible to the page under a fixed resource name,
/// materializing inherited resources onto the page when needed.
fn register_xobject(doc: &mut Document, page_id: ObjectId, img_id: ObjectId) -> Result<()> {
    let page_dict = doc
        .get_object(page_id)
        .and_then(Object::as_dict)
        .map_err(|e| SpError::Composition(format!("page dictionary: {e}")))?;

    let mut resources = match page_dict.get(b"Resources") {
        Ok(obj) => crate::doc::resolve(doc, obj)
            .as_dict()
            .ok()
            .cloned()
            .unwrap_or_else(Dictionary::new),
        Err(_) => Dictionary::new(),
    };
    let mut xobjects = match resources.get(b"XObject") {
        Ok(obj) => crate::doc::resolve(doc, obj)
            .as_dict()
            .ok()
            .cloned()
            .unwrap_or_else(Dictionary::new),
        Err(_) => Dictionary::new(),
    };
    xobjects.set(STAMP_XOBJECT_NAME, Object::Reference(img_id));
    resources.set("XObject", Object::Dictionary(xobjects));

    doc.get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .map_err(|e| SpError::Composition(format!("page dictionary: {e}")))?
        .set("Resources", Object::Dictionary(resources));
    Ok(())
}

fn first_page(doc: &Document) -> Result<ObjectId> {
    doc.get_pages()
        .values()
        .next()
        .copied()
        .ok_or_else(|| SpError::Composition("document has no pages".into()))
}

fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    // Writing to a Vec cannot fail.
    let _ = encoder.write_all(data);
    encoder.finish().unwrap_or_default()
}
