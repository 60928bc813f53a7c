//! Small helpers shared by the page-level operations.

use lopdf::{Document, Object, ObjectId};

/// A PDF real from an f64, whatever width `Object::Real` carries.
pub(crate) fn real(value: f64) -> Object {
    Object::Real(value as _)
}

/// Numeric value of an integer or real object.
pub(crate) fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}

/// Follow a reference one level; other objects pass through.
pub(crate) fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

/// The effective media box of a page, honoring inheritance from the page
/// tree. Returned as `[x0, y0, x1, y1]`.
pub(crate) fn media_box(doc: &Document, page_id: ObjectId) -> Option<[f64; 4]> {
    let mut dict_id = page_id;
    // Parent chains are short; the bound guards malformed cyclic trees.
    for _ in 0..32 {
        let dict = doc.get_object(dict_id).ok()?.as_dict().ok()?;
        if let Ok(obj) = dict.get(b"MediaBox") {
            let arr = resolve(doc, obj).as_array().ok()?;
            if arr.len() != 4 {
                return None;
            }
            let mut rect = [0.0; 4];
            for (slot, entry) in rect.iter_mut().zip(arr) {
                *slot = number(resolve(doc, entry))?;
            }
            return Some(rect);
        }
        match dict.get(b"Parent") {
            Ok(Object::Reference(parent)) => dict_id = *parent,
            _ => return None,
        }
    }
    None
}
