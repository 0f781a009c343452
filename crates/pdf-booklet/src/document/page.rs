//! Page-level lookups: geometry, inherited attributes and content streams

use crate::constants::DEFAULT_PAGE_DIMENSIONS;
use crate::geometry::Rect;
use crate::types::{Result, Rotation};
use lopdf::{Dictionary, Document, Object, ObjectId};

/// Page attributes a page may inherit from its ancestors in the page tree
pub(crate) const INHERITABLE_KEYS: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// Deepest page tree we are willing to climb
const MAX_TREE_DEPTH: usize = 64;

/// Size, placement and rotation of one page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    /// Lower-left corner of the page box in user space
    pub origin: (f32, f32),
    /// Unrotated width in points
    pub width: f32,
    /// Unrotated height in points
    pub height: f32,
    /// Clockwise rotation applied when the page is displayed
    pub rotation: Rotation,
}

impl PageGeometry {
    /// The page rectangle in page space: `[0, 0, width, height]`
    pub fn rect(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    /// Width and height as the page is displayed (after `/Rotate`)
    pub fn display_size(&self) -> (f32, f32) {
        if self.rotation.swaps_axes() {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        }
    }
}

/// Follow a single indirect reference
pub(crate) fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

/// A dictionary given inline or by reference
pub(crate) fn dictionary_of<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Dictionary> {
    resolve(doc, obj).as_dict().ok()
}

/// Look up a key on the page, walking up `/Parent` links when absent
pub(crate) fn inherited_attribute<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    let mut current = doc.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = current.get(key) {
            return Some(resolve(doc, value));
        }
        let parent_id = current.get(b"Parent").and_then(Object::as_reference).ok()?;
        current = doc.get_dictionary(parent_id).ok()?;
    }
    None
}

/// Effective resource dictionary of a page
pub(crate) fn page_resources(doc: &Document, page_id: ObjectId) -> Option<&Dictionary> {
    inherited_attribute(doc, page_id, b"Resources").and_then(|obj| obj.as_dict().ok())
}

/// Read the geometry of a page
pub(crate) fn page_geometry(doc: &Document, page_id: ObjectId) -> PageGeometry {
    let page_box = [b"CropBox".as_slice(), b"MediaBox".as_slice()]
        .into_iter()
        .filter_map(|key| inherited_attribute(doc, page_id, key))
        .find_map(|obj| parse_box(doc, obj));

    let rotation = inherited_attribute(doc, page_id, b"Rotate")
        .and_then(|obj| obj.as_i64().ok())
        .map(Rotation::from_degrees)
        .unwrap_or_default();

    match page_box {
        Some(rect) => PageGeometry {
            origin: (rect.x0, rect.y0),
            width: rect.width(),
            height: rect.height(),
            rotation,
        },
        None => PageGeometry {
            origin: (0.0, 0.0),
            width: DEFAULT_PAGE_DIMENSIONS.0,
            height: DEFAULT_PAGE_DIMENSIONS.1,
            rotation,
        },
    }
}

/// Parse a `[x0 y0 x1 y1]` box, normalizing corner order
fn parse_box(doc: &Document, obj: &Object) -> Option<Rect> {
    let values = obj.as_array().ok()?;
    if values.len() != 4 {
        return None;
    }
    let mut nums = [0.0f32; 4];
    for (slot, value) in nums.iter_mut().zip(values) {
        *slot = extract_number(resolve(doc, value))?;
    }
    let rect = Rect::new(
        nums[0].min(nums[2]),
        nums[1].min(nums[3]),
        nums[0].max(nums[2]),
        nums[1].max(nums[3]),
    );
    rect.has_area().then_some(rect)
}

/// Extract numeric value from a PDF object
pub(crate) fn extract_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

// =============================================================================
// Page Content Extraction
// =============================================================================

/// Get the content stream data from a page.
pub(crate) fn page_content_bytes(doc: &Document, page_id: ObjectId) -> Result<Vec<u8>> {
    let page_dict = doc.get_dictionary(page_id)?;
    let contents = match page_dict.get(b"Contents") {
        Ok(c) => c,
        Err(_) => return Ok(Vec::new()), // No content = blank page
    };

    match contents {
        Object::Reference(id) => match doc.get_object(*id)? {
            Object::Array(arr) => concatenated_streams(doc, arr),
            other => Ok(stream_bytes(other)),
        },
        Object::Array(arr) => concatenated_streams(doc, arr),
        other => Ok(stream_bytes(other)),
    }
}

/// Concatenate multiple content streams
fn concatenated_streams(doc: &Document, refs: &[Object]) -> Result<Vec<u8>> {
    let mut result = Vec::new();
    for obj in refs {
        if let Object::Reference(id) = obj {
            result.extend_from_slice(&stream_bytes(doc.get_object(*id)?));
            result.push(b'\n');
        }
    }
    Ok(result)
}

fn stream_bytes(obj: &Object) -> Vec<u8> {
    match obj.as_stream() {
        Ok(stream) => stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone()),
        Err(_) => Vec::new(),
    }
}
