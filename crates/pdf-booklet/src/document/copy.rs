//! Deep copy of PDF objects between documents

use crate::types::Result;
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::HashMap;

/// Maps object IDs of a source document to their copies in the output
pub type CopyCache = HashMap<ObjectId, ObjectId>;

/// Deep copy an object from source to output document, following references.
///
/// Uses a cache to avoid copying the same object multiple times. The output ID
/// is reserved before the referenced object is walked, so reference cycles
/// (annotation popups, outline links) resolve to the same copy.
///
/// Page and page-tree nodes are never pulled in through a reference: a link to
/// a page whose ID is not already in the cache becomes `null` instead of
/// dragging the whole source page tree along.
pub fn copy_object_deep(
    output: &mut Document,
    source: &Document,
    obj: &Object,
    cache: &mut CopyCache,
) -> Result<Object> {
    match obj {
        Object::Reference(id) => {
            if let Some(&new_id) = cache.get(id) {
                return Ok(Object::Reference(new_id));
            }

            let referenced = match source.get_object(*id) {
                Ok(referenced) => referenced,
                // Dangling references are legal and mean null
                Err(_) => return Ok(Object::Null),
            };
            if is_page_tree_node(referenced) {
                return Ok(Object::Null);
            }

            let new_id = output.new_object_id();
            cache.insert(*id, new_id);
            let copied = copy_object_deep(output, source, referenced, cache)?;
            output.objects.insert(new_id, copied);

            Ok(Object::Reference(new_id))
        }
        Object::Dictionary(dict) => Ok(Object::Dictionary(copy_dictionary(
            output, source, dict, cache,
        )?)),
        Object::Array(arr) => {
            let new_arr: Result<Vec<_>> = arr
                .iter()
                .map(|item| copy_object_deep(output, source, item, cache))
                .collect();
            Ok(Object::Array(new_arr?))
        }
        Object::Stream(stream) => {
            let mut copied = stream.clone();
            copied.dict = copy_dictionary(output, source, &stream.dict, cache)?;
            Ok(Object::Stream(copied))
        }
        // Primitive types: just clone
        _ => Ok(obj.clone()),
    }
}

/// Copy every entry of a dictionary
pub fn copy_dictionary(
    output: &mut Document,
    source: &Document,
    dict: &Dictionary,
    cache: &mut CopyCache,
) -> Result<Dictionary> {
    let mut new_dict = Dictionary::new();
    for (key, value) in dict.iter() {
        new_dict.set(key.clone(), copy_object_deep(output, source, value, cache)?);
    }
    Ok(new_dict)
}

fn is_page_tree_node(obj: &Object) -> bool {
    obj.as_dict()
        .and_then(|dict| dict.get(b"Type"))
        .and_then(Object::as_name)
        .map(|name| name == b"Page" || name == b"Pages")
        .unwrap_or(false)
}
