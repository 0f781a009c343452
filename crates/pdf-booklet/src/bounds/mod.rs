//! Content bounds detection
//!
//! Finds the smallest rectangle enclosing everything drawn on a page, padded
//! by a margin and kept inside the page. The imposer uses it as the clip
//! region so white space around the content does not waste sheet area.

mod scanner;

pub use scanner::{PageContent, scan_page};

use crate::document::PdfDocument;
use crate::geometry::Rect;
use crate::types::Result;

/// Content rectangle of a page in page space.
///
/// Never fails for an existing page: a page whose content cannot be decoded
/// is treated as blank and yields the full page rectangle.
pub fn detect_content_bounds(doc: &PdfDocument, index: usize, margin_pt: f32) -> Result<Rect> {
    let page_rect = doc.page(index)?.rect();
    let content = match scan_page(doc, index) {
        Ok(content) => content,
        Err(e) => {
            log::debug!("Page {}: content not scannable ({}), using full page", index, e);
            PageContent::default()
        }
    };
    Ok(bounds_from_content(&content, page_rect, margin_pt))
}

/// Combine scanned content into a clip rectangle.
///
/// - no content at all gives the page rectangle, without margin
/// - otherwise the union is grown by `margin_pt` and clamped to the page
/// - a degenerate result falls back to the page rectangle
pub fn bounds_from_content(content: &PageContent, page_rect: Rect, margin_pt: f32) -> Rect {
    let Some(union) = content
        .all_rects()
        .copied()
        .reduce(|acc, rect| acc.union(&rect))
    else {
        return page_rect;
    };

    let bounds = union
        .expand(margin_pt)
        .clamp_to(page_rect.width(), page_rect.height());

    if bounds.has_area() { bounds } else { page_rect }
}
