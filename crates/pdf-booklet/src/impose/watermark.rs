//! Marker stamped on imposed output

use crate::constants::{
    HELVETICA_ASTERISK_WIDTH, WATERMARK_FONT_SIZE, WATERMARK_OFFSET, WATERMARK_TEXT,
};
use crate::document::PdfDocument;
use crate::types::Result;

/// Stamp the marker glyph near the top-right corner of the first page.
///
/// The glyph's right edge sits `WATERMARK_OFFSET` points from the right
/// edge; its baseline one offset plus one font size below the top edge.
/// Other pages are left alone.
pub fn add_watermark(doc: &mut PdfDocument) -> Result<()> {
    if doc.is_empty() {
        return Ok(());
    }

    let (width, height) = doc.page(0)?.display_size();
    let text_width = HELVETICA_ASTERISK_WIDTH / 1000.0 * WATERMARK_FONT_SIZE;
    let x = width - text_width - WATERMARK_OFFSET;
    let y = height - WATERMARK_OFFSET - WATERMARK_FONT_SIZE;

    doc.insert_text(0, x, y, WATERMARK_TEXT, WATERMARK_FONT_SIZE)
}
