//! Booklet imposition - two source pages per landscape sheet
//!
//! This module orchestrates the imposition process:
//! 1. Pad the document to a multiple of four pages
//! 2. Pair pages for a saddle-stitch fold
//! 3. Crop each page to its content and fit it into a sheet column
//! 4. Stamp the first sheet with a marker

mod plan;
mod sheet;
mod watermark;

pub use plan::{ImpositionPlan, SheetLayout, SheetPair, is_flipped_sheet, padded_page_count};
pub use sheet::fit_matrix;
pub use watermark::add_watermark;

use crate::bounds::detect_content_bounds;
use crate::constants::{SHEET_HEIGHT_PT, SHEET_WIDTH_PT};
use crate::document::{CopyCache, PdfDocument};
use crate::geometry::Rect;
use crate::options::ImposeOptions;
use crate::types::*;
use sheet::SheetCanvas;

/// Impose a document as a booklet on A4 landscape sheets.
///
/// The output has half as many pages as the padded input. The input is not
/// modified; padding happens on a copy.
pub fn impose(doc: &PdfDocument, options: &ImposeOptions) -> Result<PdfDocument> {
    if doc.is_empty() {
        return Err(BookletError::EmptyDocument);
    }
    options.validate()?;

    let padded = padded_copy(doc)?;
    let plan = ImpositionPlan::for_pages(padded.page_count());
    let layout = SheetLayout::a4_landscape(options.margin_pt());

    let mut output = PdfDocument::new();
    let mut cache = CopyCache::new();

    for (sheet_index, pair) in plan.sheets.iter().enumerate() {
        let flip = is_flipped_sheet(sheet_index);
        log::debug!(
            "Sheet {}: pages {} | {}{}",
            sheet_index + 1,
            pair.right + 1,
            pair.left + 1,
            if flip { " (upside down)" } else { "" }
        );
        let mut canvas = SheetCanvas::new(SHEET_WIDTH_PT, SHEET_HEIGHT_PT);

        let mut placer = Placer {
            canvas: &mut canvas,
            output: &mut output,
            source: &padded,
            cache: &mut cache,
            margin: options.margin_pt(),
        };
        placer.place(pair.right, layout.left_column(), flip)?;
        placer.place(pair.left, layout.right_column(), flip)?;

        canvas.finish(&mut output)?;
    }

    if options.add_watermark {
        add_watermark(&mut output)?;
    }

    log::debug!(
        "Imposed {} pages ({} padded) onto {} sheets",
        doc.page_count(),
        plan.page_count,
        output.page_count()
    );
    Ok(output)
}

/// Async version of [`impose`], run on the blocking thread pool
pub async fn impose_async(doc: PdfDocument, options: ImposeOptions) -> Result<PdfDocument> {
    tokio::task::spawn_blocking(move || impose(&doc, &options)).await?
}

/// Copy of `doc` padded with blank pages, sized like its last page, up to a
/// multiple of four
fn padded_copy(doc: &PdfDocument) -> Result<PdfDocument> {
    let mut padded = doc.clone();
    let target = padded_page_count(doc.page_count());
    if padded.page_count() < target {
        let (width, height) = doc.page(doc.page_count() - 1)?.display_size();
        while padded.page_count() < target {
            padded.new_page(width, height)?;
        }
    }
    Ok(padded)
}

/// Places source pages into sheet columns, degrading gracefully
struct Placer<'a> {
    canvas: &'a mut SheetCanvas,
    output: &'a mut PdfDocument,
    source: &'a PdfDocument,
    cache: &'a mut CopyCache,
    margin: f32,
}

impl Placer<'_> {
    /// Draw one page into `column`.
    ///
    /// Tries the content-cropped page first, then the whole page, and as a
    /// last resort paints the column white so the sheet stays printable.
    fn place(&mut self, index: usize, column: Rect, flip: bool) -> Result<()> {
        let geometry = self.source.page(index)?;
        let rotation = if flip {
            geometry.rotation.flipped()
        } else {
            geometry.rotation
        };

        let bounds = detect_content_bounds(self.source, index, self.margin)?;
        let clip = (bounds != geometry.rect()).then_some(bounds);

        let mut attempts = vec![clip];
        if clip.is_some() {
            attempts.push(None);
        }

        for attempt in attempts {
            match self.canvas.draw_page(
                self.output,
                self.source,
                index,
                attempt,
                column,
                rotation,
                self.cache,
            ) {
                Ok(()) => return Ok(()),
                Err(BookletError::Placement(reason)) => {
                    log::warn!("Page {}: placement failed ({})", index + 1, reason);
                }
                Err(e) => return Err(e),
            }
        }

        log::warn!("Page {}: left blank on the sheet", index + 1);
        if column.has_area() {
            self.canvas.fill_rect(column, 1.0);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_document(pages: usize) -> PdfDocument {
        let mut doc = PdfDocument::new();
        for _ in 0..pages {
            doc.new_page(595.0, 842.0).unwrap();
        }
        doc
    }

    #[test]
    fn test_padded_copy_leaves_source_alone() {
        let doc = blank_document(5);
        let padded = padded_copy(&doc).unwrap();
        assert_eq!(padded.page_count(), 8);
        assert_eq!(doc.page_count(), 5);
    }

    #[test]
    fn test_impose_halves_padded_count() {
        let doc = blank_document(6);
        let output = impose(&doc, &ImposeOptions::default()).unwrap();
        assert_eq!(output.page_count(), 4);
    }

    #[test]
    fn test_impose_empty_document() {
        let doc = PdfDocument::new();
        assert!(matches!(
            impose(&doc, &ImposeOptions::default()),
            Err(BookletError::EmptyDocument)
        ));
    }

    #[test]
    fn test_oversized_margin_paints_blank_columns() {
        // Columns have no area, every placement falls through to the last resort
        let doc = blank_document(4);
        let options = ImposeOptions {
            margin_cm: 15.0,
            add_watermark: false,
        };
        let output = impose(&doc, &options).unwrap();
        assert_eq!(output.page_count(), 2);
    }
}
