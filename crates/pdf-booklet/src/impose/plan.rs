//! Sheet pairing and sheet geometry for saddle-stitch booklets

use crate::constants::{PAGES_PER_SIGNATURE, SHEET_HEIGHT_PT, SHEET_WIDTH_PT};
use crate::geometry::Rect;

/// The two source pages printed side by side on one output page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetPair {
    /// Page drawn in the right column
    pub left: usize,
    /// Page drawn in the left column
    pub right: usize,
}

/// Positional pairing of a padded document's pages onto output sheets.
///
/// Sheet 1 carries the last and first pages, the innermost sheet the two
/// middle pages, so the folded and stacked sheets read in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImpositionPlan {
    /// Page count after padding (a multiple of four)
    pub page_count: usize,
    pub sheets: Vec<SheetPair>,
}

impl ImpositionPlan {
    /// Plan for a document of `source_pages` pages, padded as needed
    pub fn for_pages(source_pages: usize) -> Self {
        let page_count = padded_page_count(source_pages);
        let half = page_count / 2;

        let left_seq = (half..page_count).rev();
        let right_seq = 0..half;
        let sheets = left_seq
            .zip(right_seq)
            .map(|(left, right)| SheetPair { left, right })
            .collect();

        Self { page_count, sheets }
    }

    /// Blank pages the padding adds to a document of `source_pages` pages
    pub fn blank_pages(&self, source_pages: usize) -> usize {
        self.page_count.saturating_sub(source_pages)
    }
}

/// Smallest multiple of four holding `pages` pages
pub fn padded_page_count(pages: usize) -> usize {
    pages.div_ceil(PAGES_PER_SIGNATURE) * PAGES_PER_SIGNATURE
}

/// Whether pages on the sheet at zero-based `sheet_index` are turned upside
/// down (every odd-numbered sheet, counting from one)
pub fn is_flipped_sheet(sheet_index: usize) -> bool {
    sheet_index % 2 == 0
}

/// Two equal columns on a landscape sheet, separated and surrounded by a margin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SheetLayout {
    pub sheet_width: f32,
    pub sheet_height: f32,
    pub margin: f32,
}

impl SheetLayout {
    /// A4 landscape sheet
    pub fn a4_landscape(margin: f32) -> Self {
        Self {
            sheet_width: SHEET_WIDTH_PT,
            sheet_height: SHEET_HEIGHT_PT,
            margin,
        }
    }

    pub fn column_width(&self) -> f32 {
        (self.sheet_width - 3.0 * self.margin) / 2.0
    }

    pub fn column_height(&self) -> f32 {
        self.sheet_height - 2.0 * self.margin
    }

    pub fn left_column(&self) -> Rect {
        Rect::from_origin_size(
            self.margin,
            self.margin,
            self.column_width(),
            self.column_height(),
        )
    }

    pub fn right_column(&self) -> Rect {
        Rect::from_origin_size(
            2.0 * self.margin + self.column_width(),
            self.margin,
            self.column_width(),
            self.column_height(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_twelve_page_pairing() {
        let plan = ImpositionPlan::for_pages(12);
        let pairs: Vec<(usize, usize)> = plan.sheets.iter().map(|s| (s.left, s.right)).collect();
        assert_eq!(
            pairs,
            vec![(11, 0), (10, 1), (9, 2), (8, 3), (7, 4), (6, 5)]
        );
    }

    #[test]
    fn test_pairing_uses_every_page_once() {
        for pages in 1..40 {
            let plan = ImpositionPlan::for_pages(pages);
            let mut seen: Vec<usize> = plan
                .sheets
                .iter()
                .flat_map(|s| [s.left, s.right])
                .collect();
            seen.sort_unstable();
            assert_eq!(seen, (0..plan.page_count).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_padding() {
        assert_eq!(padded_page_count(0), 0);
        assert_eq!(padded_page_count(1), 4);
        assert_eq!(padded_page_count(4), 4);
        assert_eq!(padded_page_count(10), 12);
        assert_eq!(ImpositionPlan::for_pages(10).blank_pages(10), 2);
    }

    #[test]
    fn test_flipped_sheets_alternate() {
        assert!(is_flipped_sheet(0));
        assert!(!is_flipped_sheet(1));
        assert!(is_flipped_sheet(2));
    }

    #[test]
    fn test_columns_split_sheet() {
        let layout = SheetLayout::a4_landscape(10.0);
        assert_eq!(layout.column_width(), 406.0);
        assert_eq!(layout.column_height(), 575.0);
        assert_eq!(layout.left_column(), Rect::new(10.0, 10.0, 416.0, 585.0));
        assert_eq!(layout.right_column(), Rect::new(426.0, 10.0, 832.0, 585.0));
    }
}
