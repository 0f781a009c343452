//! Page splitter
//!
//! Cuts a document into consecutive sub-documents of bounded size. Every
//! sub-document after the first starts on an odd page (even zero-based
//! index), so each split prints as its own signature with the expected
//! recto/verso layout.

use crate::document::PdfDocument;
use crate::types::*;

/// Compute the page ranges for a document of `page_count` pages.
///
/// Chunks hold at most `max_pages_per_split` pages. A chunk whose successor
/// would start on an odd zero-based index is shortened by one page, but
/// never below a single page. When a chunk after the first would itself
/// start on an odd index, that page is skipped and left out of every range;
/// this only happens for a limit of one page.
pub fn plan_splits(page_count: usize, max_pages_per_split: usize) -> SplitPlan {
    let max = max_pages_per_split.max(1);
    let mut ranges = Vec::new();
    let mut start = 0usize;

    while start < page_count {
        if !ranges.is_empty() && start % 2 == 1 {
            start += 1;
            if start >= page_count {
                break;
            }
        }

        let mut end = (start + max - 1).min(page_count - 1);
        let next_start = end + 1;
        if next_start < page_count && next_start % 2 == 1 {
            // Never below `start`: a one-page chunk stays one page long
            end = end.saturating_sub(1).max(start);
        }

        ranges.push(PageRange::new(start, end));
        start = end + 1;
    }

    SplitPlan { page_count, ranges }
}

/// Split a document according to [`plan_splits`].
///
/// With `same_page_parity == false` a blank page, sized like the first
/// page, is put in front of the document before planning, shifting every
/// page one position later.
pub fn split(
    doc: &PdfDocument,
    max_pages_per_split: usize,
    same_page_parity: bool,
) -> Result<Vec<PdfDocument>> {
    if doc.is_empty() {
        return Err(BookletError::EmptyDocument);
    }

    let shimmed;
    let source = if same_page_parity {
        doc
    } else {
        shimmed = with_leading_blank(doc)?;
        &shimmed
    };

    let plan = plan_splits(source.page_count(), max_pages_per_split);
    let dropped = plan.dropped_pages();
    if !dropped.is_empty() {
        log::warn!(
            "Parity correction skipped {} page(s) at index {:?}",
            dropped.len(),
            dropped
        );
    }

    let mut splits = Vec::with_capacity(plan.ranges.len());
    for range in &plan.ranges {
        let mut part = PdfDocument::new();
        part.insert_pages(source, range.start, range.end)?;
        splits.push(part);
    }

    log::debug!(
        "Split {} pages into {} part(s): {:?}",
        source.page_count(),
        splits.len(),
        plan.split_sizes()
    );
    Ok(splits)
}

/// Copy of `doc` preceded by one blank page the size of its first page
fn with_leading_blank(doc: &PdfDocument) -> Result<PdfDocument> {
    let (width, height) = doc.page(0)?.display_size();
    let mut shimmed = PdfDocument::new();
    shimmed.new_page(width, height)?;
    shimmed.append_document(doc)?;
    Ok(shimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranges(plan: &SplitPlan) -> Vec<(usize, usize)> {
        plan.ranges.iter().map(|r| (r.start, r.end)).collect()
    }

    #[test]
    fn test_plan_even_limit() {
        let plan = plan_splits(100, 40);
        assert_eq!(ranges(&plan), vec![(0, 39), (40, 79), (80, 99)]);
        assert!(plan.dropped_pages().is_empty());
    }

    #[test]
    fn test_plan_odd_limit_shrinks_chunks() {
        let plan = plan_splits(10, 5);
        assert_eq!(ranges(&plan), vec![(0, 3), (4, 7), (8, 9)]);
        assert_eq!(plan.split_sizes(), vec![4, 4, 2]);
    }

    #[test]
    fn test_plan_nine_pages_limit_four() {
        let plan = plan_splits(9, 4);
        assert_eq!(ranges(&plan), vec![(0, 3), (4, 7), (8, 8)]);
        assert_eq!(plan.split_sizes(), vec![4, 4, 1]);
        assert!(plan.dropped_pages().is_empty());
    }

    #[test]
    fn test_plan_nine_pages_limit_five() {
        let plan = plan_splits(9, 5);
        assert_eq!(plan.split_sizes(), vec![4, 4, 1]);
        assert_eq!(plan.ranges[1].start, 4);
        assert_eq!(plan.ranges[2].start, 8);
    }

    #[test]
    fn test_plan_fits_in_one_chunk() {
        let plan = plan_splits(7, 40);
        assert_eq!(ranges(&plan), vec![(0, 6)]);
    }

    #[test]
    fn test_plan_chunks_after_first_start_even() {
        for total in 1..60 {
            for max in 2..12 {
                let plan = plan_splits(total, max);
                for range in plan.ranges.iter().skip(1) {
                    assert_eq!(range.start % 2, 0, "total={} max={}", total, max);
                }
                for range in &plan.ranges {
                    assert!(range.len() <= max);
                }
                assert!(plan.dropped_pages().is_empty(), "total={} max={}", total, max);
            }
        }
    }

    #[test]
    fn test_plan_limit_one_drops_odd_pages() {
        let plan = plan_splits(4, 1);
        assert_eq!(ranges(&plan), vec![(0, 0), (2, 2)]);
        assert_eq!(plan.dropped_pages(), vec![1, 3]);
    }

    #[test]
    fn test_plan_empty() {
        let plan = plan_splits(0, 40);
        assert!(plan.ranges.is_empty());
    }
}
