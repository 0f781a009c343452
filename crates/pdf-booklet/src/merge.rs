//! Document merging
//!
//! Two flavours: a plain concatenation used to assemble imposed splits, and
//! a parity-aware join for user-facing merges where every input should begin
//! on an odd (right-hand) page.

use crate::document::{DocumentSource, PdfDocument};
use crate::options::JoinOptions;
use crate::types::*;

/// Append every page of every document, in order
pub fn concatenate<'a>(docs: impl IntoIterator<Item = &'a PdfDocument>) -> Result<PdfDocument> {
    let mut merged = PdfDocument::new();
    for doc in docs {
        merged.append_document(doc)?;
    }
    Ok(merged)
}

/// Join documents in order, skipping empty ones.
///
/// With `preserve_parity`, a blank page is inserted before a document
/// whenever the output so far has an odd page count, so the document starts
/// on an odd one-based page. The blank takes the displayed size of that
/// document's first page.
pub fn join<'a>(
    docs: impl IntoIterator<Item = &'a PdfDocument>,
    options: &JoinOptions,
) -> Result<PdfDocument> {
    let mut joined = PdfDocument::new();

    for doc in docs {
        if doc.is_empty() {
            log::debug!("Skipping empty document");
            continue;
        }

        if options.preserve_parity && joined.page_count() % 2 == 1 {
            let (width, height) = doc.page(0)?.display_size();
            joined.new_page(width, height)?;
        }
        joined.append_document(doc)?;
    }

    if joined.is_empty() {
        return Err(BookletError::EmptyResult);
    }
    Ok(joined)
}

/// Open each source and [`join`] them.
///
/// Fails with [`BookletError::MissingSource`] for a file that does not
/// exist before any output is produced for later inputs.
pub fn join_sources<S: DocumentSource>(sources: &[S], options: &JoinOptions) -> Result<PdfDocument> {
    let mut docs = Vec::with_capacity(sources.len());
    for source in sources {
        let doc = source.open()?;
        log::debug!("Opened {} ({} pages)", source.name(), doc.page_count());
        docs.push(doc);
    }
    join(&docs, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with_widths(widths: &[f32]) -> PdfDocument {
        let mut doc = PdfDocument::new();
        for &w in widths {
            doc.new_page(w, 800.0).unwrap();
        }
        doc
    }

    #[test]
    fn test_concatenate_keeps_order() {
        let a = doc_with_widths(&[100.0, 200.0]);
        let b = doc_with_widths(&[300.0]);
        let merged = concatenate([&a, &b]).unwrap();
        let widths: Vec<f32> = (0..merged.page_count())
            .map(|i| merged.page(i).unwrap().width)
            .collect();
        assert_eq!(widths, vec![100.0, 200.0, 300.0]);
    }

    #[test]
    fn test_join_inserts_blank_sized_like_next_document() {
        let a = doc_with_widths(&[100.0, 100.0, 100.0]);
        let b = doc_with_widths(&[400.0, 400.0]);
        let joined = join([&a, &b], &JoinOptions::default()).unwrap();

        assert_eq!(joined.page_count(), 6);
        assert_eq!(joined.page(3).unwrap().width, 400.0);
        assert!(joined.page_content(3).unwrap().operations.is_empty());
    }

    #[test]
    fn test_join_without_parity() {
        let a = doc_with_widths(&[100.0, 100.0, 100.0]);
        let b = doc_with_widths(&[400.0, 400.0]);
        let options = JoinOptions {
            preserve_parity: false,
        };
        assert_eq!(join([&a, &b], &options).unwrap().page_count(), 5);
    }

    #[test]
    fn test_join_all_empty() {
        let empty = PdfDocument::new();
        assert!(matches!(
            join([&empty, &empty], &JoinOptions::default()),
            Err(BookletError::EmptyResult)
        ));
        assert!(matches!(
            join(std::iter::empty(), &JoinOptions::default()),
            Err(BookletError::EmptyResult)
        ));
    }
}
