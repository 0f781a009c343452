use crate::document::{DocumentSource, FileSource, PdfDocument};
use crate::impose::{ImpositionPlan, padded_page_count};
use crate::options::BookletOptions;
use crate::split::plan_splits;
use crate::types::*;
use std::path::PathBuf;

/// Calculate statistics for a booklet job over a document of `page_count` pages.
///
/// Works on page counts alone, so it is cheap enough to preview a job before
/// running it.
pub fn calculate_statistics(
    page_count: usize,
    options: &BookletOptions,
) -> Result<BookletStatistics> {
    if page_count == 0 {
        return Err(BookletError::EmptyDocument);
    }
    options.validate()?;

    let shim_pages = usize::from(!options.same_page_parity);
    let plan = plan_splits(page_count + shim_pages, options.max_pages_per_split);
    let split_sizes = plan.split_sizes();

    let sheets_per_split: Vec<usize> = split_sizes
        .iter()
        .map(|&size| ImpositionPlan::for_pages(size).sheets.len())
        .collect();
    let blank_pages_added: usize = split_sizes
        .iter()
        .map(|&size| padded_page_count(size) - size)
        .sum();

    Ok(BookletStatistics {
        source_pages: page_count,
        shim_pages,
        output_sheets: sheets_per_split.iter().sum(),
        split_sizes,
        sheets_per_split,
        blank_pages_added,
        dropped_pages: plan.dropped_pages(),
    })
}

/// Statistics for an already opened document
pub fn document_statistics(
    doc: &PdfDocument,
    options: &BookletOptions,
) -> Result<BookletStatistics> {
    calculate_statistics(doc.page_count(), options)
}

/// Statistics for each input file, continuing past unreadable ones
pub fn batch_statistics(
    inputs: &[PathBuf],
    options: &BookletOptions,
) -> Vec<(PathBuf, Result<BookletStatistics>)> {
    inputs
        .iter()
        .map(|input| {
            let result = FileSource::new(input)
                .open()
                .and_then(|doc| document_statistics(&doc, options));
            if let Err(e) = &result {
                log::error!("{}: {}", input.display(), e);
            }
            (input.clone(), result)
        })
        .collect()
}
