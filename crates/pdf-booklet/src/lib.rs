//! Pagination and booklet imposition for PDF documents
//!
//! The pipeline splits a document into print-sized parts, imposes each part
//! as a saddle-stitch booklet on A4 landscape sheets and concatenates the
//! result. A separate join operation merges documents while keeping every
//! document on an odd starting page.

pub mod bounds;
pub mod constants;
pub mod document;
pub mod geometry;
pub mod impose;
pub mod merge;
mod options;
pub mod pipeline;
pub mod split;
mod stats;
mod types;

pub use bounds::{PageContent, detect_content_bounds};
pub use document::{DocumentSource, FileSource, MemorySource, PageGeometry, PdfDocument};
pub use geometry::{Matrix, Rect};
pub use impose::{ImpositionPlan, add_watermark, impose, impose_async};
pub use merge::{concatenate, join, join_sources};
pub use options::*;
pub use pipeline::{
    run_booklet_batch, run_booklet_job, run_booklet_job_async, run_booklet_job_from,
    run_join_job, run_join_job_async, split_to_dir,
};
pub use split::{plan_splits, split};
pub use stats::{batch_statistics, calculate_statistics, document_statistics};
pub use types::*;
