use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BookletError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error("Document has no pages")]
    EmptyDocument,
    #[error("Input file does not exist: {}", .0.display())]
    MissingSource(PathBuf),
    #[error("Join produced an empty document (every input was empty)")]
    EmptyResult,
    #[error("Page placement failed: {0}")]
    Placement(String),
    #[error("Page index {index} out of range (document has {count} pages)")]
    PageOutOfRange { index: usize, count: usize },
    #[error("Malformed PDF structure: {0}")]
    Malformed(String),
}

pub type Result<T> = std::result::Result<T, BookletError>;

/// Clockwise page rotation, as stored in a page's `/Rotate` entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    None,
    Clockwise90,
    Clockwise180,
    Clockwise270,
}

impl Rotation {
    pub fn degrees(self) -> i32 {
        match self {
            Rotation::None => 0,
            Rotation::Clockwise90 => 90,
            Rotation::Clockwise180 => 180,
            Rotation::Clockwise270 => 270,
        }
    }

    /// Normalize any multiple of 90 (negative values included).
    /// Values that are not a multiple of 90 are treated as no rotation,
    /// which is what viewers do with such pages.
    pub fn from_degrees(degrees: i64) -> Self {
        match degrees.rem_euclid(360) {
            90 => Rotation::Clockwise90,
            180 => Rotation::Clockwise180,
            270 => Rotation::Clockwise270,
            _ => Rotation::None,
        }
    }

    /// The same rotation turned a further half revolution
    pub fn flipped(self) -> Self {
        Self::from_degrees(self.degrees() as i64 + 180)
    }

    /// Whether the displayed width and height are swapped
    pub fn swaps_axes(self) -> bool {
        matches!(self, Rotation::Clockwise90 | Rotation::Clockwise270)
    }
}

/// Inclusive range of zero-based page indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub start: usize,
    pub end: usize,
}

impl PageRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn contains(&self, index: usize) -> bool {
        (self.start..=self.end).contains(&index)
    }
}

/// How a document is cut into sub-documents.
///
/// Ranges are ordered and non-overlapping. Indices that fall between two
/// ranges were skipped by the parity correction and are not part of any
/// sub-document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPlan {
    /// Page count of the (possibly shimmed) document the plan was made for
    pub page_count: usize,
    pub ranges: Vec<PageRange>,
}

impl SplitPlan {
    /// Page indices not covered by any range
    pub fn dropped_pages(&self) -> Vec<usize> {
        (0..self.page_count)
            .filter(|&idx| !self.ranges.iter().any(|r| r.contains(idx)))
            .collect()
    }

    pub fn split_sizes(&self) -> Vec<usize> {
        self.ranges.iter().map(PageRange::len).collect()
    }
}

/// Outcome of one pipeline invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobResult {
    /// Opaque unique token (UUID v4, simple form)
    pub job_id: String,
    /// Location of the final artifact
    pub output_path: PathBuf,
}

/// The kind of artifact a job writes, which fixes its file name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    Booklets,
    Join,
}

impl JobKind {
    fn file_suffix(self) -> &'static str {
        match self {
            JobKind::Booklets => "booklets_for_printing",
            JobKind::Join => "joined",
        }
    }

    /// Re-derive the output path of a job from its identifier
    pub fn output_path(self, output_dir: impl AsRef<Path>, job_id: &str) -> PathBuf {
        output_dir
            .as_ref()
            .join(format!("{}_{}.pdf", job_id, self.file_suffix()))
    }
}

/// Statistics about a booklet job, computed without touching any PDF
#[derive(Debug, Clone, PartialEq)]
pub struct BookletStatistics {
    /// Pages in the input document
    pub source_pages: usize,
    /// Blank pages prepended by the parity shim (0 or 1)
    pub shim_pages: usize,
    /// Page count of each split, in order
    pub split_sizes: Vec<usize>,
    /// Output sheets produced for each split
    pub sheets_per_split: Vec<usize>,
    /// Total output sheets (pages of the final PDF)
    pub output_sheets: usize,
    /// Blank pages added to pad splits to a multiple of four
    pub blank_pages_added: usize,
    /// Indices (in the shimmed document) skipped by the parity correction
    pub dropped_pages: Vec<usize>,
}
