//! Job orchestration: split → impose → merge, and join
//!
//! Every job gets a fresh identifier and, for booklets, a private temporary
//! workspace. Intermediate files are written there and removed with it,
//! whether the job succeeds or fails. Only the final artifact lands in the
//! output directory.

use crate::document::{DocumentSource, FileSource, PdfDocument};
use crate::impose::impose;
use crate::merge::{concatenate, join_sources};
use crate::options::{BookletOptions, JoinOptions};
use crate::split::split;
use crate::types::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use uuid::Uuid;

/// A fresh opaque job identifier
pub fn new_job_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// File name of the `number`-th split (1-based)
pub fn split_file_name(number: usize) -> String {
    format!("split{:02}.pdf", number)
}

/// Job-scoped scratch directory, deleted on drop
struct JobWorkspace {
    root: TempDir,
}

impl JobWorkspace {
    fn create(job_id: &str) -> Result<Self> {
        let root = tempfile::Builder::new()
            .prefix(&format!("pdf_manager_{}_", job_id))
            .tempdir()?;
        Ok(Self { root })
    }

    fn splits_dir(&self) -> PathBuf {
        self.root.path().join("splits")
    }

    fn booklets_dir(&self) -> PathBuf {
        self.root.path().join("booklets")
    }
}

/// Split a document and write each part as `splitNN.pdf` in `output_dir`.
///
/// Returns the written paths in order.
pub fn split_to_dir(
    doc: &PdfDocument,
    output_dir: impl AsRef<Path>,
    max_pages_per_split: usize,
    same_page_parity: bool,
) -> Result<Vec<PathBuf>> {
    let output_dir = output_dir.as_ref();
    std::fs::create_dir_all(output_dir)?;

    let parts = split(doc, max_pages_per_split, same_page_parity)?;
    let mut paths = Vec::with_capacity(parts.len());
    for (i, mut part) in parts.into_iter().enumerate() {
        let path = output_dir.join(split_file_name(i + 1));
        part.save(&path)?;
        paths.push(path);
    }
    Ok(paths)
}

/// Turn one PDF file into a print-ready booklet PDF
pub fn run_booklet_job(
    input: impl AsRef<Path>,
    options: &BookletOptions,
    output_dir: impl AsRef<Path>,
) -> Result<JobResult> {
    run_booklet_job_from(&FileSource::new(input.as_ref()), options, output_dir)
}

/// Turn one document into a print-ready booklet PDF.
///
/// The document is split, each split is imposed on its own, and the imposed
/// splits are concatenated into `{job_id}_booklets_for_printing.pdf` inside
/// `output_dir`.
pub fn run_booklet_job_from<S: DocumentSource>(
    source: &S,
    options: &BookletOptions,
    output_dir: impl AsRef<Path>,
) -> Result<JobResult> {
    options.validate()?;

    let job_id = new_job_id();
    let output_dir = output_dir.as_ref();
    std::fs::create_dir_all(output_dir)?;
    let output_path = JobKind::Booklets.output_path(output_dir, &job_id);

    log::info!("Job {}: booklets for {}", job_id, source.name());

    let workspace = JobWorkspace::create(&job_id)?;
    let doc = source.open()?;

    let split_paths = split_to_dir(
        &doc,
        workspace.splits_dir(),
        options.max_pages_per_split,
        options.same_page_parity,
    )?;
    log::info!("Job {}: {} split(s)", job_id, split_paths.len());

    let booklets_dir = workspace.booklets_dir();
    std::fs::create_dir_all(&booklets_dir)?;
    let impose_options = options.impose_options();

    let mut booklet_paths = Vec::with_capacity(split_paths.len());
    for split_path in &split_paths {
        let split_doc = FileSource::new(split_path).open()?;
        let mut booklet = impose(&split_doc, &impose_options)?;

        let file_name = split_path
            .file_name()
            .ok_or_else(|| BookletError::Malformed("split path has no file name".to_string()))?;
        let booklet_path = booklets_dir.join(file_name);
        booklet.save(&booklet_path)?;
        booklet_paths.push(booklet_path);
    }

    let booklets = booklet_paths
        .iter()
        .map(|path| FileSource::new(path).open())
        .collect::<Result<Vec<_>>>()?;
    let mut merged = concatenate(&booklets)?;
    merged.save(&output_path)?;

    log::info!(
        "Job {}: wrote {} sheets to {}",
        job_id,
        merged.page_count(),
        output_path.display()
    );
    Ok(JobResult {
        job_id,
        output_path,
    })
}

/// Run one booklet job per input, continuing past failures
pub fn run_booklet_batch(
    inputs: &[PathBuf],
    options: &BookletOptions,
    output_dir: impl AsRef<Path>,
) -> Vec<(PathBuf, Result<JobResult>)> {
    let output_dir = output_dir.as_ref();
    inputs
        .iter()
        .map(|input| {
            let result = run_booklet_job(input, options, output_dir);
            if let Err(e) = &result {
                log::error!("{}: {}", input.display(), e);
            }
            (input.clone(), result)
        })
        .collect()
}

/// Join several PDF files into `{job_id}_joined.pdf` inside `output_dir`
pub fn run_join_job<S: DocumentSource>(
    sources: &[S],
    options: &JoinOptions,
    output_dir: impl AsRef<Path>,
) -> Result<JobResult> {
    let job_id = new_job_id();
    log::info!("Job {}: joining {} document(s)", job_id, sources.len());

    let mut joined = join_sources(sources, options)?;

    let output_dir = output_dir.as_ref();
    std::fs::create_dir_all(output_dir)?;
    let output_path = JobKind::Join.output_path(output_dir, &job_id);
    joined.save(&output_path)?;

    log::info!(
        "Job {}: wrote {} pages to {}",
        job_id,
        joined.page_count(),
        output_path.display()
    );
    Ok(JobResult {
        job_id,
        output_path,
    })
}

/// Async version of [`run_booklet_job`]
pub async fn run_booklet_job_async(
    input: PathBuf,
    options: BookletOptions,
    output_dir: PathBuf,
) -> Result<JobResult> {
    tokio::task::spawn_blocking(move || run_booklet_job(&input, &options, &output_dir)).await?
}

/// Async version of [`run_join_job`] over files
pub async fn run_join_job_async(
    inputs: Vec<PathBuf>,
    options: JoinOptions,
    output_dir: PathBuf,
) -> Result<JobResult> {
    tokio::task::spawn_blocking(move || {
        let sources: Vec<FileSource> = inputs.into_iter().map(FileSource::new).collect();
        run_join_job(&sources, &options, &output_dir)
    })
    .await?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_ids_are_unique_hex() {
        let a = new_job_id();
        let b = new_job_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_split_file_names() {
        assert_eq!(split_file_name(1), "split01.pdf");
        assert_eq!(split_file_name(12), "split12.pdf");
    }

    #[test]
    fn test_workspace_is_removed_on_drop() {
        let workspace = JobWorkspace::create("test").unwrap();
        let root = workspace.root.path().to_path_buf();
        assert!(root.is_dir());
        assert!(
            root.file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with("pdf_manager_test_")
        );
        drop(workspace);
        assert!(!root.exists());
    }
}
