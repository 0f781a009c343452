//! Where document bytes come from

use super::PdfDocument;
use crate::types::*;
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// A readable origin of PDF bytes.
///
/// The core opens documents only through this trait, so file-backed and
/// memory-backed inputs are processed identically. Closing is dropping the
/// opened [`PdfDocument`].
pub trait DocumentSource {
    /// Human-readable name for logs and error messages
    fn name(&self) -> Cow<'_, str>;

    /// Read the raw PDF bytes
    fn read(&self) -> Result<Vec<u8>>;

    /// Parse the source into a document
    fn open(&self) -> Result<PdfDocument> {
        let bytes = self.read()?;
        PdfDocument::from_bytes(&bytes)
    }
}

/// A PDF stored on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DocumentSource for FileSource {
    fn name(&self) -> Cow<'_, str> {
        self.path.to_string_lossy()
    }

    fn read(&self) -> Result<Vec<u8>> {
        if !self.path.is_file() {
            return Err(BookletError::MissingSource(self.path.clone()));
        }
        Ok(std::fs::read(&self.path)?)
    }
}

/// A PDF already held in memory (an upload, a generated document)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemorySource {
    name: String,
    bytes: Vec<u8>,
}

impl MemorySource {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

impl DocumentSource for MemorySource {
    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.name)
    }

    fn read(&self) -> Result<Vec<u8>> {
        Ok(self.bytes.clone())
    }
}

impl<S: DocumentSource + ?Sized> DocumentSource for &S {
    fn name(&self) -> Cow<'_, str> {
        (**self).name()
    }

    fn read(&self) -> Result<Vec<u8>> {
        (**self).read()
    }
}
