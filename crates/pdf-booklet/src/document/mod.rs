//! Document manipulation on top of lopdf
//!
//! [`PdfDocument`] is the narrow document interface the pipeline works with:
//! open, count, copy page ranges, append blank pages, stamp text, save.
//! Everything else about PDF structure stays inside this module.

mod copy;
mod page;
mod source;

pub use copy::{CopyCache, copy_dictionary, copy_object_deep};
pub use page::PageGeometry;
pub use source::{DocumentSource, FileSource, MemorySource};

pub(crate) use page::{dictionary_of, extract_number, page_resources, resolve};

use crate::types::*;
use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use page::{INHERITABLE_KEYS, inherited_attribute, page_content_bytes, page_geometry};
use std::path::Path;

/// An ordered, mutable sequence of pages backed by a lopdf document
#[derive(Debug, Clone)]
pub struct PdfDocument {
    inner: Document,
    /// Page object IDs in view order
    page_ids: Vec<ObjectId>,
}

impl Default for PdfDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfDocument {
    /// Create an empty document with a flat page tree
    pub fn new() -> Self {
        let mut inner = Document::with_version("1.7");
        let pages_id = inner.new_object_id();
        let pages_dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(Vec::new())),
            ("Count", Object::Integer(0)),
        ]);
        inner
            .objects
            .insert(pages_id, Object::Dictionary(pages_dict));

        let catalog_id = inner.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]));
        inner.trailer.set("Root", catalog_id);

        Self {
            inner,
            page_ids: Vec::new(),
        }
    }

    /// Wrap an already parsed lopdf document
    pub fn from_lopdf(inner: Document) -> Self {
        let page_ids = inner.get_pages().values().copied().collect();
        Self { inner, page_ids }
    }

    /// Parse a PDF held in memory
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(Self::from_lopdf(Document::load_mem(bytes)?))
    }

    /// Load a PDF from disk
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_lopdf(Document::load(path)?))
    }

    /// Serialize the document
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        let mut writer = Vec::new();
        self.inner.save_to(&mut writer)?;
        Ok(writer)
    }

    /// Write the document to disk
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.page_ids.is_empty()
    }

    /// Access the underlying lopdf document
    pub fn inner(&self) -> &Document {
        &self.inner
    }

    pub(crate) fn inner_mut(&mut self) -> &mut Document {
        &mut self.inner
    }

    pub(crate) fn page_id(&self, index: usize) -> Result<ObjectId> {
        self.page_ids
            .get(index)
            .copied()
            .ok_or(BookletError::PageOutOfRange {
                index,
                count: self.page_ids.len(),
            })
    }

    /// Size and rotation of a page
    pub fn page(&self, index: usize) -> Result<PageGeometry> {
        Ok(page_geometry(&self.inner, self.page_id(index)?))
    }

    /// Decoded content stream of a page
    pub fn page_content(&self, index: usize) -> Result<Content> {
        let bytes = self.page_content_bytes(index)?;
        Ok(Content::decode(&bytes)?)
    }

    /// Content stream bytes of a page, all parts joined
    pub(crate) fn page_content_bytes(&self, index: usize) -> Result<Vec<u8>> {
        page_content_bytes(&self.inner, self.page_id(index)?)
    }

    /// Effective resource dictionary of a page (inherited if needed)
    pub fn page_resources(&self, index: usize) -> Result<Option<&Dictionary>> {
        Ok(page_resources(&self.inner, self.page_id(index)?))
    }

    /// Append a blank page and return its index
    pub fn new_page(&mut self, width: f32, height: f32) -> Result<usize> {
        let content_id = self
            .inner
            .add_object(Stream::new(Dictionary::new(), Vec::new()));

        let page_dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(width),
                    Object::Real(height),
                ]),
            ),
            ("Contents", Object::Reference(content_id)),
            ("Resources", Object::Dictionary(Dictionary::new())),
        ]);

        self.append_page_dict(page_dict)
    }

    /// Append a fully built page dictionary; `/Parent` is set here
    pub(crate) fn append_page_dict(&mut self, mut page_dict: Dictionary) -> Result<usize> {
        let pages_id = self.root_pages_id()?;
        page_dict.set("Parent", Object::Reference(pages_id));
        let page_id = self.inner.add_object(page_dict);
        self.attach_page(page_id)?;
        Ok(self.page_ids.len() - 1)
    }

    /// Copy pages `first..=last` of `from` to the end of this document.
    ///
    /// Inherited attributes are written onto each copy, so the copied pages
    /// keep their geometry regardless of the destination page tree. The
    /// source document is left untouched.
    pub fn insert_pages(&mut self, from: &PdfDocument, first: usize, last: usize) -> Result<()> {
        if first > last || last >= from.page_count() {
            return Err(BookletError::PageOutOfRange {
                index: last.max(first),
                count: from.page_count(),
            });
        }

        // Reserve every page's ID up front so links between pages of the
        // range resolve to the copies instead of `null`
        let mut cache = CopyCache::new();
        let mut reserved = Vec::with_capacity(last - first + 1);
        for index in first..=last {
            let source_id = from.page_id(index)?;
            let new_id = self.inner.new_object_id();
            cache.insert(source_id, new_id);
            reserved.push((source_id, new_id));
        }
        for (source_id, new_id) in reserved {
            self.import_page(from, source_id, new_id, &mut cache)?;
        }
        Ok(())
    }

    /// Copy every page of `from` to the end of this document
    pub fn append_document(&mut self, from: &PdfDocument) -> Result<()> {
        if from.is_empty() {
            return Ok(());
        }
        self.insert_pages(from, 0, from.page_count() - 1)
    }

    fn import_page(
        &mut self,
        from: &PdfDocument,
        source_id: ObjectId,
        new_id: ObjectId,
        cache: &mut CopyCache,
    ) -> Result<()> {
        let mut page_dict = from.inner.get_dictionary(source_id)?.clone();
        page_dict.remove(b"Parent");
        for key in INHERITABLE_KEYS {
            if !page_dict.has(key) {
                if let Some(value) = inherited_attribute(&from.inner, source_id, key) {
                    page_dict.set(key.to_vec(), value.clone());
                }
            }
        }

        let mut copied = copy_dictionary(&mut self.inner, &from.inner, &page_dict, cache)?;
        copied.set("Parent", Object::Reference(self.root_pages_id()?));
        self.inner.objects.insert(new_id, Object::Dictionary(copied));
        self.attach_page(new_id)
    }

    /// Stamp Helvetica text onto an existing page.
    ///
    /// `(x, y)` is the baseline origin in page space. The page's own content
    /// is wrapped in `q`/`Q` so its graphics state cannot leak into the text.
    pub fn insert_text(
        &mut self,
        index: usize,
        x: f32,
        y: f32,
        text: &str,
        font_size: f32,
    ) -> Result<()> {
        let page_id = self.page_id(index)?;
        let geometry = self.page(index)?;

        let font_id = self.inner.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Font".to_vec())),
            ("Subtype", Object::Name(b"Type1".to_vec())),
            ("BaseFont", Object::Name(b"Helvetica".to_vec())),
        ]));
        let font_name = format!("FStamp{}", font_id.0);

        let ops = format!(
            "Q\nq BT /{} {} Tf 0 g {} {} Td ({}) Tj ET Q\n",
            font_name,
            font_size,
            x + geometry.origin.0,
            y + geometry.origin.1,
            escape_pdf_string(text)
        );
        let open_id = self
            .inner
            .add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
        let stamp_id = self
            .inner
            .add_object(Stream::new(Dictionary::new(), ops.into_bytes()));

        let (contents, resources) = {
            let page_dict = self.inner.get_dictionary(page_id)?;
            let mut contents = vec![Object::Reference(open_id)];
            match page_dict.get(b"Contents") {
                Ok(Object::Array(arr)) => contents.extend(arr.iter().cloned()),
                Ok(Object::Reference(id)) => match self.inner.get_object(*id) {
                    Ok(Object::Array(arr)) => contents.extend(arr.iter().cloned()),
                    _ => contents.push(Object::Reference(*id)),
                },
                _ => {}
            }
            contents.push(Object::Reference(stamp_id));

            let mut resources = page_resources(&self.inner, page_id)
                .cloned()
                .unwrap_or_default();
            let mut fonts = resources
                .get(b"Font")
                .ok()
                .and_then(|obj| dictionary_of(&self.inner, obj))
                .cloned()
                .unwrap_or_default();
            fonts.set(font_name.as_bytes(), Object::Reference(font_id));
            resources.set("Font", Object::Dictionary(fonts));
            (contents, resources)
        };

        let page_dict = self.inner.get_dictionary_mut(page_id)?;
        page_dict.set("Contents", Object::Array(contents));
        page_dict.set("Resources", Object::Dictionary(resources));
        Ok(())
    }

    fn root_pages_id(&self) -> Result<ObjectId> {
        let catalog_id = self.inner.trailer.get(b"Root")?.as_reference()?;
        let catalog = self.inner.get_dictionary(catalog_id)?;
        Ok(catalog.get(b"Pages")?.as_reference()?)
    }

    /// Hang a page object under the root page tree node
    fn attach_page(&mut self, page_id: ObjectId) -> Result<()> {
        let pages_id = self.root_pages_id()?;
        let pages_dict = self
            .inner
            .get_dictionary_mut(pages_id)
            .map_err(|_| BookletError::Malformed("Pages root is not a dictionary".to_string()))?;

        let count = pages_dict
            .get(b"Count")
            .and_then(Object::as_i64)
            .unwrap_or(0);
        if !matches!(pages_dict.get(b"Kids"), Ok(Object::Array(_))) {
            pages_dict.set("Kids", Object::Array(Vec::new()));
        }
        if let Ok(Object::Array(kids)) = pages_dict.get_mut(b"Kids") {
            kids.push(Object::Reference(page_id));
        }
        pages_dict.set("Count", Object::Integer(count + 1));

        self.page_ids.push(page_id);
        Ok(())
    }
}

/// Escape a string for use inside a PDF literal string
fn escape_pdf_string(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '(' | ')' | '\\' => {
                escaped.push('\\');
                escaped.push(ch);
            }
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_document_is_empty() {
        let doc = PdfDocument::new();
        assert_eq!(doc.page_count(), 0);
        assert!(doc.is_empty());
    }

    #[test]
    fn test_new_page_appends_with_given_size() {
        let mut doc = PdfDocument::new();
        assert_eq!(doc.new_page(300.0, 400.0).unwrap(), 0);
        assert_eq!(doc.new_page(500.0, 200.0).unwrap(), 1);

        let page = doc.page(1).unwrap();
        assert_eq!((page.width, page.height), (500.0, 200.0));
        assert_eq!(doc.inner().get_pages().len(), 2);
    }

    #[test]
    fn test_page_out_of_range() {
        let doc = PdfDocument::new();
        match doc.page(3) {
            Err(BookletError::PageOutOfRange { index: 3, count: 0 }) => {}
            other => panic!("Expected PageOutOfRange, got {:?}", other),
        }
    }

    #[test]
    fn test_insert_pages_copies_range_without_touching_source() {
        let mut source = PdfDocument::new();
        for width in [100.0, 200.0, 300.0, 400.0] {
            source.new_page(width, 500.0).unwrap();
        }

        let mut dest = PdfDocument::new();
        dest.insert_pages(&source, 1, 2).unwrap();

        assert_eq!(dest.page_count(), 2);
        assert_eq!(dest.page(0).unwrap().width, 200.0);
        assert_eq!(dest.page(1).unwrap().width, 300.0);
        assert_eq!(source.page_count(), 4);
    }

    #[test]
    fn test_links_between_copied_pages_are_kept() {
        let mut source = PdfDocument::new();
        source.new_page(100.0, 100.0).unwrap();
        source.new_page(100.0, 100.0).unwrap();

        // Page 1 links forward to page 2
        let target = source.page_id(1).unwrap();
        let link = source.inner.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Annot".to_vec())),
            ("Subtype", Object::Name(b"Link".to_vec())),
            (
                "Dest",
                Object::Array(vec![Object::Reference(target), Object::Name(b"Fit".to_vec())]),
            ),
        ]));
        let first = source.page_id(0).unwrap();
        source
            .inner
            .get_dictionary_mut(first)
            .unwrap()
            .set("Annots", Object::Array(vec![Object::Reference(link)]));

        let mut dest = PdfDocument::new();
        dest.insert_pages(&source, 0, 1).unwrap();

        let copied_first = dest.inner.get_dictionary(dest.page_id(0).unwrap()).unwrap();
        let annots = copied_first.get(b"Annots").unwrap().as_array().unwrap();
        let link = dest
            .inner
            .get_dictionary(annots[0].as_reference().unwrap())
            .unwrap();
        let dest_array = link.get(b"Dest").unwrap().as_array().unwrap();
        assert_eq!(
            dest_array[0].as_reference().unwrap(),
            dest.page_id(1).unwrap()
        );
    }

    #[test]
    fn test_insert_pages_rejects_bad_range() {
        let mut source = PdfDocument::new();
        source.new_page(100.0, 100.0).unwrap();
        let mut dest = PdfDocument::new();
        assert!(dest.insert_pages(&source, 0, 1).is_err());
        assert!(dest.insert_pages(&source, 1, 0).is_err());
    }

    #[test]
    fn test_escape_pdf_string() {
        assert_eq!(escape_pdf_string("a(b)\\"), "a\\(b\\)\\\\");
    }
}
