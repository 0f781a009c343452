//! Content stream scanner
//!
//! Walks a page's content stream and records where marks land: one rectangle
//! per text object, one per placed image and one per painted path. Only the
//! geometry matters here, so glyph widths are estimated from the font size
//! instead of read from font programs.

use crate::constants::{
    ESTIMATED_CHAR_WIDTH_RATIO, MAX_FORM_DEPTH, TEXT_ASCENT_RATIO, TEXT_DESCENT_RATIO,
};
use crate::document::{PdfDocument, dictionary_of, extract_number, resolve};
use crate::geometry::{Matrix, Rect};
use crate::types::Result;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream};

/// Rectangles of everything drawn on a page, in page space
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageContent {
    pub text_blocks: Vec<Rect>,
    pub image_blocks: Vec<Rect>,
    pub drawings: Vec<Rect>,
}

impl PageContent {
    pub fn is_empty(&self) -> bool {
        self.text_blocks.is_empty() && self.image_blocks.is_empty() && self.drawings.is_empty()
    }

    /// Every collected rectangle
    pub fn all_rects(&self) -> impl Iterator<Item = &Rect> {
        self.text_blocks
            .iter()
            .chain(&self.image_blocks)
            .chain(&self.drawings)
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        for rect in self
            .text_blocks
            .iter_mut()
            .chain(self.image_blocks.iter_mut())
            .chain(self.drawings.iter_mut())
        {
            *rect = rect.translate(dx, dy);
        }
    }
}

/// Scan one page of a document.
///
/// Rectangles are returned in page space (page box lower-left at the origin).
pub fn scan_page(doc: &PdfDocument, index: usize) -> Result<PageContent> {
    let geometry = doc.page(index)?;
    let content = doc.page_content(index)?;
    let resources = doc.page_resources(index)?;

    let mut scanner = Scanner {
        doc: doc.inner(),
        found: PageContent::default(),
    };
    scanner.run(&content.operations, resources, Matrix::IDENTITY, 0);

    let mut found = scanner.found;
    found.translate(-geometry.origin.0, -geometry.origin.1);
    Ok(found)
}

/// Text state parameters that live in the graphics state
#[derive(Debug, Clone, Copy)]
struct TextParams {
    font_size: f32,
    char_spacing: f32,
    word_spacing: f32,
    horizontal_scale: f32,
    leading: f32,
}

impl Default for TextParams {
    fn default() -> Self {
        Self {
            font_size: 0.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scale: 1.0,
            leading: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct GraphicsState {
    ctm: Matrix,
    text: TextParams,
}

/// State of one `BT` … `ET` object
#[derive(Debug, Default)]
struct TextObject {
    matrix: Matrix,
    line_matrix: Matrix,
    bounds: Option<Rect>,
}

impl TextObject {
    fn set_matrix(&mut self, m: Matrix) {
        self.matrix = m;
        self.line_matrix = m;
    }

    fn next_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix = Matrix::translation(tx, ty).then(&self.line_matrix);
        self.matrix = self.line_matrix;
    }

    /// Record a run of glyphs and advance past it
    fn show(&mut self, bytes: &[u8], state: &GraphicsState) {
        if bytes.is_empty() {
            return;
        }
        let params = &state.text;
        let glyphs = bytes.len() as f32;
        let spaces = bytes.iter().filter(|&&b| b == b' ').count() as f32;
        let advance = (glyphs * params.font_size * ESTIMATED_CHAR_WIDTH_RATIO
            + glyphs * params.char_spacing
            + spaces * params.word_spacing)
            * params.horizontal_scale;

        let extent = Rect::new(
            advance.min(0.0),
            -params.font_size * TEXT_DESCENT_RATIO,
            advance.max(0.0),
            params.font_size * TEXT_ASCENT_RATIO,
        );
        let placed = self.matrix.then(&state.ctm).transform_rect(&extent);
        if placed.is_well_formed() {
            self.bounds = Some(match self.bounds {
                Some(b) => b.union(&placed),
                None => placed,
            });
        }
        self.shift(advance);
    }

    fn shift(&mut self, tx: f32) {
        self.matrix = Matrix::translation(tx, 0.0).then(&self.matrix);
    }
}

struct Scanner<'a> {
    doc: &'a Document,
    found: PageContent,
}

impl<'a> Scanner<'a> {
    fn run(
        &mut self,
        operations: &[Operation],
        resources: Option<&'a Dictionary>,
        base_ctm: Matrix,
        depth: usize,
    ) {
        let mut state = GraphicsState {
            ctm: base_ctm,
            ..Default::default()
        };
        let mut saved: Vec<GraphicsState> = Vec::new();
        let mut path: Vec<(f32, f32)> = Vec::new();
        let mut text: Option<TextObject> = None;

        for op in operations {
            let nums: Vec<f32> = op.operands.iter().filter_map(extract_number).collect();

            match op.operator.as_str() {
                "q" => saved.push(state),
                "Q" => {
                    if let Some(previous) = saved.pop() {
                        state = previous;
                    }
                }
                "cm" => {
                    if let Some(m) = matrix_from(&nums) {
                        state.ctm = m.then(&state.ctm);
                    }
                }

                // Path construction
                "m" | "l" if nums.len() >= 2 => path.push(state.ctm.apply(nums[0], nums[1])),
                "c" if nums.len() >= 6 => {
                    for pair in nums[..6].chunks(2) {
                        path.push(state.ctm.apply(pair[0], pair[1]));
                    }
                }
                "v" | "y" if nums.len() >= 4 => {
                    for pair in nums[..4].chunks(2) {
                        path.push(state.ctm.apply(pair[0], pair[1]));
                    }
                }
                "re" if nums.len() >= 4 => {
                    let rect = Rect::from_origin_size(nums[0], nums[1], nums[2], nums[3]);
                    for (x, y) in rect.corners() {
                        path.push(state.ctm.apply(x, y));
                    }
                }

                // Path painting
                "S" | "s" | "f" | "F" | "f*" | "B" | "B*" | "b" | "b*" => {
                    if let Some(rect) = Rect::bounding(path.drain(..)) {
                        if rect.is_well_formed() {
                            self.found.drawings.push(rect);
                        }
                    }
                }
                // Clipping-only path
                "n" => path.clear(),

                // Text objects
                "BT" => text = Some(TextObject::default()),
                "ET" => {
                    if let Some(bounds) = text.take().and_then(|t| t.bounds) {
                        self.found.text_blocks.push(bounds);
                    }
                }
                "Tf" => {
                    if let Some(&size) = nums.first() {
                        state.text.font_size = size;
                    }
                }
                "Tc" => state.text.char_spacing = nums.first().copied().unwrap_or(0.0),
                "Tw" => state.text.word_spacing = nums.first().copied().unwrap_or(0.0),
                "Tz" => state.text.horizontal_scale = nums.first().copied().unwrap_or(100.0) / 100.0,
                "TL" => state.text.leading = nums.first().copied().unwrap_or(0.0),
                "Td" | "TD" if nums.len() >= 2 => {
                    if op.operator == "TD" {
                        state.text.leading = -nums[1];
                    }
                    if let Some(t) = text.as_mut() {
                        t.next_line(nums[0], nums[1]);
                    }
                }
                "Tm" => {
                    if let (Some(t), Some(m)) = (text.as_mut(), matrix_from(&nums)) {
                        t.set_matrix(m);
                    }
                }
                "T*" => {
                    if let Some(t) = text.as_mut() {
                        t.next_line(0.0, -state.text.leading);
                    }
                }
                "Tj" | "'" | "\"" => {
                    if op.operator == "\"" && nums.len() >= 2 {
                        state.text.word_spacing = nums[0];
                        state.text.char_spacing = nums[1];
                    }
                    if let Some(t) = text.as_mut() {
                        if op.operator != "Tj" {
                            t.next_line(0.0, -state.text.leading);
                        }
                        if let Some(bytes) = op.operands.iter().rev().find_map(string_bytes) {
                            t.show(bytes, &state);
                        }
                    }
                }
                "TJ" => {
                    let items = op.operands.first().and_then(|o| o.as_array().ok());
                    if let (Some(t), Some(items)) = (text.as_mut(), items) {
                        for item in items {
                            if let Some(bytes) = string_bytes(item) {
                                t.show(bytes, &state);
                            } else if let Some(adjust) = extract_number(item) {
                                t.shift(
                                    -adjust / 1000.0
                                        * state.text.font_size
                                        * state.text.horizontal_scale,
                                );
                            }
                        }
                    }
                }

                // Images and forms
                "BI" => self.found.image_blocks.push(unit_square(&state.ctm)),
                "Do" => {
                    if let Some(name) = op.operands.first().and_then(|o| o.as_name().ok()) {
                        self.place_xobject(name, resources, &state, depth);
                    }
                }
                _ => {}
            }
        }
    }

    fn place_xobject(
        &mut self,
        name: &[u8],
        resources: Option<&'a Dictionary>,
        state: &GraphicsState,
        depth: usize,
    ) {
        let doc = self.doc;
        let stream = resources
            .and_then(|res| res.get(b"XObject").ok())
            .and_then(|obj| dictionary_of(doc, obj))
            .and_then(|xobjects| xobjects.get(name).ok())
            .and_then(|obj| stream_of(doc, obj));
        let Some(stream) = stream else {
            return;
        };

        let subtype = stream.dict.get(b"Subtype").and_then(Object::as_name).ok();
        match subtype {
            Some(b"Image") => self.found.image_blocks.push(unit_square(&state.ctm)),
            Some(b"Form") if depth < MAX_FORM_DEPTH => {
                let bytes = stream
                    .decompressed_content()
                    .unwrap_or_else(|_| stream.content.clone());
                let Ok(content) = Content::decode(&bytes) else {
                    return;
                };
                let form_matrix = stream
                    .dict
                    .get(b"Matrix")
                    .and_then(Object::as_array)
                    .ok()
                    .and_then(|arr| {
                        let nums: Vec<f32> = arr.iter().filter_map(extract_number).collect();
                        matrix_from(&nums)
                    })
                    .unwrap_or_default();
                let form_resources = stream
                    .dict
                    .get(b"Resources")
                    .ok()
                    .and_then(|obj| dictionary_of(doc, obj))
                    .or(resources);
                self.run(
                    &content.operations,
                    form_resources,
                    form_matrix.then(&state.ctm),
                    depth + 1,
                );
            }
            _ => {}
        }
    }
}

fn stream_of<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Stream> {
    resolve(doc, obj).as_stream().ok()
}

fn unit_square(ctm: &Matrix) -> Rect {
    ctm.transform_rect(&Rect::from_size(1.0, 1.0))
}

fn string_bytes(obj: &Object) -> Option<&[u8]> {
    match obj {
        Object::String(bytes, _) => Some(bytes.as_slice()),
        _ => None,
    }
}

fn matrix_from(nums: &[f32]) -> Option<Matrix> {
    match nums {
        [a, b, c, d, e, f, ..] => Some(Matrix::new(*a, *b, *c, *d, *e, *f)),
        _ => None,
    }
}
