//! Sheet rendering for imposition
//!
//! A [`SheetCanvas`] collects drawing operations for one output page. Source
//! pages are wrapped in Form XObjects whose `/BBox` is the clip region, then
//! placed with a single `cm` that scales, rotates and centers them inside a
//! target region.

use crate::document::{CopyCache, PdfDocument, copy_dictionary};
use crate::geometry::{Matrix, Rect};
use crate::types::*;
use lopdf::{Dictionary, Object, ObjectId, Stream};

/// Drawing operations and resources for one output page
#[derive(Debug)]
pub(crate) struct SheetCanvas {
    width: f32,
    height: f32,
    ops: String,
    xobjects: Dictionary,
}

impl SheetCanvas {
    pub(crate) fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ops: String::new(),
            xobjects: Dictionary::new(),
        }
    }

    /// Draw page `index` of `source` into `region`, keeping proportions.
    ///
    /// `clip` is in page space; `None` shows the whole page. The page is
    /// rotated clockwise by `rotation` before it is fitted. Invalid geometry
    /// fails with [`BookletError::Placement`] before anything is written.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn draw_page(
        &mut self,
        output: &mut PdfDocument,
        source: &PdfDocument,
        index: usize,
        clip: Option<Rect>,
        region: Rect,
        rotation: Rotation,
        cache: &mut CopyCache,
    ) -> Result<()> {
        let geometry = source.page(index)?;
        let clip = clip
            .unwrap_or_else(|| geometry.rect())
            .translate(geometry.origin.0, geometry.origin.1);
        let matrix = fit_matrix(&clip, &region, rotation)?;

        let xobject_id = page_xobject(output, source, index, &clip, cache)?;
        let name = format!("P{}", self.xobjects.len());
        self.xobjects
            .set(name.as_bytes(), Object::Reference(xobject_id));

        let [a, b, c, d, e, f] = matrix.to_array();
        self.ops.push_str(&format!(
            "q {} {} {} {} {} {} cm /{} Do Q\n",
            a, b, c, d, e, f, name
        ));
        Ok(())
    }

    /// Paint a filled rectangle in the given gray level (1.0 is white)
    pub(crate) fn fill_rect(&mut self, rect: Rect, gray: f32) {
        self.ops.push_str(&format!(
            "q {} g {} {} {} {} re f Q\n",
            gray,
            rect.x0,
            rect.y0,
            rect.width(),
            rect.height()
        ));
    }

    /// Append the finished sheet to `output` and return its page index
    pub(crate) fn finish(self, output: &mut PdfDocument) -> Result<usize> {
        let content_id = output
            .inner_mut()
            .add_object(Stream::new(Dictionary::new(), self.ops.into_bytes()));

        let mut resources = Dictionary::new();
        resources.set("XObject", Object::Dictionary(self.xobjects));

        let mut page_dict = Dictionary::new();
        page_dict.set("Type", Object::Name(b"Page".to_vec()));
        page_dict.set(
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(self.width),
                Object::Real(self.height),
            ]),
        );
        page_dict.set("Contents", Object::Reference(content_id));
        page_dict.set("Resources", Object::Dictionary(resources));

        output.append_page_dict(page_dict)
    }
}

/// Matrix mapping `clip` (user space of the source page) into `region`.
///
/// The clip is rotated clockwise by `rotation`, scaled uniformly to the
/// largest size that fits and centered.
pub fn fit_matrix(clip: &Rect, region: &Rect, rotation: Rotation) -> Result<Matrix> {
    if !region.has_area() {
        return Err(BookletError::Placement(format!(
            "target region {:?} has no area",
            region
        )));
    }
    if !clip.has_area() {
        return Err(BookletError::Placement(format!(
            "clip {:?} has no area",
            clip
        )));
    }

    let (clip_w, clip_h) = (clip.width(), clip.height());
    let (shown_w, shown_h) = if rotation.swaps_axes() {
        (clip_h, clip_w)
    } else {
        (clip_w, clip_h)
    };

    let s = (region.width() / shown_w).min(region.height() / shown_h);
    if !s.is_finite() || s <= 0.0 {
        return Err(BookletError::Placement(format!("invalid scale {}", s)));
    }

    let dx = region.x0 + (region.width() - shown_w * s) / 2.0;
    let dy = region.y0 + (region.height() - shown_h * s) / 2.0;
    let (cx, cy) = (clip.x0, clip.y0);

    let matrix = match rotation {
        Rotation::None => Matrix::new(s, 0.0, 0.0, s, dx - s * cx, dy - s * cy),
        Rotation::Clockwise90 => {
            Matrix::new(0.0, -s, s, 0.0, dx - s * cy, dy + s * (clip_w + cx))
        }
        Rotation::Clockwise180 => Matrix::new(
            -s,
            0.0,
            0.0,
            -s,
            dx + s * (cx + clip_w),
            dy + s * (cy + clip_h),
        ),
        Rotation::Clockwise270 => {
            Matrix::new(0.0, s, -s, 0.0, dx + s * (cy + clip_h), dy - s * cx)
        }
    };
    Ok(matrix)
}

/// Wrap a source page into a Form XObject in `output`
fn page_xobject(
    output: &mut PdfDocument,
    source: &PdfDocument,
    index: usize,
    bbox: &Rect,
    cache: &mut CopyCache,
) -> Result<ObjectId> {
    let content = source.page_content_bytes(index)?;

    let mut xobject_dict = Dictionary::new();
    xobject_dict.set("Type", Object::Name(b"XObject".to_vec()));
    xobject_dict.set("Subtype", Object::Name(b"Form".to_vec()));
    xobject_dict.set("FormType", Object::Integer(1));
    xobject_dict.set(
        "BBox",
        Object::Array(vec![
            Object::Real(bbox.x0),
            Object::Real(bbox.y0),
            Object::Real(bbox.x1),
            Object::Real(bbox.y1),
        ]),
    );

    if let Some(resources) = source.page_resources(index)? {
        let copied = copy_dictionary(output.inner_mut(), source.inner(), resources, cache)?;
        xobject_dict.set("Resources", Object::Dictionary(copied));
    }

    Ok(output
        .inner_mut()
        .add_object(Stream::new(xobject_dict, content)))
}
