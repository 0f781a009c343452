//! Geometry primitives shared by the scanner, the detector and the imposer
//!
//! All coordinates are PDF points in user space (y grows upward).

/// An axis-aligned rectangle given by its corners
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Left edge
    pub x0: f32,
    /// Bottom edge
    pub y0: f32,
    /// Right edge
    pub x1: f32,
    /// Top edge
    pub y1: f32,
}

impl Rect {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Rectangle anchored at the origin
    pub fn from_size(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// Rectangle from its bottom-left corner and size
    pub fn from_origin_size(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    /// Smallest rectangle holding every point, or `None` for no points
    pub fn bounding(points: impl IntoIterator<Item = (f32, f32)>) -> Option<Self> {
        points.into_iter().fold(None, |acc: Option<Rect>, (x, y)| {
            Some(match acc {
                None => Rect::new(x, y, x, y),
                Some(r) => Rect::new(r.x0.min(x), r.y0.min(y), r.x1.max(x), r.y1.max(y)),
            })
        })
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Corners are ordered and finite (zero-size rectangles are well formed)
    pub fn is_well_formed(&self) -> bool {
        self.is_finite() && self.x0 <= self.x1 && self.y0 <= self.y1
    }

    /// Positive, finite area
    pub fn has_area(&self) -> bool {
        self.is_finite() && self.width() > 0.0 && self.height() > 0.0
    }

    fn is_finite(&self) -> bool {
        self.x0.is_finite() && self.y0.is_finite() && self.x1.is_finite() && self.y1.is_finite()
    }

    pub fn union(&self, other: &Rect) -> Rect {
        Rect::new(
            self.x0.min(other.x0),
            self.y0.min(other.y0),
            self.x1.max(other.x1),
            self.y1.max(other.y1),
        )
    }

    /// Grow every side by `amount`
    pub fn expand(&self, amount: f32) -> Rect {
        Rect::new(
            self.x0 - amount,
            self.y0 - amount,
            self.x1 + amount,
            self.y1 + amount,
        )
    }

    /// Clamp every edge into `[0, width]` / `[0, height]`
    pub fn clamp_to(&self, width: f32, height: f32) -> Rect {
        Rect::new(
            self.x0.max(0.0),
            self.y0.max(0.0),
            self.x1.min(width),
            self.y1.min(height),
        )
    }

    /// Shift by an offset
    pub fn translate(&self, dx: f32, dy: f32) -> Rect {
        Rect::new(self.x0 + dx, self.y0 + dy, self.x1 + dx, self.y1 + dy)
    }

    pub fn corners(&self) -> [(f32, f32); 4] {
        [
            (self.x0, self.y0),
            (self.x1, self.y0),
            (self.x1, self.y1),
            (self.x0, self.y1),
        ]
    }

    /// Whether `other` lies entirely inside this rectangle
    pub fn contains(&self, other: &Rect) -> bool {
        other.x0 >= self.x0 && other.y0 >= self.y0 && other.x1 <= self.x1 && other.y1 <= self.y1
    }
}

/// PDF affine transform `[a b c d e f]`
///
/// Maps `(x, y)` to `(a·x + c·y + e, b·x + d·y + f)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix {
    pub const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub fn translation(tx: f32, ty: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// Apply `self` first, then `next` (the order of the PDF `cm` operator:
    /// `cm` with `M` turns the CTM into `M.then(ctm)`).
    pub fn then(&self, next: &Matrix) -> Matrix {
        Matrix {
            a: self.a * next.a + self.b * next.c,
            b: self.a * next.b + self.b * next.d,
            c: self.c * next.a + self.d * next.c,
            d: self.c * next.b + self.d * next.d,
            e: self.e * next.a + self.f * next.c + next.e,
            f: self.e * next.b + self.f * next.d + next.f,
        }
    }

    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    /// Bounding box of a transformed rectangle
    pub fn transform_rect(&self, rect: &Rect) -> Rect {
        let corners = rect.corners().map(|(x, y)| self.apply(x, y));
        Rect::bounding(corners).unwrap_or(*rect)
    }

    pub fn to_array(&self) -> [f32; 6] {
        [self.a, self.b, self.c, self.d, self.e, self.f]
    }
}
