//! Shared constants for splitting and booklet imposition
//!
//! This module centralizes magic numbers and constants used throughout
//! the pipeline.

// =============================================================================
// Unit Conversion
// =============================================================================

/// Points per centimeter (1 inch = 72 points, 1 inch = 2.54cm)
pub const POINTS_PER_CM: f32 = 72.0 / 2.54; // ≈ 28.3465

/// Convert centimeters to points
#[inline]
pub fn cm_to_pt(cm: f32) -> f32 {
    cm * POINTS_PER_CM
}

// =============================================================================
// Page Dimensions
// =============================================================================

/// Output sheet width in points (A4 landscape)
pub const SHEET_WIDTH_PT: f32 = 842.0;

/// Output sheet height in points (A4 landscape)
pub const SHEET_HEIGHT_PT: f32 = 595.0;

/// Default page width in points, used when a page carries no usable box (A4)
pub const DEFAULT_PAGE_WIDTH_PT: f32 = 595.0;

/// Default page height in points (A4)
pub const DEFAULT_PAGE_HEIGHT_PT: f32 = 842.0;

/// Default page dimensions as tuple (width, height)
pub const DEFAULT_PAGE_DIMENSIONS: (f32, f32) = (DEFAULT_PAGE_WIDTH_PT, DEFAULT_PAGE_HEIGHT_PT);

/// Pages carried by one folded sheet (two on each side)
pub const PAGES_PER_SIGNATURE: usize = 4;

// =============================================================================
// Watermark
// =============================================================================

/// Marker glyph stamped on the first imposed page
pub const WATERMARK_TEXT: &str = "*";

/// Watermark font size (points)
pub const WATERMARK_FONT_SIZE: f32 = 20.0;

/// Distance of the watermark from the top and right sheet edges (points)
pub const WATERMARK_OFFSET: f32 = 20.0;

/// Helvetica advance width of the asterisk, in 1/1000 em
pub const HELVETICA_ASTERISK_WIDTH: f32 = 389.0;

// =============================================================================
// Content Scanning
// =============================================================================

/// Approximate character width ratio for text whose font metrics are unknown
pub const ESTIMATED_CHAR_WIDTH_RATIO: f32 = 0.5;

/// Fraction of the font size above the baseline
pub const TEXT_ASCENT_RATIO: f32 = 0.8;

/// Fraction of the font size below the baseline
pub const TEXT_DESCENT_RATIO: f32 = 0.2;

/// Maximum nesting of form XObjects followed by the scanner
pub const MAX_FORM_DEPTH: usize = 8;
