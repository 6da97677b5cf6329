//! Test utilities for the Clarity crates.
//!
//! Shaping real fonts depends on what is installed on the machine, so tests
//! use [`MockGlyphSource`]: a monospace font whose glyphs are solid squares.
//! Every call is recorded in a shared [`MockGlyphLog`] that stays readable
//! after the source has been moved into a font.
//!
//! # Example
//!
//! ```rust
//! use clarity_test_utils::mock_font;
//! use clarity_text::StringLayout;
//!
//! let (font, log) = mock_font(16);
//! let formatted = font.format(&StringLayout::new("hi"));
//!
//! assert_eq!(formatted.shaped.glyphs.len(), 2);
//! assert_eq!(log.layout_count(), 1);
//! assert_eq!(log.rasterize_count(), 2);
//! ```

pub mod mock_glyphs;

pub use mock_glyphs::{GlyphCall, MockGlyphLog, MockGlyphSource};

use clarity_text::{FontDescriptor, FontHandle};

/// Family name reported by mock fonts.
pub const MOCK_FAMILY: &str = "Mock Mono";

/// A mock font at `point_size` (72 dpi, scale 1) whose glyphs are squares of
/// `point_size / 2` pixels.
pub fn mock_font(point_size: u32) -> (FontHandle, MockGlyphLog) {
    mock_font_with(FontDescriptor::new(MOCK_FAMILY, point_size))
}

/// A mock font with a custom descriptor. Glyph squares are half the point
/// size.
pub fn mock_font_with(descriptor: FontDescriptor) -> (FontHandle, MockGlyphLog) {
    let source = MockGlyphSource::new((descriptor.point_size / 2).max(1));
    let log = source.log();
    (FontHandle::new(descriptor, Box::new(source)), log)
}
