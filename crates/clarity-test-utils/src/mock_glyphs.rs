//! Deterministic glyph source for tests.

use std::cell::RefCell;
use std::rc::Rc;

use clarity_text::{
    GlyphBitmap, GlyphKey, GlyphSource, LayoutRequest, ShapedGlyph, ShapedLine,
    ShapedText, WrapMode,
};

/// Records a glyph source call for verification in tests.
#[derive(Debug, Clone, PartialEq)]
pub enum GlyphCall {
    Layout { text: String, max_width: Option<f32> },
    Rasterize { key: GlyphKey },
}

/// Shared record of the calls made to a [`MockGlyphSource`].
#[derive(Debug, Clone, Default)]
pub struct MockGlyphLog {
    calls: Rc<RefCell<Vec<GlyphCall>>>,
}

impl MockGlyphLog {
    pub fn calls(&self) -> Vec<GlyphCall> {
        self.calls.borrow().clone()
    }

    pub fn layout_count(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| matches!(call, GlyphCall::Layout { .. }))
            .count()
    }

    pub fn rasterize_count(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| matches!(call, GlyphCall::Rasterize { .. }))
            .count()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }

    fn record(&self, call: GlyphCall) {
        self.calls.borrow_mut().push(call);
    }
}

/// Monospace glyph source: every character advances by `glyph_size` pixels
/// and non-whitespace characters rasterize to a solid `glyph_size` square
/// sitting on the baseline.
///
/// Wrapping follows the request's wrap mode when a width is given; word
/// wrapping breaks at spaces. Kerning is added between consecutive glyphs
/// before lines are broken and aligned.
#[derive(Debug)]
pub struct MockGlyphSource {
    glyph_size: u32,
    edge_coverage: u8,
    log: MockGlyphLog,
}

impl MockGlyphSource {
    pub fn new(glyph_size: u32) -> Self {
        Self {
            glyph_size,
            edge_coverage: u8::MAX,
            log: MockGlyphLog::default(),
        }
    }

    /// Give the border pixels of every glyph square partial coverage.
    pub fn with_edge_coverage(mut self, coverage: u8) -> Self {
        self.edge_coverage = coverage;
        self
    }

    pub fn glyph_size(&self) -> u32 {
        self.glyph_size
    }

    /// Handle to the call log, valid after the source is boxed.
    pub fn log(&self) -> MockGlyphLog {
        self.log.clone()
    }

    /// Key of `ch` at `font_size` pixels.
    pub fn key(ch: char, font_size: f32) -> GlyphKey {
        GlyphKey::new(((font_size.to_bits() as u64) << 32) | ch as u64)
    }

    fn char_of(key: GlyphKey) -> Option<char> {
        char::from_u32((key.as_u64() & 0xffff_ffff) as u32)
    }

    /// Width of `count` glyphs laid out on one line.
    fn line_width(&self, count: usize, kerning: f32) -> f32 {
        count as f32 * self.glyph_size as f32 + count.saturating_sub(1) as f32 * kerning
    }

    /// Break one paragraph into visual lines of characters.
    fn wrap_paragraph(&self, paragraph: &str, request: &LayoutRequest<'_>) -> Vec<Vec<char>> {
        let limit = match request.max_width {
            Some(width) if request.wrap.wraps() => width,
            _ => return vec![paragraph.chars().collect()],
        };
        let fits = |count: usize| self.line_width(count, request.kerning) <= limit;

        let mut lines: Vec<Vec<char>> = vec![Vec::new()];
        match request.wrap {
            WrapMode::Word | WrapMode::WordClip => {
                for word in paragraph.split_inclusive(' ') {
                    let word: Vec<char> = word.chars().collect();
                    let trimmed = word.iter().filter(|c| **c != ' ').count();
                    let current = lines.last().map_or(0, Vec::len);
                    if current > 0 && !fits(current + trimmed) {
                        lines.push(Vec::new());
                    }
                    if let Some(line) = lines.last_mut() {
                        line.extend(word);
                    }
                }
            }
            _ => {
                for ch in paragraph.chars() {
                    let current = lines.last().map_or(0, Vec::len);
                    if current > 0 && !fits(current + 1) {
                        lines.push(Vec::new());
                    }
                    if let Some(line) = lines.last_mut() {
                        line.push(ch);
                    }
                }
            }
        }
        lines
    }
}

impl GlyphSource for MockGlyphSource {
    fn layout(&mut self, request: &LayoutRequest<'_>) -> ShapedText {
        self.log.record(GlyphCall::Layout {
            text: request.text.to_string(),
            max_width: request.max_width,
        });

        let advance = self.glyph_size as f32;
        let visual_lines: Vec<Vec<char>> = request
            .text
            .split('\n')
            .flat_map(|paragraph| self.wrap_paragraph(paragraph, request))
            .collect();
        if request.text.is_empty() {
            return ShapedText::default();
        }

        let widest = visual_lines
            .iter()
            .map(|line| self.line_width(line.len(), request.kerning))
            .fold(0.0, f32::max);
        let align_width = request.max_width.unwrap_or(widest);

        let mut shaped = ShapedText::default();
        for (index, chars) in visual_lines.iter().enumerate() {
            let width = self.line_width(chars.len(), request.kerning);
            let offset = request.align.offset(align_width, width);
            let top = index as f32 * request.line_height;
            shaped.lines.push(ShapedLine {
                top,
                baseline: top + request.line_height * 0.8,
                height: request.line_height,
                width,
            });
            for (i, ch) in chars.iter().enumerate() {
                shaped.glyphs.push(ShapedGlyph {
                    key: Self::key(*ch, request.font_size),
                    x: offset + i as f32 * (advance + request.kerning),
                    y: 0.0,
                    advance,
                    line: index,
                });
            }
        }
        shaped
    }

    fn rasterize(&mut self, key: GlyphKey) -> Option<GlyphBitmap> {
        self.log.record(GlyphCall::Rasterize { key });

        let ch = Self::char_of(key)?;
        if ch.is_whitespace() {
            return Some(GlyphBitmap {
                width: 0,
                height: 0,
                left: 0,
                top: 0,
                coverage: Vec::new(),
            });
        }
        let size = self.glyph_size;
        let coverage = (0..size)
            .flat_map(|y| (0..size).map(move |x| (x, y)))
            .map(|(x, y)| {
                let edge = x == 0 || y == 0 || x + 1 == size || y + 1 == size;
                if edge { self.edge_coverage } else { u8::MAX }
            })
            .collect();
        Some(GlyphBitmap {
            width: size,
            height: size,
            left: 0,
            top: size as i32,
            coverage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clarity_text::{FontAttributes, HAlign};

    fn request<'a>(
        text: &'a str,
        attributes: &'a FontAttributes,
        wrap: WrapMode,
        max_width: Option<f32>,
    ) -> LayoutRequest<'a> {
        LayoutRequest {
            text,
            attributes,
            font_size: 16.0,
            line_height: 20.0,
            wrap,
            align: HAlign::Left,
            kerning: 0.0,
            max_width,
        }
    }

    #[test]
    fn test_lines_split_on_newline() {
        let attributes = FontAttributes::default();
        let mut source = MockGlyphSource::new(8);
        let shaped = source.layout(&request("ab\ncde", &attributes, WrapMode::NoWrap, None));

        assert_eq!(shaped.lines.len(), 2);
        assert_eq!(shaped.lines[1].top, 20.0);
        assert_eq!(shaped.lines[1].width, 24.0);
        assert_eq!(shaped.line_glyphs(1).count(), 3);
    }

    #[test]
    fn test_word_wrap_breaks_at_spaces() {
        let attributes = FontAttributes::default();
        let mut source = MockGlyphSource::new(10);
        let shaped = source.layout(&request(
            "aaa bbb ccc",
            &attributes,
            WrapMode::Word,
            Some(75.0),
        ));

        assert_eq!(shaped.lines.len(), 2);
        assert_eq!(shaped.line_glyphs(0).count(), 8);
        assert_eq!(shaped.line_glyphs(1).count(), 3);
    }

    #[test]
    fn test_kerning_counts_toward_wrapping() {
        let attributes = FontAttributes::default();
        let mut source = MockGlyphSource::new(8);
        let mut req = request("ab cd", &attributes, WrapMode::Word, Some(40.0));
        req.kerning = 2.0;
        let shaped = source.layout(&req);

        assert_eq!(shaped.lines.len(), 2);
        assert_eq!(shaped.lines[0].width, 28.0);
        assert_eq!(shaped.lines[1].width, 18.0);
        let second: Vec<f32> = shaped.line_glyphs(1).map(|glyph| glyph.x).collect();
        assert_eq!(second, vec![0.0, 10.0]);
    }

    #[test]
    fn test_alignment_includes_kerning() {
        let attributes = FontAttributes::default();
        let mut source = MockGlyphSource::new(8);
        let mut req = request("abcd", &attributes, WrapMode::NoWrap, Some(40.0));
        req.kerning = 2.0;
        req.align = HAlign::Right;
        let shaped = source.layout(&req);

        let last = shaped.glyphs.last().unwrap();
        assert_eq!(shaped.lines[0].width, 38.0);
        assert_eq!(last.x + last.advance, 40.0);
    }

    #[test]
    fn test_no_wrap_ignores_width() {
        let attributes = FontAttributes::default();
        let mut source = MockGlyphSource::new(10);
        let shaped = source.layout(&request("aaaaaa", &attributes, WrapMode::Clip, Some(20.0)));
        assert_eq!(shaped.lines.len(), 1);
    }

    #[test]
    fn test_whitespace_is_empty() {
        let mut source = MockGlyphSource::new(6);
        let space = source.rasterize(MockGlyphSource::key(' ', 12.0)).unwrap();
        let letter = source.rasterize(MockGlyphSource::key('x', 12.0)).unwrap();

        assert!(space.is_empty());
        assert_eq!((letter.width, letter.height, letter.top), (6, 6, 6));
        assert!(letter.coverage.iter().all(|c| *c == 255));

        let mut soft = MockGlyphSource::new(3).with_edge_coverage(90);
        let letter = soft.rasterize(MockGlyphSource::key('x', 6.0)).unwrap();
        assert_eq!(letter.coverage, vec![90, 90, 90, 90, 255, 90, 90, 90, 90]);
        assert_eq!(source.log().rasterize_count(), 2);
    }
}
