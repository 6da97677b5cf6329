//! The font library seam.
//!
//! A [`GlyphSource`] shapes and wraps text and rasterizes individual glyphs.
//! [`CosmicGlyphSource`] delegates both to `cosmic-text`.

use std::hash::{BuildHasher, Hash};
use std::sync::{Arc, RwLock};

use clarity_core::alloc::{HashMap, RandomState};
use clarity_core::profiling::profile_function;
use cosmic_text::{Buffer, CacheKey, Metrics, Shaping, SwashCache, SwashContent};

use crate::font::{self, FontAttributes, FontSystem};
use crate::layout::{HAlign, WrapMode};

/// Passes spent narrowing the wrap width until kerned lines fit.
const KERNING_FIT_PASSES: usize = 8;

/// Opaque identity of a rasterizable glyph (font face, glyph id, size and
/// subpixel bin).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GlyphKey(u64);

impl GlyphKey {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

/// Input for shaping a string.
#[derive(Debug, Clone)]
pub struct LayoutRequest<'a> {
    pub text: &'a str,
    pub attributes: &'a FontAttributes,
    /// Font size in pixels.
    pub font_size: f32,
    /// Line advance in pixels.
    pub line_height: f32,
    pub wrap: WrapMode,
    pub align: HAlign,
    /// Extra pixels between consecutive glyphs of a line. Counts toward
    /// line breaking and alignment.
    pub kerning: f32,
    /// Width lines wrap and align within.
    pub max_width: Option<f32>,
}

/// A glyph positioned within its visual line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapedGlyph {
    pub key: GlyphKey,
    /// Pen position from the left edge of the layout.
    pub x: f32,
    /// Vertical offset from the baseline, y down.
    pub y: f32,
    pub advance: f32,
    /// Index of the visual line in [`ShapedText::lines`].
    pub line: usize,
}

/// Metrics of one visual line, y measured downward from the layout top.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapedLine {
    pub top: f32,
    pub baseline: f32,
    pub height: f32,
    pub width: f32,
}

/// Result of shaping a string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapedText {
    pub glyphs: Vec<ShapedGlyph>,
    pub lines: Vec<ShapedLine>,
}

impl ShapedText {
    /// Glyphs of one visual line.
    pub fn line_glyphs(&self, line: usize) -> impl Iterator<Item = &ShapedGlyph> {
        self.glyphs.iter().filter(move |glyph| glyph.line == line)
    }
}

/// Coverage bitmap of a rasterized glyph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphBitmap {
    pub width: u32,
    pub height: u32,
    /// Horizontal offset from the pen position to the bitmap's left edge.
    pub left: i32,
    /// Distance from the baseline up to the bitmap's top edge.
    pub top: i32,
    /// One byte of coverage per pixel, row-major.
    pub coverage: Vec<u8>,
}

impl GlyphBitmap {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Turn coverage into fully on or off pixels at `cutoff`.
    pub fn threshold(&mut self, cutoff: u8) {
        for value in self.coverage.iter_mut() {
            *value = if *value >= cutoff { u8::MAX } else { 0 };
        }
    }
}

/// Shaping and rasterization backend for a font.
pub trait GlyphSource {
    /// Shape, wrap and align `request.text` into positioned glyphs.
    fn layout(&mut self, request: &LayoutRequest<'_>) -> ShapedText;

    /// Rasterize a glyph previously returned from [`GlyphSource::layout`].
    ///
    /// Returns `None` for unknown keys or glyphs the backend cannot draw.
    fn rasterize(&mut self, key: GlyphKey) -> Option<GlyphBitmap>;
}

/// [`GlyphSource`] backed by `cosmic-text` shaping and its swash rasterizer.
pub struct CosmicGlyphSource {
    font_system: Arc<RwLock<cosmic_text::FontSystem>>,
    swash_cache: SwashCache,
    cache_keys: HashMap<GlyphKey, CacheKey>,
    hasher: RandomState,
}

impl CosmicGlyphSource {
    pub fn new(font_system: &FontSystem) -> Self {
        Self {
            font_system: font_system.inner(),
            swash_cache: SwashCache::new(),
            cache_keys: HashMap::new(),
            hasher: RandomState::with_seeds(0x636c, 0x6172, 0x6974, 0x7900),
        }
    }

    fn key_for(&mut self, cache_key: CacheKey) -> GlyphKey {
        let mut hasher = self.hasher.build_hasher();
        cache_key.hash(&mut hasher);
        let key = GlyphKey(std::hash::Hasher::finish(&hasher));
        self.cache_keys.insert(key, cache_key);
        key
    }
}

/// One visual line as shaped by cosmic-text, before kerning and alignment.
struct ShapedRun {
    top: f32,
    baseline: f32,
    height: f32,
    width: f32,
    glyphs: Vec<(CacheKey, i32, i32, f32)>,
}

impl ShapedRun {
    fn kerned_width(&self, kerning: f32) -> f32 {
        self.width + kerning * self.glyphs.len().saturating_sub(1) as f32
    }
}

/// How far the widest breakable line overshoots `limit` once kerned.
fn kerned_overflow(runs: &[ShapedRun], kerning: f32, limit: f32) -> f32 {
    runs.iter()
        .filter(|run| run.glyphs.len() > 1)
        .map(|run| run.kerned_width(kerning) - limit)
        .fold(0.0, f32::max)
}

fn shape_runs(
    font_system: &mut cosmic_text::FontSystem,
    request: &LayoutRequest<'_>,
    wrap_width: Option<f32>,
) -> Vec<ShapedRun> {
    let metrics = Metrics::new(request.font_size, request.line_height);
    let mut buffer = Buffer::new(font_system, metrics);
    buffer.set_wrap(font_system, request.wrap.to_cosmic());
    buffer.set_size(font_system, wrap_width, None);
    buffer.set_text(
        font_system,
        request.text,
        request.attributes.to_cosmic(),
        Shaping::Advanced,
    );
    buffer.shape_until_scroll(font_system, false);

    buffer
        .layout_runs()
        .map(|run| ShapedRun {
            top: run.line_top,
            baseline: run.line_y,
            height: run.line_height,
            width: run.line_w,
            glyphs: run
                .glyphs
                .iter()
                .map(|glyph| {
                    let placed = glyph.physical((0.0, 0.0), 1.0);
                    (placed.cache_key, placed.x, placed.y, glyph.w)
                })
                .collect(),
        })
        .collect()
}

impl GlyphSource for CosmicGlyphSource {
    fn layout(&mut self, request: &LayoutRequest<'_>) -> ShapedText {
        profile_function!();

        let font_system = Arc::clone(&self.font_system);
        let mut font_system = font::lock(&font_system);

        let mut runs = shape_runs(&mut font_system, request, request.max_width);
        let fit_limit = request
            .max_width
            .filter(|_| request.kerning > 0.0 && request.wrap.wraps());
        if let Some(limit) = fit_limit {
            // cosmic-text breaks lines without the extra spacing, so the
            // wrap width shrinks until every breakable line fits once kerned.
            let mut width = limit;
            let mut overflow = kerned_overflow(&runs, request.kerning, limit);
            for _ in 0..KERNING_FIT_PASSES {
                if overflow <= 0.0 {
                    break;
                }
                width = (width - overflow).max(request.font_size);
                let narrowed = shape_runs(&mut font_system, request, Some(width));
                let narrowed_overflow = kerned_overflow(&narrowed, request.kerning, limit);
                if narrowed_overflow >= overflow {
                    break;
                }
                runs = narrowed;
                overflow = narrowed_overflow;
            }
        }
        drop(font_system);

        let widest = runs
            .iter()
            .map(|run| run.kerned_width(request.kerning))
            .fold(0.0, f32::max);
        let align_width = request.max_width.unwrap_or(widest);

        let mut shaped = ShapedText::default();
        for (line, run) in runs.into_iter().enumerate() {
            let width = run.kerned_width(request.kerning);
            let offset = request.align.offset(align_width, width);
            shaped.lines.push(ShapedLine {
                top: run.top,
                baseline: run.baseline,
                height: run.height,
                width,
            });
            for (i, (cache_key, x, y, advance)) in run.glyphs.into_iter().enumerate() {
                let key = self.key_for(cache_key);
                shaped.glyphs.push(ShapedGlyph {
                    key,
                    x: offset + x as f32 + request.kerning * i as f32,
                    y: y as f32,
                    advance,
                    line,
                });
            }
        }
        shaped
    }

    fn rasterize(&mut self, key: GlyphKey) -> Option<GlyphBitmap> {
        profile_function!();

        let cache_key = *self.cache_keys.get(&key)?;
        let mut font_system = font::lock(&self.font_system);
        let image = self
            .swash_cache
            .get_image(&mut font_system, cache_key)
            .as_ref()?;

        let coverage = match image.content {
            SwashContent::Mask => image.data.clone(),
            SwashContent::Color => image.data.chunks_exact(4).map(|px| px[3]).collect(),
            SwashContent::SubpixelMask => image
                .data
                .chunks_exact(4)
                .map(|px| px[0].max(px[1]).max(px[2]))
                .collect(),
        };

        Some(GlyphBitmap {
            width: image.placement.width,
            height: image.placement.height,
            left: image.placement.left,
            top: image.placement.top,
            coverage,
        })
    }
}
