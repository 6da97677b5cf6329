use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use clarity_core::alloc::HashMap;
use clarity_core::geometry::Size;
use clarity_core::profiling::profile_function;
use clarity_render::TextureHandle;

use crate::atlas::{AtlasEntry, AtlasSubscription, GlyphAtlas};
use crate::font::{FontAttributes, FontStyle};
use crate::layout::StringLayout;
use crate::source::{GlyphKey, GlyphSource, LayoutRequest, ShapedText};

/// Line advance relative to the font's pixel size.
const LINE_HEIGHT_FACTOR: f32 = 1.2;

/// Coverage at or above which a pixel of an aliased glyph is drawn.
const ALIASED_COVERAGE_CUTOFF: u8 = 128;

/// Process-unique identity of a loaded font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontId(u64);

impl FontId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Parameters a font is created with.
#[derive(Debug, Clone, PartialEq)]
pub struct FontDescriptor {
    pub attributes: FontAttributes,
    /// Size the glyphs are rasterized at.
    pub point_size: u32,
    pub dpi: u32,
    /// Factor applied to generated geometry.
    pub scale: f32,
    /// Outline width in pixels; 0 disables the outline.
    pub outline: u32,
    pub antialias: bool,
    pub initial_atlas_size: u32,
    pub max_atlas_size: u32,
}

impl FontDescriptor {
    pub fn new(family: impl Into<String>, point_size: u32) -> Self {
        Self {
            attributes: FontAttributes::new(family),
            point_size,
            dpi: 72,
            scale: 1.0,
            outline: 0,
            antialias: true,
            initial_atlas_size: 256,
            max_atlas_size: 2048,
        }
    }

    pub fn style(mut self, style: FontStyle) -> Self {
        self.attributes.style = style;
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    pub fn scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn outline(mut self, outline: u32) -> Self {
        self.outline = outline;
        self
    }

    pub fn antialias(mut self, antialias: bool) -> Self {
        self.antialias = antialias;
        self
    }

    pub fn atlas_sizes(mut self, initial: u32, max: u32) -> Self {
        self.initial_atlas_size = initial;
        self.max_atlas_size = max;
        self
    }
}

/// Shaped text together with the atlas placement of its glyphs.
#[derive(Debug, Clone)]
pub struct FormattedText {
    pub shaped: ShapedText,
    pub entries: HashMap<GlyphKey, AtlasEntry>,
    /// Atlas dimensions the entries refer to.
    pub atlas_size: Size<u32>,
}

struct FontInner {
    id: FontId,
    descriptor: FontDescriptor,
    source: Box<dyn GlyphSource>,
    atlas: GlyphAtlas,
}

/// Shared handle to a loaded bitmap font and its glyph atlas.
#[derive(Clone)]
pub struct FontHandle(Rc<RefCell<FontInner>>);

impl FontHandle {
    pub fn new(descriptor: FontDescriptor, source: Box<dyn GlyphSource>) -> Self {
        let id = FontId::next();
        let atlas = GlyphAtlas::new(
            format!("{} {}pt atlas", descriptor.attributes.family, descriptor.point_size),
            descriptor.initial_atlas_size,
            descriptor.max_atlas_size,
            descriptor.outline,
        );
        Self(Rc::new(RefCell::new(FontInner {
            id,
            descriptor,
            source,
            atlas,
        })))
    }

    pub fn id(&self) -> FontId {
        self.0.borrow().id
    }

    pub fn ptr_eq(&self, other: &FontHandle) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn family(&self) -> String {
        self.0.borrow().descriptor.attributes.family.clone()
    }

    pub fn style(&self) -> FontStyle {
        self.0.borrow().descriptor.attributes.style
    }

    pub fn point_size(&self) -> u32 {
        self.0.borrow().descriptor.point_size
    }

    pub fn dpi(&self) -> u32 {
        self.0.borrow().descriptor.dpi
    }

    pub fn scale(&self) -> f32 {
        self.0.borrow().descriptor.scale
    }

    pub fn set_scale(&self, scale: f32) {
        self.0.borrow_mut().descriptor.scale = scale;
    }

    /// Point size after scaling, rounded to whole points.
    pub fn scaled_point_size(&self) -> u32 {
        let inner = self.0.borrow();
        (inner.descriptor.point_size as f32 * inner.descriptor.scale).round() as u32
    }

    /// Rasterization size in pixels.
    pub fn pixel_size(&self) -> f32 {
        let inner = self.0.borrow();
        inner.descriptor.point_size as f32 * inner.descriptor.dpi as f32 / 72.0
    }

    pub fn outline(&self) -> u32 {
        self.0.borrow().descriptor.outline
    }

    pub fn is_antialiased(&self) -> bool {
        self.0.borrow().descriptor.antialias
    }

    pub fn atlas_texture(&self) -> TextureHandle {
        self.0.borrow().atlas.texture()
    }

    pub fn atlas_size(&self) -> Size<u32> {
        self.0.borrow().atlas.size()
    }

    pub fn atlas_glyph_count(&self) -> usize {
        self.0.borrow().atlas.len()
    }

    pub fn is_locked(&self) -> bool {
        self.0.borrow().atlas.is_locked()
    }

    pub fn set_locked(&self, locked: bool) {
        self.0.borrow_mut().atlas.set_locked(locked);
    }

    /// Receive a queued event whenever the atlas changes.
    pub fn subscribe(&self) -> AtlasSubscription {
        self.0.borrow_mut().atlas.subscribe()
    }

    /// Number of live atlas subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.0.borrow().atlas.subscriber_count()
    }

    /// Rasterize every glyph of `characters` into the atlas.
    pub fn preload(&self, characters: &str) {
        if characters.is_empty() {
            return;
        }
        let layout = StringLayout::new(characters);
        self.format(&layout);
    }

    /// Shape `layout` and make sure all of its glyphs are in the atlas.
    ///
    /// Glyphs that cannot be added (locked or exhausted atlas) are logged and
    /// left out of [`FormattedText::entries`].
    pub fn format(&self, layout: &StringLayout) -> FormattedText {
        profile_function!();

        let pixel_size = self.pixel_size();
        let scale = self.scale();
        let mut guard = self.0.borrow_mut();
        let inner = &mut *guard;

        let request = LayoutRequest {
            text: &layout.text,
            attributes: &inner.descriptor.attributes,
            font_size: pixel_size,
            line_height: (pixel_size * LINE_HEIGHT_FACTOR).round(),
            wrap: layout.wrap,
            align: layout.h_align,
            kerning: layout.kerning as f32,
            max_width: layout.layout_width().map(|width| width / scale),
        };
        let shaped = inner.source.layout(&request);

        let mut entries = HashMap::with_capacity(shaped.glyphs.len());
        for glyph in &shaped.glyphs {
            if entries.contains_key(&glyph.key) {
                continue;
            }
            if let Some(entry) = inner.atlas.entry(glyph.key) {
                entries.insert(glyph.key, entry);
                continue;
            }
            let Some(mut bitmap) = inner.source.rasterize(glyph.key) else {
                continue;
            };
            if !inner.descriptor.antialias {
                bitmap.threshold(ALIASED_COVERAGE_CUTOFF);
            }
            match inner.atlas.insert(glyph.key, &bitmap) {
                Ok(entry) => {
                    entries.insert(glyph.key, entry);
                }
                Err(err) => {
                    tracing::warn!(
                        "Dropping glyph {:?} of font {}: {}",
                        glyph.key,
                        inner.descriptor.attributes.family,
                        err
                    );
                }
            }
        }

        // Growth moves glyphs; read final positions.
        for (key, entry) in entries.iter_mut() {
            if let Some(current) = inner.atlas.entry(*key) {
                *entry = current;
            }
        }
        inner.atlas.flush_events();

        FormattedText {
            shaped,
            entries,
            atlas_size: inner.atlas.size(),
        }
    }
}

impl fmt::Debug for FontHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.0.borrow();
        f.debug_struct("FontHandle")
            .field("id", &inner.id)
            .field("family", &inner.descriptor.attributes.family)
            .field("point_size", &inner.descriptor.point_size)
            .field("atlas_size", &inner.atlas.size())
            .finish()
    }
}
