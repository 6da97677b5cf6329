//! Growable glyph atlas.
//!
//! Glyph bitmaps are packed into a single texture with a shelf packer. When a
//! glyph no longer fits, the atlas edge doubles (up to the configured
//! maximum), every cached glyph is repacked into a fresh texture and an
//! [`AtlasEvent`] is queued for every live [`AtlasSubscription`].

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use clarity_core::alloc::HashMap;
use clarity_core::geometry::Size;
use clarity_core::profiling::profile_function;
use clarity_render::{Texture, TextureFormat, TextureHandle};

use crate::error::{TextError, TextResult};
use crate::source::{GlyphBitmap, GlyphKey};

/// Empty pixels kept between packed glyphs so bilinear sampling never bleeds.
const GLYPH_PADDING: u32 = 1;

/// Location of a glyph inside the atlas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtlasEntry {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Offset from the pen position to the bitmap's left edge.
    pub left: i32,
    /// Distance from the baseline up to the bitmap's top edge.
    pub top: i32,
}

impl AtlasEntry {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Normalized `(u0, v0, u1, v1)` for an atlas of the given size.
    pub fn uv_rect(&self, atlas: Size<u32>) -> (f32, f32, f32, f32) {
        let w = atlas.width as f32;
        let h = atlas.height as f32;
        (
            self.x as f32 / w,
            self.y as f32 / h,
            (self.x + self.width) as f32 / w,
            (self.y + self.height) as f32 / h,
        )
    }
}

/// Simple shelf packer.
#[derive(Debug, Clone)]
struct ShelfPacker {
    size: u32,
    current_x: u32,
    current_y: u32,
    row_height: u32,
}

impl ShelfPacker {
    fn new(size: u32) -> Self {
        Self {
            size,
            current_x: 0,
            current_y: 0,
            row_height: 0,
        }
    }

    /// Reserve a `width` x `height` cell, returning its top-left corner.
    fn pack(&mut self, width: u32, height: u32) -> Option<(u32, u32)> {
        let cell_w = width + GLYPH_PADDING;
        let cell_h = height + GLYPH_PADDING;

        let (x, y, row_height) = if self.current_x + cell_w > self.size {
            (0, self.current_y + self.row_height, 0)
        } else {
            (self.current_x, self.current_y, self.row_height)
        };

        if x + cell_w > self.size || y + cell_h > self.size {
            return None;
        }

        self.current_x = x + cell_w;
        self.current_y = y;
        self.row_height = row_height.max(cell_h);
        Some((x, y))
    }
}

/// Notification that an atlas changed.
///
/// Events are queued for every glyph batch that added glyphs. When the
/// dimensions are unchanged only new glyphs were written into the existing
/// texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtlasEvent {
    pub old_width: u32,
    pub old_height: u32,
    pub new_width: u32,
    pub new_height: u32,
}

impl AtlasEvent {
    pub fn dimensions_changed(&self) -> bool {
        self.old_width != self.new_width || self.old_height != self.new_height
    }

    pub fn new_size(&self) -> Size<u32> {
        Size::new(self.new_width, self.new_height)
    }
}

type EventQueue = RefCell<VecDeque<AtlasEvent>>;

/// Receiving end of atlas notifications. Dropping it unsubscribes.
#[derive(Debug)]
pub struct AtlasSubscription {
    queue: Rc<EventQueue>,
}

impl AtlasSubscription {
    /// Take every pending event, oldest first.
    pub fn drain(&self) -> Vec<AtlasEvent> {
        self.queue.borrow_mut().drain(..).collect()
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending() == 0
    }
}

/// Glyph atlas of a single font.
pub struct GlyphAtlas {
    label: String,
    texture: TextureHandle,
    format: TextureFormat,
    outline: u32,
    max_size: u32,
    locked: bool,
    packer: ShelfPacker,
    entries: HashMap<GlyphKey, AtlasEntry>,
    /// Padded glyph pixels in atlas format, kept for repacking.
    pixels: HashMap<GlyphKey, Vec<u8>>,
    /// Insertion order, so repacking is deterministic.
    order: Vec<GlyphKey>,
    subscribers: Vec<Weak<EventQueue>>,
    batch_resized_from: Option<Size<u32>>,
    batch_changed: bool,
}

impl GlyphAtlas {
    /// Create an empty atlas. Fonts with an outline store it in the second
    /// texture channel.
    pub fn new(label: impl Into<String>, initial_size: u32, max_size: u32, outline: u32) -> Self {
        let label = label.into();
        let size = initial_size.clamp(1, max_size.max(1));
        let format = if outline > 0 {
            TextureFormat::Rg8
        } else {
            TextureFormat::R8
        };
        Self {
            texture: Texture::new_shared(label.clone(), size, size, format),
            label,
            format,
            outline,
            max_size: max_size.max(size),
            locked: false,
            packer: ShelfPacker::new(size),
            entries: HashMap::new(),
            pixels: HashMap::new(),
            order: Vec::new(),
            subscribers: Vec::new(),
            batch_resized_from: None,
            batch_changed: false,
        }
    }

    /// The current texture. A resize replaces it with a new texture.
    pub fn texture(&self) -> TextureHandle {
        Rc::clone(&self.texture)
    }

    pub fn size(&self) -> Size<u32> {
        self.texture.size()
    }

    pub fn max_size(&self) -> u32 {
        self.max_size
    }

    pub fn format(&self) -> TextureFormat {
        self.format
    }

    pub fn entry(&self, key: GlyphKey) -> Option<AtlasEntry> {
        self.entries.get(&key).copied()
    }

    pub fn contains(&self, key: GlyphKey) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// A locked atlas keeps its current glyphs and rejects new ones.
    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    pub fn subscribe(&mut self) -> AtlasSubscription {
        let queue = Rc::new(RefCell::new(VecDeque::new()));
        self.subscribers.push(Rc::downgrade(&queue));
        AtlasSubscription { queue }
    }

    /// Number of subscriptions that are still alive.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    /// Add a glyph bitmap, growing the atlas if needed.
    ///
    /// Empty bitmaps (whitespace) are recorded without using atlas space.
    pub fn insert(&mut self, key: GlyphKey, bitmap: &GlyphBitmap) -> TextResult<AtlasEntry> {
        if let Some(entry) = self.entries.get(&key) {
            return Ok(*entry);
        }

        if bitmap.is_empty() {
            let entry = AtlasEntry {
                x: 0,
                y: 0,
                width: 0,
                height: 0,
                left: bitmap.left,
                top: bitmap.top,
            };
            self.entries.insert(key, entry);
            return Ok(entry);
        }

        if self.locked {
            return Err(TextError::AtlasLocked);
        }

        let pad = self.outline;
        let width = bitmap.width + pad * 2;
        let height = bitmap.height + pad * 2;
        let pixels = if pad > 0 {
            outline_pixels(bitmap, pad)
        } else {
            bitmap.coverage.clone()
        };

        let (x, y) = match self.packer.pack(width, height) {
            Some(position) => position,
            None => {
                self.grow_to_fit(width, height)?;
                self.packer
                    .pack(width, height)
                    .ok_or_else(|| self.full_error(width, height))?
            }
        };

        self.texture.write_region(x, y, width, height, &pixels);
        let entry = AtlasEntry {
            x,
            y,
            width,
            height,
            left: bitmap.left - pad as i32,
            top: bitmap.top + pad as i32,
        };
        self.entries.insert(key, entry);
        self.pixels.insert(key, pixels);
        self.order.push(key);
        self.batch_changed = true;
        Ok(entry)
    }

    /// Queue one event describing everything inserted since the last flush.
    pub fn flush_events(&mut self) {
        if !self.batch_changed {
            return;
        }
        let new = self.size();
        let old = self.batch_resized_from.take().unwrap_or(new);
        self.batch_changed = false;
        self.publish(AtlasEvent {
            old_width: old.width,
            old_height: old.height,
            new_width: new.width,
            new_height: new.height,
        });
    }

    fn publish(&mut self, event: AtlasEvent) {
        self.subscribers.retain(|weak| match weak.upgrade() {
            Some(queue) => {
                queue.borrow_mut().push_back(event);
                true
            }
            None => false,
        });
    }

    fn full_error(&self, width: u32, height: u32) -> TextError {
        TextError::AtlasFull {
            requested_width: width,
            requested_height: height,
            atlas_width: self.max_size,
            atlas_height: self.max_size,
        }
    }

    fn grow_to_fit(&mut self, width: u32, height: u32) -> TextResult<()> {
        profile_function!();

        let old = self.size();
        let mut size = old.width;
        while size < self.max_size {
            size = (size * 2).min(self.max_size);
            if let Some((packer, positions)) = self.repack(size, width, height) {
                let texture = Texture::new_shared(self.label.clone(), size, size, self.format);
                for (key, x, y) in positions {
                    if let (Some(entry), Some(pixels)) =
                        (self.entries.get_mut(&key), self.pixels.get(&key))
                    {
                        texture.write_region(x, y, entry.width, entry.height, pixels);
                        entry.x = x;
                        entry.y = y;
                    }
                }
                self.texture = texture;
                self.packer = packer;
                self.batch_resized_from.get_or_insert(old);
                tracing::debug!(
                    "Glyph atlas '{}' grew from {}x{} to {}x{} ({} glyphs)",
                    self.label,
                    old.width,
                    old.height,
                    size,
                    size,
                    self.order.len()
                );
                return Ok(());
            }
        }
        Err(self.full_error(width, height))
    }

    /// Pack every cached glyph into an atlas of `size`, checking that a
    /// further `width` x `height` glyph still fits.
    fn repack(
        &self,
        size: u32,
        width: u32,
        height: u32,
    ) -> Option<(ShelfPacker, Vec<(GlyphKey, u32, u32)>)> {
        let mut packer = ShelfPacker::new(size);
        let mut positions = Vec::with_capacity(self.order.len());
        for key in &self.order {
            let entry = self.entries.get(key)?;
            let (x, y) = packer.pack(entry.width, entry.height)?;
            positions.push((*key, x, y));
        }
        packer.clone().pack(width, height)?;
        Some((packer, positions))
    }
}

/// Interleave coverage (R) with its dilation by `radius` (G), padding the
/// bitmap by `radius` on every side.
fn outline_pixels(bitmap: &GlyphBitmap, radius: u32) -> Vec<u8> {
    let src_w = bitmap.width as i64;
    let src_h = bitmap.height as i64;
    let r = radius as i64;
    let width = src_w + 2 * r;
    let height = src_h + 2 * r;

    let coverage = |x: i64, y: i64| -> u8 {
        if x < 0 || y < 0 || x >= src_w || y >= src_h {
            0
        } else {
            bitmap.coverage[(y * src_w + x) as usize]
        }
    };

    let mut out = Vec::with_capacity((width * height * 2) as usize);
    for y in 0..height {
        for x in 0..width {
            let sx = x - r;
            let sy = y - r;
            let mut outline = 0u8;
            for dy in -r..=r {
                for dx in -r..=r {
                    if dx * dx + dy * dy <= r * r {
                        outline = outline.max(coverage(sx + dx, sy + dy));
                    }
                }
            }
            out.push(coverage(sx, sy));
            out.push(outline);
        }
    }
    out
}
