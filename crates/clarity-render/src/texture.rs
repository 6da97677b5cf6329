//! CPU-side textures shared between atlases and materials.
//!
//! A [`Texture`] keeps its pixels on the CPU and a dirty flag telling the
//! backend that an upload is pending. Textures are shared through
//! [`TextureHandle`]; a resized texture is always a *new* texture with a new
//! [`TextureId`], never the old one mutated in place.

use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use clarity_core::geometry::Size;

/// Shared handle to a texture.
pub type TextureHandle = Rc<Texture>;

static NEXT_TEXTURE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique texture identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(u64);

impl TextureId {
    fn next() -> Self {
        Self(NEXT_TEXTURE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    /// Single 8-bit channel (glyph coverage).
    R8,
    /// Two 8-bit channels (glyph coverage + outline coverage).
    Rg8,
    Rgba8,
}

impl TextureFormat {
    pub fn bytes_per_pixel(self) -> u32 {
        match self {
            TextureFormat::R8 => 1,
            TextureFormat::Rg8 => 2,
            TextureFormat::Rgba8 => 4,
        }
    }
}

#[derive(Debug)]
pub struct Texture {
    id: TextureId,
    label: String,
    size: Size<u32>,
    format: TextureFormat,
    pixels: RefCell<Vec<u8>>,
    dirty: Cell<bool>,
}

impl Texture {
    /// Create a zero-filled texture.
    pub fn new(label: impl Into<String>, width: u32, height: u32, format: TextureFormat) -> Self {
        let len = (width * height * format.bytes_per_pixel()) as usize;
        Self {
            id: TextureId::next(),
            label: label.into(),
            size: Size::new(width, height),
            format,
            pixels: RefCell::new(vec![0; len]),
            dirty: Cell::new(true),
        }
    }

    /// Create a zero-filled texture wrapped in a shared handle.
    pub fn new_shared(
        label: impl Into<String>,
        width: u32,
        height: u32,
        format: TextureFormat,
    ) -> TextureHandle {
        Rc::new(Self::new(label, width, height, format))
    }

    pub fn id(&self) -> TextureId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn width(&self) -> u32 {
        self.size.width
    }

    pub fn height(&self) -> u32 {
        self.size.height
    }

    pub fn size(&self) -> Size<u32> {
        self.size
    }

    pub fn format(&self) -> TextureFormat {
        self.format
    }

    pub fn pixels(&self) -> Ref<'_, [u8]> {
        Ref::map(self.pixels.borrow(), Vec::as_slice)
    }

    /// Copy a tightly packed block of pixels into the texture.
    ///
    /// Pixels falling outside the texture are ignored.
    pub fn write_region(&self, x: u32, y: u32, width: u32, height: u32, data: &[u8]) {
        let bpp = self.format.bytes_per_pixel() as usize;
        let row_len = width as usize * bpp;
        let mut pixels = self.pixels.borrow_mut();

        for row in 0..height {
            let dst_y = y + row;
            if dst_y >= self.size.height {
                break;
            }
            let copy_width = width.min(self.size.width.saturating_sub(x)) as usize * bpp;
            let src_start = row as usize * row_len;
            let dst_start = (dst_y as usize * self.size.width as usize + x as usize) * bpp;
            if let (Some(src), Some(dst)) = (
                data.get(src_start..src_start + copy_width),
                pixels.get_mut(dst_start..dst_start + copy_width),
            ) {
                dst.copy_from_slice(src);
            }
        }

        self.dirty.set(true);
    }

    /// Read one pixel's channels.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Vec<u8>> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        let bpp = self.format.bytes_per_pixel() as usize;
        let start = (y as usize * self.size.width as usize + x as usize) * bpp;
        Some(self.pixels.borrow()[start..start + bpp].to_vec())
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    /// Clear the dirty flag, returning whether an upload was pending.
    pub fn take_dirty(&self) -> bool {
        self.dirty.replace(false)
    }
}
