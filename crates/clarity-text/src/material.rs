//! Shared text materials keyed by font and colors.

use clarity_core::alloc::HashMap;
use clarity_render::{BlendMode, Color, Material, MaterialRef, ShaderVariant};

use crate::handle::{FontHandle, FontId};

pub const DEFAULT_COLOR: Color = Color::WHITE;
pub const DEFAULT_OUTLINE: Color = Color::BLACK;

/// Identity of a cached material. Colors compare bitwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialKey {
    font: FontId,
    color: [u32; 4],
    outline: [u32; 4],
}

impl MaterialKey {
    pub fn new(font: FontId, color: Color, outline: Color) -> Self {
        Self {
            font,
            color: color.to_bits(),
            outline: outline.to_bits(),
        }
    }

    pub fn font(&self) -> FontId {
        self.font
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaterialCacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Materials shared by every text node using the same font and colors.
///
/// Entries are never evicted. Atlas textures are bound by the text nodes, not
/// by the cache.
#[derive(Default)]
pub struct MaterialCache {
    materials: HashMap<MaterialKey, MaterialRef>,
    stats: MaterialCacheStats,
}

impl MaterialCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_create(&mut self, font: &FontHandle, color: Color, outline: Color) -> MaterialRef {
        let key = MaterialKey::new(font.id(), color, outline);
        if let Some(material) = self.materials.get(&key) {
            self.stats.hits += 1;
            tracing::trace!("Material cache hit for {:?}", key);
            return material.clone();
        }

        self.stats.misses += 1;
        let material = create_material(font, color, outline);
        self.materials.insert(key, material.clone());
        material
    }

    /// Material with the default fill and outline colors.
    pub fn get_default(&mut self, font: &FontHandle) -> MaterialRef {
        self.get_or_create(font, DEFAULT_COLOR, DEFAULT_OUTLINE)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn stats(&self) -> MaterialCacheStats {
        self.stats
    }
}

fn create_material(font: &FontHandle, color: Color, outline: Color) -> MaterialRef {
    let mut material = if font.outline() > 0 {
        let mut material = Material::new(ShaderVariant::BitmapOutlined);
        material.set_color("Outline", outline);
        material
    } else {
        Material::new(ShaderVariant::Bitmap)
    };
    material.set_color("Color", color);
    material.render_state_mut().blend = BlendMode::Alpha;
    material.into_shared()
}
