//! Debug view of a font's glyph atlas.

use clarity_core::math::Vec3;
use clarity_render::{BlendMode, Material, Mesh, ShaderVariant, TextureId};
use clarity_scene::{Drawable, Geometry, RenderBucket, RenderQueue};

use crate::handle::FontHandle;

/// Textured quad showing the current atlas of a font.
#[derive(Debug)]
pub struct AtlasPreview {
    font: FontHandle,
    geometry: Geometry,
}

impl AtlasPreview {
    /// Quad of `size` scene units with its lower-left corner at the origin.
    pub fn new(font: &FontHandle, size: f32) -> Self {
        let mut material = Material::new(ShaderVariant::Unshaded);
        material.set_texture("ColorMap", font.atlas_texture());
        material.render_state_mut().blend = BlendMode::Alpha;

        let mut geometry = Geometry::new(
            format!("AtlasPreview-{}", font.id().as_u64()),
            Mesh::quad(size, size),
            material.into_shared(),
        );
        geometry.set_bucket(RenderBucket::Gui);

        Self {
            font: font.clone(),
            geometry,
        }
    }

    /// Point the preview at the font's current atlas texture.
    pub fn refresh(&mut self) {
        let texture = self.font.atlas_texture();
        self.geometry
            .material()
            .borrow_mut()
            .set_texture("ColorMap", texture);
    }

    pub fn texture_id(&self) -> Option<TextureId> {
        self.geometry.material().borrow().texture_id("ColorMap")
    }

    pub fn font(&self) -> &FontHandle {
        &self.font
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn set_translation(&mut self, translation: Vec3) {
        self.geometry.set_translation(translation);
    }
}

impl Drawable for AtlasPreview {
    fn queue<'a>(&'a self, queue: &mut RenderQueue<'a>, origin: Vec3, bucket: RenderBucket) {
        queue.push(
            self.geometry.bucket().unwrap_or(bucket),
            &self.geometry,
            origin + self.geometry.translation(),
        );
    }
}
