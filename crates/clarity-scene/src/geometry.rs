use clarity_core::math::Vec3;
use clarity_render::{MaterialRef, Mesh};

/// Render queue bucket a geometry is drawn in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum RenderBucket {
    #[default]
    Opaque,
    /// Drawn after opaque geometry, back to front.
    Transparent,
    /// Screen-space overlay.
    Gui,
}

/// A mesh drawn with a (possibly shared) material.
#[derive(Debug, Clone)]
pub struct Geometry {
    name: String,
    mesh: Mesh,
    material: MaterialRef,
    /// `None` inherits the parent node's bucket.
    bucket: Option<RenderBucket>,
    translation: Vec3,
}

impl Geometry {
    pub fn new(name: impl Into<String>, mesh: Mesh, material: MaterialRef) -> Self {
        Self {
            name: name.into(),
            mesh,
            material,
            bucket: None,
            translation: Vec3::ZERO,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn mesh_mut(&mut self) -> &mut Mesh {
        &mut self.mesh
    }

    pub fn material(&self) -> &MaterialRef {
        &self.material
    }

    pub fn set_material(&mut self, material: MaterialRef) {
        self.material = material;
    }

    pub fn bucket(&self) -> Option<RenderBucket> {
        self.bucket
    }

    pub fn set_bucket(&mut self, bucket: RenderBucket) {
        self.bucket = Some(bucket);
    }

    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    pub fn set_translation(&mut self, translation: Vec3) {
        self.translation = translation;
    }
}
