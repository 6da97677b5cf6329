use std::collections::BTreeMap;

use clarity_core::math::Vec3;

use crate::geometry::{Geometry, RenderBucket};

/// Something that can place geometries into a [`RenderQueue`].
pub trait Drawable {
    /// Queue geometries at `origin`, using `bucket` where none is chosen.
    fn queue<'a>(&'a self, queue: &mut RenderQueue<'a>, origin: Vec3, bucket: RenderBucket);
}

#[derive(Debug, Clone, Copy)]
pub struct QueuedGeometry<'a> {
    pub geometry: &'a Geometry,
    pub world_translation: Vec3,
}

/// Geometries collected for one frame, grouped by bucket.
#[derive(Debug, Default)]
pub struct RenderQueue<'a> {
    buckets: BTreeMap<RenderBucket, Vec<QueuedGeometry<'a>>>,
}

impl<'a> RenderQueue<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a drawable at the world origin in the opaque bucket.
    pub fn collect(&mut self, drawable: &'a impl Drawable) {
        drawable.queue(self, Vec3::ZERO, RenderBucket::Opaque);
    }

    pub fn push(&mut self, bucket: RenderBucket, geometry: &'a Geometry, world_translation: Vec3) {
        self.buckets.entry(bucket).or_default().push(QueuedGeometry {
            geometry,
            world_translation,
        });
    }

    pub fn bucket(&self, bucket: RenderBucket) -> &[QueuedGeometry<'a>] {
        self.buckets.get(&bucket).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Sort transparent geometry back to front along Z (lower Z is farther).
    pub fn sort_transparent(&mut self) {
        if let Some(items) = self.buckets.get_mut(&RenderBucket::Transparent) {
            items.sort_by(|a, b| a.world_translation.z.total_cmp(&b.world_translation.z));
        }
    }

    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
