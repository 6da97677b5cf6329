//! Meshes as typed vertex buffers plus an index list.
//!
//! ```
//! use clarity_render::{BufferType, MeshBuilder};
//! use glam::{Vec2, Vec3};
//!
//! let mesh = MeshBuilder::new()
//!     .with_positions(vec![Vec3::ZERO, Vec3::X, Vec3::Y])
//!     .with_uvs(vec![Vec2::ZERO, Vec2::X, Vec2::Y])
//!     .with_indices(vec![0, 1, 2])
//!     .build();
//!
//! assert_eq!(mesh.vertex_count(), 3);
//! assert_eq!(mesh.buffer(BufferType::TexCoord).unwrap().components(), 2);
//! ```

use ahash::HashMap;
use glam::{Vec2, Vec3};

use crate::Color;

/// Kind of per-vertex data held by a [`VertexBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferType {
    Position,
    TexCoord,
    Color,
}

/// Flat `f32` data with a fixed number of components per vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexBuffer {
    components: usize,
    data: Vec<f32>,
}

impl VertexBuffer {
    pub fn new(components: usize, data: Vec<f32>) -> Self {
        debug_assert!(components > 0 && data.len() % components == 0);
        Self { components, data }
    }

    pub fn components(&self) -> usize {
        self.components
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn vertex_count(&self) -> usize {
        self.data.len() / self.components
    }

    /// Components of one vertex.
    pub fn vertex(&self, index: usize) -> Option<&[f32]> {
        let start = index * self.components;
        self.data.get(start..start + self.components)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MeshUsage {
    #[default]
    Static,
    /// Buffers are rewritten after creation (e.g. vertex colors).
    Dynamic,
}

/// Interleaved vertex layout used for GPU upload.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
    pub color: [f32; 4],
}

#[derive(Debug, Clone, Default)]
pub struct Mesh {
    buffers: HashMap<BufferType, VertexBuffer>,
    indices: Vec<u32>,
    usage: MeshUsage,
}

impl Mesh {
    /// Replace (or add) a vertex buffer.
    pub fn set_buffer(&mut self, kind: BufferType, components: usize, data: Vec<f32>) {
        self.buffers.insert(kind, VertexBuffer::new(components, data));
    }

    pub fn buffer(&self, kind: BufferType) -> Option<&VertexBuffer> {
        self.buffers.get(&kind)
    }

    pub fn set_indices(&mut self, indices: Vec<u32>) {
        self.indices = indices;
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Number of vertices, taken from the position buffer.
    pub fn vertex_count(&self) -> usize {
        self.buffer(BufferType::Position)
            .map(VertexBuffer::vertex_count)
            .unwrap_or(0)
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn set_dynamic(&mut self) {
        self.usage = MeshUsage::Dynamic;
    }

    pub fn usage(&self) -> MeshUsage {
        self.usage
    }

    /// Interleave position, texture coordinate and color buffers.
    ///
    /// Missing texture coordinates are zero, missing colors are white.
    pub fn interleaved(&self) -> Vec<MeshVertex> {
        let positions = self.buffer(BufferType::Position);
        let uvs = self.buffer(BufferType::TexCoord);
        let colors = self.buffer(BufferType::Color);

        (0..self.vertex_count())
            .map(|i| {
                let mut vertex = MeshVertex {
                    position: [0.0; 3],
                    tex_coords: [0.0; 2],
                    color: Color::WHITE.to_array(),
                };
                if let Some(p) = positions.and_then(|b| b.vertex(i)) {
                    vertex.position[..p.len().min(3)].copy_from_slice(&p[..p.len().min(3)]);
                }
                if let Some(uv) = uvs.and_then(|b| b.vertex(i)) {
                    vertex.tex_coords[..uv.len().min(2)].copy_from_slice(&uv[..uv.len().min(2)]);
                }
                if let Some(c) = colors.and_then(|b| b.vertex(i)) {
                    vertex.color[..c.len().min(4)].copy_from_slice(&c[..c.len().min(4)]);
                }
                vertex
            })
            .collect()
    }

    /// Vertex data as bytes, ready for a vertex buffer upload.
    pub fn vertex_bytes(&self) -> Vec<u8> {
        bytemuck::cast_slice(&self.interleaved()).to_vec()
    }

    /// Axis-aligned quad in the XY plane with its lower-left corner at the origin.
    pub fn quad(width: f32, height: f32) -> Self {
        MeshBuilder::new()
            .with_positions(vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(width, 0.0, 0.0),
                Vec3::new(width, height, 0.0),
                Vec3::new(0.0, height, 0.0),
            ])
            .with_uvs(vec![
                Vec2::new(0.0, 1.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(0.0, 0.0),
            ])
            .with_indices(vec![0, 1, 2, 2, 3, 0])
            .build()
    }
}

/// Builder for [`Mesh`].
#[derive(Debug, Default)]
pub struct MeshBuilder {
    positions: Vec<Vec3>,
    uvs: Option<Vec<Vec2>>,
    colors: Option<Vec<Color>>,
    indices: Vec<u32>,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_positions(mut self, positions: Vec<Vec3>) -> Self {
        self.positions = positions;
        self
    }

    pub fn with_uvs(mut self, uvs: Vec<Vec2>) -> Self {
        self.uvs = Some(uvs);
        self
    }

    pub fn with_colors(mut self, colors: Vec<Color>) -> Self {
        self.colors = Some(colors);
        self
    }

    pub fn with_indices(mut self, indices: Vec<u32>) -> Self {
        self.indices = indices;
        self
    }

    pub fn build(self) -> Mesh {
        let mut mesh = Mesh::default();
        mesh.set_buffer(
            BufferType::Position,
            3,
            self.positions.iter().flat_map(|p| p.to_array()).collect(),
        );
        if let Some(uvs) = self.uvs {
            mesh.set_buffer(
                BufferType::TexCoord,
                2,
                uvs.iter().flat_map(|uv| uv.to_array()).collect(),
            );
        }
        if let Some(colors) = self.colors {
            mesh.set_buffer(
                BufferType::Color,
                4,
                colors.iter().flat_map(|c| c.to_array()).collect(),
            );
        }
        mesh.set_indices(self.indices);
        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quad() {
        let quad = Mesh::quad(2.0, 1.0);
        assert_eq!(quad.vertex_count(), 4);
        assert_eq!(quad.triangle_count(), 2);
        assert_eq!(
            quad.buffer(BufferType::Position).unwrap().vertex(2),
            Some(&[2.0, 1.0, 0.0][..])
        );
    }

    #[test]
    fn test_replace_color_buffer() {
        let mut mesh = Mesh::quad(1.0, 1.0);
        mesh.set_buffer(BufferType::Color, 4, vec![0.5; 16]);
        mesh.set_buffer(BufferType::Color, 4, vec![0.25; 16]);

        let colors = mesh.buffer(BufferType::Color).unwrap();
        assert_eq!(colors.vertex_count(), 4);
        assert!(colors.data().iter().all(|&c| c == 0.25));
    }

    #[test]
    fn test_interleaved_defaults() {
        let mesh = MeshBuilder::new()
            .with_positions(vec![Vec3::new(1.0, 2.0, 3.0)])
            .build();
        let vertices = mesh.interleaved();

        assert_eq!(vertices.len(), 1);
        assert_eq!(vertices[0].position, [1.0, 2.0, 3.0]);
        assert_eq!(vertices[0].tex_coords, [0.0, 0.0]);
        assert_eq!(vertices[0].color, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(mesh.vertex_bytes().len(), std::mem::size_of::<MeshVertex>());
    }

    #[test]
    fn test_dynamic_usage() {
        let mut mesh = Mesh::quad(1.0, 1.0);
        assert_eq!(mesh.usage(), MeshUsage::Static);
        mesh.set_dynamic();
        assert_eq!(mesh.usage(), MeshUsage::Dynamic);
    }
}
