//! Clarity Render - CPU-side rendering resources.
//!
//! The types here model what a GPU backend consumes:
//! - [`Texture`]: pixels plus identity; resized textures are new textures
//! - [`Material`]: shader variant, named parameters, texture slots
//! - [`Mesh`]: typed vertex buffers and indices
//!
//! All resources are single-threaded and shared with `Rc`.

pub mod color;
pub mod material;
pub mod mesh;
pub mod texture;

pub use color::Color;
pub use material::{BlendMode, Material, MaterialParameter, MaterialRef, RenderState, ShaderVariant};
pub use mesh::{BufferType, Mesh, MeshBuilder, MeshUsage, MeshVertex, VertexBuffer};
pub use texture::{Texture, TextureFormat, TextureHandle, TextureId};
