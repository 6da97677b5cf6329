//! Clarity Scene
//!
//! A small retained scene graph. [`Node`]s own their children, leaves are
//! [`Geometry`] (a mesh drawn with a shared material), and a [`RenderQueue`]
//! collects geometries per [`RenderBucket`] with their world translation.

pub mod geometry;
pub mod node;
pub mod queue;

pub use geometry::{Geometry, RenderBucket};
pub use node::{Node, Spatial};
pub use queue::{Drawable, QueuedGeometry, RenderQueue};
