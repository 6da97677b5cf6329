//! Math types re-exported from [`glam`].
//!
//! Scene positions are [`Vec3`] (Y up), glyph placement and texture
//! coordinates are [`Vec2`].
//!
//! ```
//! use clarity_core::math::{Vec2, Vec3};
//!
//! let origin = Vec3::new(0.0, 0.0, 0.0);
//! let offset = Vec2::new(4.0, -2.0);
//! assert_eq!(origin + offset.extend(0.0), Vec3::new(4.0, -2.0, 0.0));
//! ```

pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
