//! Materials: a shader variant plus named parameters, texture slots and
//! render state.
//!
//! ```
//! use clarity_render::{Color, Material, ShaderVariant, BlendMode};
//!
//! let mut material = Material::new(ShaderVariant::Bitmap);
//! material.set_color("Color", Color::WHITE);
//! material.render_state_mut().blend = BlendMode::Alpha;
//! assert_eq!(material.color("Color"), Some(Color::WHITE));
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use ahash::HashMap;
use glam::{Vec2, Vec4};

use crate::Color;
use crate::texture::{TextureHandle, TextureId};

/// Shared, mutable material. Geometries reference materials through this.
pub type MaterialRef = Rc<RefCell<Material>>;

/// Shader programs known to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderVariant {
    /// Glyph coverage from the red channel, tinted by `Color`.
    Bitmap,
    /// Like [`ShaderVariant::Bitmap`], with the green channel drawn in
    /// `Outline` behind the glyph.
    BitmapOutlined,
    /// Plain textured/colored surface (`ColorMap`, `Color`).
    Unshaded,
}

impl ShaderVariant {
    pub fn name(self) -> &'static str {
        match self {
            ShaderVariant::Bitmap => "TTF_Bitmap",
            ShaderVariant::BitmapOutlined => "TTF_BitmapOutlined",
            ShaderVariant::Unshaded => "Unshaded",
        }
    }
}

/// A material parameter value that can be bound to a shader.
#[derive(Debug, Clone, PartialEq)]
pub enum MaterialParameter {
    Bool(bool),
    Float(f32),
    Vec2(Vec2),
    Vec4(Vec4),
    Color(Color),
}

impl MaterialParameter {
    /// Bytes for uniform upload. Booleans are widened to a 32-bit integer.
    pub fn as_bytes(&self) -> Vec<u8> {
        match self {
            MaterialParameter::Bool(v) => bytemuck::bytes_of(&u32::from(*v)).to_vec(),
            MaterialParameter::Float(v) => bytemuck::bytes_of(v).to_vec(),
            MaterialParameter::Vec2(v) => bytemuck::bytes_of(v).to_vec(),
            MaterialParameter::Vec4(v) => bytemuck::bytes_of(v).to_vec(),
            MaterialParameter::Color(c) => bytemuck::bytes_of(c).to_vec(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    #[default]
    Off,
    Alpha,
    Additive,
}

/// Fixed-function state applied with the material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderState {
    pub blend: BlendMode,
    pub wireframe: bool,
}

#[derive(Debug, Clone)]
pub struct Material {
    shader: ShaderVariant,
    parameters: HashMap<String, MaterialParameter>,
    textures: HashMap<String, TextureHandle>,
    render_state: RenderState,
}

impl Material {
    pub fn new(shader: ShaderVariant) -> Self {
        Self {
            shader,
            parameters: HashMap::default(),
            textures: HashMap::default(),
            render_state: RenderState::default(),
        }
    }

    /// Wrap the material for sharing between geometries.
    pub fn into_shared(self) -> MaterialRef {
        Rc::new(RefCell::new(self))
    }

    pub fn shader(&self) -> ShaderVariant {
        self.shader
    }

    pub fn set_parameter(&mut self, name: impl Into<String>, value: MaterialParameter) {
        self.parameters.insert(name.into(), value);
    }

    pub fn parameter(&self, name: &str) -> Option<&MaterialParameter> {
        self.parameters.get(name)
    }

    pub fn set_color(&mut self, name: impl Into<String>, color: Color) {
        self.set_parameter(name, MaterialParameter::Color(color));
    }

    pub fn color(&self, name: &str) -> Option<Color> {
        match self.parameters.get(name) {
            Some(MaterialParameter::Color(c)) => Some(*c),
            _ => None,
        }
    }

    pub fn set_bool(&mut self, name: impl Into<String>, value: bool) {
        self.set_parameter(name, MaterialParameter::Bool(value));
    }

    /// Boolean parameter, `false` when unset.
    pub fn bool_param(&self, name: &str) -> bool {
        matches!(self.parameters.get(name), Some(MaterialParameter::Bool(true)))
    }

    /// Bind a texture to a named slot, replacing any previous binding.
    pub fn set_texture(&mut self, name: impl Into<String>, texture: TextureHandle) {
        self.textures.insert(name.into(), texture);
    }

    pub fn texture(&self, name: &str) -> Option<&TextureHandle> {
        self.textures.get(name)
    }

    pub fn texture_id(&self, name: &str) -> Option<TextureId> {
        self.textures.get(name).map(|t| t.id())
    }

    pub fn render_state(&self) -> &RenderState {
        &self.render_state
    }

    pub fn render_state_mut(&mut self) -> &mut RenderState {
        &mut self.render_state
    }

    /// Uniform block bytes, parameters ordered by name.
    pub fn uniform_bytes(&self) -> Vec<u8> {
        let mut names: Vec<&String> = self.parameters.keys().collect();
        names.sort();
        names
            .into_iter()
            .flat_map(|name| self.parameters[name].as_bytes())
            .collect()
    }
}
