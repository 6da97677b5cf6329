//! Scene node displaying a string with a bitmap font.

use std::rc::Rc;

use clarity_core::config::{ClarityConfig, DeviceClass, KerningTiers};
use clarity_core::geometry::{Rect, Size};
use clarity_core::math::Vec3;
use clarity_core::profiling::profile_function;
use clarity_render::{BufferType, Color, MaterialRef};
use clarity_scene::{Drawable, Geometry, Node, RenderBucket, RenderQueue, Spatial};

use crate::atlas::AtlasSubscription;
use crate::container::{CONTAINER_NAME, TextBounds, TextContainer};
use crate::handle::FontHandle;
use crate::layout::{HAlign, StringLayout, VAlign, WrapMode};
use crate::material::MaterialCache;
use crate::preview::AtlasPreview;

/// A node that owns a layout configuration and the geometry generated from
/// it.
///
/// Geometry is regenerated in full whenever the text, the layout or the
/// font changes, and after [`TextNode::process_atlas_events`] sees the atlas
/// change size. The stored vertex color is reapplied after every
/// regeneration.
#[derive(Debug)]
pub struct TextNode {
    root: Node,
    layout: StringLayout,
    font: FontHandle,
    material: MaterialRef,
    /// `None` until the first update.
    subscription: Option<AtlasSubscription>,
    bounds: Option<TextBounds>,
    vertex_color: Color,
    font_scale: f32,
    /// Atlas dimensions the current geometry was built against.
    atlas_size: Size<u32>,
    device: DeviceClass,
    kerning_tiers: KerningTiers,
    auto_kerning: bool,
    preview: Option<AtlasPreview>,
    regenerations: u64,
}

impl TextNode {
    /// Text node using the font's default cached material.
    pub fn new(
        text: impl Into<String>,
        font: &FontHandle,
        materials: &mut MaterialCache,
        config: &ClarityConfig,
    ) -> Self {
        let material = materials.get_default(font);
        Self::with_layout(StringLayout::new(text), font, material, config)
    }

    pub fn with_material(
        text: impl Into<String>,
        font: &FontHandle,
        material: MaterialRef,
        config: &ClarityConfig,
    ) -> Self {
        Self::with_layout(StringLayout::new(text), font, material, config)
    }

    pub fn with_layout(
        layout: StringLayout,
        font: &FontHandle,
        material: MaterialRef,
        config: &ClarityConfig,
    ) -> Self {
        let mut node = Self {
            root: Node::new("TextNode"),
            layout,
            font: font.clone(),
            material,
            subscription: None,
            bounds: None,
            vertex_color: Color::WHITE,
            font_scale: font.scale(),
            atlas_size: Size::default(),
            device: config.device,
            kerning_tiers: config.kerning,
            auto_kerning: true,
            preview: None,
            regenerations: 0,
        };
        node.update();
        node.subscription = Some(font.subscribe());
        node
    }

    pub fn is_initialized(&self) -> bool {
        self.subscription.is_some()
    }

    /// Regenerate the geometry from the current layout.
    pub fn update(&mut self) {
        profile_function!();

        self.fix_kerning();
        self.font_scale = self.font.scale();

        self.root.detach_child_named(CONTAINER_NAME);
        let container = TextContainer::build(&self.font, &self.layout, &self.material);
        self.bounds = Some(container.bounds());
        let glyph_count = container.glyph_count();
        self.root.attach_child(container.into_node());

        self.atlas_size = self.font.atlas_size();
        self.bind_atlas_texture();
        if let Some(preview) = &mut self.preview {
            preview.refresh();
        }
        self.regenerations += 1;

        tracing::debug!(
            "Regenerated text node ({} glyphs, atlas {}x{}, kerning {})",
            glyph_count,
            self.atlas_size.width,
            self.atlas_size.height,
            self.layout.kerning
        );

        self.set_color(self.vertex_color);
    }

    fn invalidate(&mut self) {
        if self.is_initialized() {
            self.update();
        }
    }

    fn fix_kerning(&mut self) {
        if self.device.is_handheld() || !self.auto_kerning {
            return;
        }
        self.layout.kerning = self.kerning_tiers.kerning_for(self.font.scaled_point_size());
    }

    fn bind_atlas_texture(&mut self) {
        let texture = self.font.atlas_texture();
        self.material
            .borrow_mut()
            .set_texture("Texture", Rc::clone(&texture));
        if let Some(Spatial::Node(container)) = self.root.child_named_mut(CONTAINER_NAME) {
            container.for_each_geometry_mut(&mut |geometry| {
                geometry
                    .material()
                    .borrow_mut()
                    .set_texture("Texture", Rc::clone(&texture));
            });
        }
    }

    /// Handle queued atlas notifications.
    ///
    /// Regenerates once if any event changed the atlas dimensions to
    /// something other than what the current geometry was built against.
    /// Returns whether a regeneration happened.
    pub fn process_atlas_events(&mut self) -> bool {
        let Some(subscription) = &self.subscription else {
            return false;
        };
        let events = subscription.drain();
        let resized = events
            .iter()
            .any(|event| event.dimensions_changed() && event.new_size() != self.atlas_size);
        if resized {
            self.update();
        }
        resized
    }

    /// Pending atlas notifications not yet processed.
    pub fn pending_atlas_events(&self) -> usize {
        self.subscription
            .as_ref()
            .map_or(0, AtlasSubscription::pending)
    }

    /// Set the vertex color of every generated vertex.
    pub fn set_color(&mut self, color: Color) {
        self.vertex_color = color;
        if let Some(Spatial::Node(container)) = self.root.child_named_mut(CONTAINER_NAME) {
            container.for_each_geometry_mut(&mut |geometry| apply_vertex_color(geometry, color));
        }
    }

    pub fn color(&self) -> Color {
        self.vertex_color
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if self.layout.text == text {
            return;
        }
        self.layout.text = text;
        self.invalidate();
    }

    pub fn text(&self) -> &str {
        &self.layout.text
    }

    /// Switch to another font, together with the material to draw it with.
    pub fn set_font(&mut self, font: &FontHandle, material: MaterialRef) {
        self.font = font.clone();
        self.material = material;
        if self.is_initialized() {
            self.subscription = Some(font.subscribe());
        }
        self.invalidate();
    }

    /// Switch to another font using its cached default material.
    pub fn set_font_cached(&mut self, font: &FontHandle, materials: &mut MaterialCache) {
        let material = materials.get_default(font);
        self.set_font(font, material);
    }

    pub fn font(&self) -> &FontHandle {
        &self.font
    }

    pub fn material(&self) -> &MaterialRef {
        &self.material
    }

    pub fn set_text_box(&mut self, text_box: Rect<f32>) {
        self.layout.text_box = text_box;
        self.invalidate();
    }

    pub fn text_box(&self) -> Rect<f32> {
        self.layout.text_box
    }

    pub fn set_max_lines(&mut self, max_lines: u32) {
        self.layout.max_lines = max_lines;
        self.invalidate();
    }

    pub fn max_lines(&self) -> u32 {
        self.layout.max_lines
    }

    pub fn set_h_alignment(&mut self, align: HAlign) {
        self.layout.h_align = align;
        self.invalidate();
    }

    pub fn h_alignment(&self) -> HAlign {
        self.layout.h_align
    }

    pub fn set_v_alignment(&mut self, align: VAlign) {
        self.layout.v_align = align;
        self.invalidate();
    }

    pub fn v_alignment(&self) -> VAlign {
        self.layout.v_align
    }

    pub fn set_wrap_mode(&mut self, wrap: WrapMode) {
        self.layout.wrap = wrap;
        self.invalidate();
    }

    pub fn wrap_mode(&self) -> WrapMode {
        self.layout.wrap
    }

    /// Use a fixed kerning instead of the size-based default.
    pub fn set_kerning(&mut self, kerning: i32) {
        self.auto_kerning = false;
        self.layout.kerning = kerning;
        self.invalidate();
    }

    /// Go back to size-based kerning on desktop devices.
    pub fn reset_kerning(&mut self) {
        self.auto_kerning = true;
        self.invalidate();
    }

    pub fn kerning(&self) -> i32 {
        self.layout.kerning
    }

    pub fn layout(&self) -> &StringLayout {
        &self.layout
    }

    /// Show the font's atlas next to the text, refreshed on every update.
    pub fn attach_atlas_preview(&mut self, size: f32) -> &mut AtlasPreview {
        self.preview.insert(AtlasPreview::new(&self.font, size))
    }

    pub fn detach_atlas_preview(&mut self) -> Option<AtlasPreview> {
        self.preview.take()
    }

    pub fn atlas_preview(&self) -> Option<&AtlasPreview> {
        self.preview.as_ref()
    }

    pub fn text_width(&self) -> f32 {
        self.bounds.map_or(0.0, |b| b.text_width)
    }

    pub fn text_height(&self) -> f32 {
        self.bounds.map_or(0.0, |b| b.text_height)
    }

    pub fn box_width(&self) -> f32 {
        self.bounds.map_or(0.0, |b| b.box_width)
    }

    pub fn box_height(&self) -> f32 {
        self.bounds.map_or(0.0, |b| b.box_height)
    }

    /// Scale of the font when the geometry was generated.
    pub fn font_scale(&self) -> f32 {
        self.font_scale
    }

    /// Atlas dimensions the current geometry refers to.
    pub fn atlas_size(&self) -> Size<u32> {
        self.atlas_size
    }

    /// Generated line geometries.
    pub fn geometries(&self) -> Vec<&Geometry> {
        match self.root.child_named(CONTAINER_NAME) {
            Some(Spatial::Node(container)) => container.geometries(),
            _ => Vec::new(),
        }
    }

    /// Number of times geometry has been generated.
    pub fn regenerations(&self) -> u64 {
        self.regenerations
    }

    pub fn node(&self) -> &Node {
        &self.root
    }

    pub fn translation(&self) -> Vec3 {
        self.root.translation()
    }

    pub fn set_translation(&mut self, translation: Vec3) {
        self.root.set_translation(translation);
    }
}

impl Drawable for TextNode {
    fn queue<'a>(&'a self, queue: &mut RenderQueue<'a>, origin: Vec3, bucket: RenderBucket) {
        self.root.queue(queue, origin, bucket);
        if let Some(preview) = &self.preview {
            preview.queue(queue, origin + self.root.translation(), RenderBucket::Gui);
        }
    }
}

/// Write `color` into every vertex of the geometry as 4 interleaved
/// channels.
fn apply_vertex_color(geometry: &mut Geometry, color: Color) {
    geometry.mesh_mut().set_dynamic();
    geometry.material().borrow_mut().set_bool("VertexColor", true);

    let channels = geometry.mesh().vertex_count() * 4;
    let colors = (0..channels)
        .map(|i| match i % 4 {
            0 => color.r,
            1 => color.g,
            2 => color.b,
            3 => color.a,
            _ => unreachable!("color channel index out of range"),
        })
        .collect();
    geometry.mesh_mut().set_buffer(BufferType::Color, 4, colors);
}
