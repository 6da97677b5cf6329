//! Geometry generation for laid-out text.

use clarity_core::math::{Vec2, Vec3};
use clarity_core::profiling::profile_function;
use clarity_render::{MaterialRef, MeshBuilder};
use clarity_scene::{Geometry, Node, RenderBucket};

use crate::handle::{FontHandle, FormattedText};
use crate::layout::StringLayout;

/// Name of the node holding the generated line geometries.
pub const CONTAINER_NAME: &str = "TextContainer";

/// Slack for float comparisons against the text box.
const CLIP_EPSILON: f32 = 0.01;

/// Size of generated text, in scene units.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TextBounds {
    pub text_width: f32,
    pub text_height: f32,
    /// Text box width, or the text width when the box has none.
    pub box_width: f32,
    /// Text box height, or the text height when the box has none.
    pub box_height: f32,
}

/// The generated geometry set of one text node: one geometry per visual
/// line, one quad per rendered glyph.
#[derive(Debug)]
pub struct TextContainer {
    node: Node,
    bounds: TextBounds,
    glyph_count: usize,
}

impl TextContainer {
    /// Lay out `layout` with `font` and build line geometries sharing
    /// `material`.
    pub fn build(font: &FontHandle, layout: &StringLayout, material: &MaterialRef) -> Self {
        profile_function!();

        let formatted = font.format(layout);
        Self::from_formatted(&formatted, font.scale(), layout, material)
    }

    fn from_formatted(
        formatted: &FormattedText,
        scale: f32,
        layout: &StringLayout,
        material: &MaterialRef,
    ) -> Self {
        let shaped = &formatted.shaped;
        let text_box = layout.text_box;
        let clip = layout.wrap.clips();

        let max_lines = match layout.max_lines {
            0 => usize::MAX,
            n => n as usize,
        };

        let mut lines = Vec::new();
        for (index, line) in shaped.lines.iter().enumerate().take(max_lines) {
            let bottom = (line.top + line.height) * scale;
            if clip && text_box.height > 0.0 && bottom > text_box.height + CLIP_EPSILON {
                break;
            }
            lines.push(index);
        }

        let text_height = match (lines.first(), lines.last()) {
            (Some(&first), Some(&last)) => {
                let first = &shaped.lines[first];
                let last = &shaped.lines[last];
                (last.top + last.height - first.top) * scale
            }
            _ => 0.0,
        };

        let v_offset = if text_box.height > 0.0 {
            layout.v_align.offset(text_box.height, text_height)
        } else {
            0.0
        };

        let mut node = Node::new(CONTAINER_NAME);
        node.set_bucket(RenderBucket::Transparent);

        let mut text_width: f32 = 0.0;
        let mut glyph_count = 0;
        for &line_index in &lines {
            let line = &shaped.lines[line_index];
            let mut line_width = line.width * scale;
            if clip && text_box.width > 0.0 {
                line_width = line_width.min(text_box.width);
            }
            text_width = text_width.max(line_width);

            let mut positions = Vec::new();
            let mut uvs = Vec::new();
            let mut indices = Vec::new();
            for glyph in shaped.line_glyphs(line_index) {
                let Some(entry) = formatted.entries.get(&glyph.key) else {
                    continue;
                };
                if entry.is_empty() {
                    continue;
                }

                let left = (glyph.x + entry.left as f32) * scale;
                let right = left + entry.width as f32 * scale;
                if clip && text_box.width > 0.0 && right > text_box.width + CLIP_EPSILON {
                    continue;
                }
                let top = (line.baseline + glyph.y - entry.top as f32) * scale + v_offset;
                let bottom = top + entry.height as f32 * scale;

                let x0 = text_box.x + left;
                let x1 = text_box.x + right;
                let y0 = text_box.y - top;
                let y1 = text_box.y - bottom;
                let (u0, v0, u1, v1) = entry.uv_rect(formatted.atlas_size);

                let base = positions.len() as u32;
                positions.extend([
                    Vec3::new(x0, y0, 0.0),
                    Vec3::new(x0, y1, 0.0),
                    Vec3::new(x1, y1, 0.0),
                    Vec3::new(x1, y0, 0.0),
                ]);
                uvs.extend([
                    Vec2::new(u0, v0),
                    Vec2::new(u0, v1),
                    Vec2::new(u1, v1),
                    Vec2::new(u1, v0),
                ]);
                indices.extend([base, base + 1, base + 2, base, base + 2, base + 3]);
                glyph_count += 1;
            }

            if positions.is_empty() {
                continue;
            }
            let mesh = MeshBuilder::new()
                .with_positions(positions)
                .with_uvs(uvs)
                .with_indices(indices)
                .build();
            node.attach_child(Geometry::new(
                format!("line-{}", line_index),
                mesh,
                material.clone(),
            ));
        }

        let bounds = TextBounds {
            text_width,
            text_height,
            box_width: if text_box.width > 0.0 {
                text_box.width
            } else {
                text_width
            },
            box_height: if text_box.height > 0.0 {
                text_box.height
            } else {
                text_height
            },
        };

        Self {
            node,
            bounds,
            glyph_count,
        }
    }

    pub fn bounds(&self) -> TextBounds {
        self.bounds
    }

    /// Number of glyph quads generated.
    pub fn glyph_count(&self) -> usize {
        self.glyph_count
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn into_node(self) -> Node {
        self.node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::AtlasEntry;
    use crate::layout::{VAlign, WrapMode};
    use crate::source::{GlyphKey, ShapedGlyph, ShapedLine, ShapedText};
    use clarity_core::alloc::HashMap;
    use clarity_core::geometry::{Rect, Size};
    use clarity_render::{BufferType, Material, ShaderVariant};

    /// Two lines of three 10px glyphs each, 20px line height.
    fn formatted() -> FormattedText {
        let mut glyphs = Vec::new();
        let mut entries = HashMap::new();
        for line in 0..2 {
            for i in 0..3 {
                let key = GlyphKey::new((line * 3 + i) as u64);
                glyphs.push(ShapedGlyph {
                    key,
                    x: i as f32 * 10.0,
                    y: 0.0,
                    advance: 10.0,
                    line,
                });
                entries.insert(
                    key,
                    AtlasEntry {
                        x: (line * 3 + i) as u32 * 11,
                        y: 0,
                        width: 10,
                        height: 10,
                        left: 0,
                        top: 10,
                    },
                );
            }
        }
        let lines = (0..2)
            .map(|line| ShapedLine {
                top: line as f32 * 20.0,
                baseline: line as f32 * 20.0 + 15.0,
                height: 20.0,
                width: 30.0,
            })
            .collect();
        FormattedText {
            shaped: ShapedText { glyphs, lines },
            entries,
            atlas_size: Size::new(128, 128),
        }
    }

    fn material() -> MaterialRef {
        Material::new(ShaderVariant::Bitmap).into_shared()
    }

    #[test]
    fn test_one_geometry_per_line() {
        let layout = StringLayout::new("abc\ndef");
        let container = TextContainer::from_formatted(&formatted(), 1.0, &layout, &material());

        let geometries = container.node().geometries();
        assert_eq!(geometries.len(), 2);
        for geometry in geometries {
            assert_eq!(geometry.mesh().vertex_count(), 12);
            assert_eq!(geometry.mesh().indices().len(), 18);
            assert_eq!(geometry.mesh().buffer(BufferType::TexCoord).unwrap().vertex_count(), 12);
        }
        assert_eq!(container.node().bucket(), Some(RenderBucket::Transparent));
        assert_eq!(container.bounds().text_width, 30.0);
        assert_eq!(container.bounds().text_height, 40.0);
        assert_eq!(container.bounds().box_width, 30.0);
    }

    #[test]
    fn test_quad_positions_and_uvs() {
        let layout = StringLayout::new("abc\ndef");
        let container = TextContainer::from_formatted(&formatted(), 1.0, &layout, &material());
        let geometries = container.node().geometries();
        let mesh = geometries[0].mesh();

        let positions = mesh.buffer(BufferType::Position).unwrap();
        // Baseline 15, bitmap top 10 above it: quad spans y -5..-15.
        assert_eq!(positions.vertex(0), Some(&[0.0, -5.0, 0.0][..]));
        assert_eq!(positions.vertex(2), Some(&[10.0, -15.0, 0.0][..]));

        let uvs = mesh.buffer(BufferType::TexCoord).unwrap();
        assert_eq!(uvs.vertex(2), Some(&[10.0 / 128.0, 10.0 / 128.0][..]));
    }

    #[test]
    fn test_max_lines() {
        let layout = StringLayout::new("abc\ndef").with_max_lines(1);
        let container = TextContainer::from_formatted(&formatted(), 1.0, &layout, &material());

        assert_eq!(container.node().geometries().len(), 1);
        assert_eq!(container.bounds().text_width, 30.0);
        assert_eq!(container.bounds().text_height, 20.0);

        let geometries = container.node().geometries();
        let positions = geometries[0].mesh().buffer(BufferType::Position).unwrap();
        assert_eq!(positions.vertex(8).map(|v| v[0]), Some(20.0));
    }

    #[test]
    fn test_clip_drops_glyphs_and_lines_outside_box() {
        let layout = StringLayout::new("abc\ndef")
            .with_wrap(WrapMode::Clip)
            .with_text_box(Rect::new(0.0, 0.0, 25.0, 30.0));
        let container = TextContainer::from_formatted(&formatted(), 1.0, &layout, &material());

        assert_eq!(container.node().geometries().len(), 1);
        assert_eq!(container.glyph_count(), 2);
        assert_eq!(container.bounds().box_width, 25.0);
        assert_eq!(container.bounds().box_height, 30.0);
    }

    #[test]
    fn test_vertical_alignment_and_scale() {
        let layout = StringLayout::new("abc\ndef")
            .with_alignment(Default::default(), VAlign::Bottom)
            .with_text_box(Rect::new(5.0, 100.0, 0.0, 60.0));
        let container = TextContainer::from_formatted(&formatted(), 0.5, &layout, &material());

        // Scaled text is 20 high in a 60 box: shifted down by 40.
        assert_eq!(container.bounds().text_height, 20.0);
        let geometries = container.node().geometries();
        let positions = geometries[0].mesh().buffer(BufferType::Position).unwrap();
        assert_eq!(positions.vertex(0), Some(&[5.0, 100.0 - (2.5 + 40.0), 0.0][..]));
    }

    #[test]
    fn test_empty_text_has_no_geometry() {
        let empty = FormattedText {
            shaped: ShapedText::default(),
            entries: HashMap::new(),
            atlas_size: Size::new(64, 64),
        };
        let container =
            TextContainer::from_formatted(&empty, 1.0, &StringLayout::new(""), &material());
        assert!(container.node().geometries().is_empty());
        assert_eq!(container.bounds(), TextBounds::default());
    }
}
