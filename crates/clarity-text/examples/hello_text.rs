//! Hello Text - glyph-atlas text nodes over system fonts
//!
//! Builds a few text nodes sharing one font, lets them grow the font's
//! atlas, and shows how nodes pick up the resized atlas on the next frame.
//!
//! Run with:
//!   cargo run -p clarity-text --example hello_text
//!
//! Set `RUST_LOG=clarity_text=trace` for per-glyph and cache logging, and
//! open puffin_viewer on 127.0.0.1:8585 to see the profiling scopes.

use clarity_core::config::ClarityConfig;
use clarity_core::geometry::Rect;
use clarity_core::logging;
use clarity_core::math::Vec3;
use clarity_core::profiling::{init_profiling, new_frame, profile_scope};
use clarity_render::Color;
use clarity_scene::{RenderBucket, RenderQueue};
use clarity_text::{
    FontLoader, FontSource, FontStyle, FontSystem, MaterialCache, TextNode, TextResult,
};

const PANGRAM: &str = "The quick brown fox jumps over the lazy dog. \
                       Pack my box with five dozen liquor jugs!";

fn main() -> TextResult<()> {
    logging::init();
    init_profiling("127.0.0.1:8585");

    let config = ClarityConfig::default()
        .with_atlas_sizes(128, 1024)
        .with_preload("0123456789");
    let loader = FontLoader::new(FontSystem::with_system_fonts(), config.clone());
    let font = loader.load_font(
        FontSource::Family("sans-serif".to_string()),
        FontStyle::from_name("bold"),
        18,
        0,
    )?;
    let mut materials = MaterialCache::new();

    let mut title = TextNode::new("Clarity", &font, &mut materials, &config);
    title.set_color(Color::from_hex(0xffcc33));
    title.attach_atlas_preview(128.0).set_translation(Vec3::new(400.0, 0.0, 0.0));

    let mut body = TextNode::new(PANGRAM, &font, &mut materials, &config);
    body.set_wrap_mode("word".parse()?);
    body.set_h_alignment("center".parse()?);
    body.set_text_box(Rect::new(0.0, -40.0, 240.0, 0.0));
    body.set_translation(Vec3::new(0.0, 0.0, 1.0));

    for frame in 0..3 {
        new_frame();
        profile_scope!("frame");

        body.set_text(format!("{} ({})", PANGRAM, frame));
        for node in [&mut title, &mut body] {
            if node.process_atlas_events() {
                tracing::info!("'{}' regenerated after atlas resize", node.text());
            }
        }

        let mut queue = RenderQueue::new();
        queue.collect(&title);
        queue.collect(&body);
        queue.sort_transparent();

        tracing::info!(
            "frame {}: {} transparent geometries, atlas {:?}, body {:.1}x{:.1}",
            frame,
            queue.bucket(RenderBucket::Transparent).len(),
            font.atlas_size(),
            body.text_width(),
            body.text_height(),
        );
    }

    tracing::info!(
        "materials: {} cached, {:?}; regenerations: title {}, body {}",
        materials.len(),
        materials.stats(),
        title.regenerations(),
        body.regenerations(),
    );
    Ok(())
}
