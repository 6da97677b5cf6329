//! Clarity Text - glyph-atlas text nodes
//!
//! This crate turns strings into scene geometry textured from a per-font
//! glyph atlas:
//! - Font loading into a shared `cosmic-text` font system, with desktop size
//!   correction, preloading and atlas locking
//! - A growable glyph atlas that notifies subscribers when it is resized
//! - Shared text materials keyed by font, fill color and outline color
//! - [`TextNode`], which regenerates its geometry whenever its text, layout,
//!   font or atlas size changes
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use clarity_core::config::ClarityConfig;
//! use clarity_render::Color;
//! use clarity_text::{FontLoader, FontSource, FontStyle, FontSystem, MaterialCache, TextNode};
//!
//! let config = ClarityConfig::default();
//! let loader = FontLoader::new(FontSystem::with_system_fonts(), config.clone());
//! let font = loader
//!     .load_font(FontSource::Family("sans-serif".into()), FontStyle::Plain, 24, 0)
//!     .unwrap();
//!
//! let mut materials = MaterialCache::new();
//! let mut label = TextNode::new("Hello, World!", &font, &mut materials, &config);
//! label.set_color(Color::rgb(1.0, 0.8, 0.2));
//!
//! // After other nodes added glyphs to the same font:
//! label.process_atlas_events();
//! ```
//!
//! ## Examples
//!
//! ```bash
//! cargo run --package clarity-text --example hello_text
//! ```

pub mod atlas;
pub mod container;
pub mod error;
pub mod font;
pub mod handle;
pub mod layout;
pub mod loader;
pub mod material;
pub mod node;
pub mod preview;
pub mod source;

pub use atlas::{AtlasEntry, AtlasEvent, AtlasSubscription, GlyphAtlas};
pub use container::{TextBounds, TextContainer};
pub use error::{TextError, TextResult};
pub use font::{FontAttributes, FontDatabase, FontStyle, FontSystem};
pub use handle::{FontDescriptor, FontHandle, FontId, FormattedText};
pub use layout::{HAlign, StringLayout, VAlign, WrapMode};
pub use loader::{FontLoader, FontSource, corrected_point_size};
pub use material::{MaterialCache, MaterialCacheStats, MaterialKey};
pub use node::TextNode;
pub use preview::AtlasPreview;
pub use source::{
    CosmicGlyphSource, GlyphBitmap, GlyphKey, GlyphSource, LayoutRequest, ShapedGlyph,
    ShapedLine, ShapedText,
};

// Re-export Color from clarity-render
pub use clarity_render::Color;
