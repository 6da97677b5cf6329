//! Integration tests for atlas growth notifications and text node
//! regeneration.

use clarity_core::config::ClarityConfig;
use clarity_core::geometry::Size;
use clarity_test_utils::{MOCK_FAMILY, mock_font_with};
use clarity_text::{FontDescriptor, FontHandle, MaterialCache, TextNode};

/// 16pt mock font (8px glyphs) whose atlas starts at 32x32 and holds nine
/// glyphs before it has to grow.
fn small_atlas_font() -> FontHandle {
    let (font, _log) = mock_font_with(FontDescriptor::new(MOCK_FAMILY, 16).atlas_sizes(32, 256));
    font
}

fn many_glyphs() -> String {
    ('A'..='Z').chain('0'..='9').chain("!#$%&".chars()).collect()
}

// ============================================================================
// Dimension Changes
// ============================================================================

#[test]
fn test_resize_triggers_single_regeneration() {
    let config = ClarityConfig::default();
    let font = small_atlas_font();
    let mut materials = MaterialCache::new();

    let mut first = TextNode::new("abc", &font, &mut materials, &config);
    let old_texture = font.atlas_texture().id();
    assert_eq!(first.atlas_size(), Size::new(32, 32));

    let _second = TextNode::new("defghijklmnop", &font, &mut materials, &config);
    assert_eq!(font.atlas_size(), Size::new(64, 64));
    assert_eq!(first.pending_atlas_events(), 1);

    assert!(first.process_atlas_events());
    assert_eq!(first.regenerations(), 2);
    assert_eq!(first.atlas_size(), Size::new(64, 64));

    let texture = font.atlas_texture().id();
    assert_ne!(texture, old_texture);
    assert_eq!(first.material().borrow().texture_id("Texture"), Some(texture));
    for geometry in first.geometries() {
        assert_eq!(geometry.material().borrow().texture_id("Texture"), Some(texture));
    }

    assert!(!first.process_atlas_events());
    assert_eq!(first.regenerations(), 2);
}

#[test]
fn test_multiple_resizes_coalesce() {
    let config = ClarityConfig::default();
    let font = small_atlas_font();
    let mut materials = MaterialCache::new();

    let mut first = TextNode::new("abc", &font, &mut materials, &config);
    let _second = TextNode::new("defghijklmnop", &font, &mut materials, &config);
    let _third = TextNode::new(many_glyphs(), &font, &mut materials, &config);

    assert_eq!(font.atlas_size(), Size::new(128, 128));
    assert_eq!(first.pending_atlas_events(), 2);

    assert!(first.process_atlas_events());
    assert_eq!(first.regenerations(), 2);
    assert_eq!(first.pending_atlas_events(), 0);
}

#[test]
fn test_self_caused_resize_is_not_regenerated_again() {
    let config = ClarityConfig::default();
    let font = small_atlas_font();
    let mut materials = MaterialCache::new();

    let mut node = TextNode::new("abc", &font, &mut materials, &config);
    node.set_text(many_glyphs());
    assert_eq!(node.regenerations(), 2);
    assert_eq!(node.pending_atlas_events(), 1);

    assert!(!node.process_atlas_events());
    assert_eq!(node.regenerations(), 2);
}

// ============================================================================
// Unchanged Dimensions
// ============================================================================

#[test]
fn test_unchanged_dimensions_do_not_regenerate() {
    let config = ClarityConfig::default();
    let font = small_atlas_font();
    let mut materials = MaterialCache::new();

    let mut first = TextNode::new("abc", &font, &mut materials, &config);
    let _second = TextNode::new("abd", &font, &mut materials, &config);

    assert_eq!(font.atlas_size(), Size::new(32, 32));
    assert_eq!(first.pending_atlas_events(), 1);
    assert!(!first.process_atlas_events());
    assert_eq!(first.regenerations(), 1);
}

#[test]
fn test_cached_glyphs_publish_nothing() {
    let config = ClarityConfig::default();
    let font = small_atlas_font();
    let mut materials = MaterialCache::new();

    let first = TextNode::new("abc", &font, &mut materials, &config);
    let _second = TextNode::new("cab", &font, &mut materials, &config);
    assert_eq!(first.pending_atlas_events(), 0);
}

// ============================================================================
// Subscriptions
// ============================================================================

#[test]
fn test_dropped_node_unsubscribes() {
    let config = ClarityConfig::default();
    let font = small_atlas_font();
    let mut materials = MaterialCache::new();

    let first = TextNode::new("abc", &font, &mut materials, &config);
    let second = TextNode::new("def", &font, &mut materials, &config);
    assert_eq!(font.subscriber_count(), 2);

    drop(second);
    assert_eq!(font.subscriber_count(), 1);
    drop(first);
    assert_eq!(font.subscriber_count(), 0);
}

#[test]
fn test_set_font_moves_subscription() {
    let config = ClarityConfig::default();
    let font = small_atlas_font();
    let other = small_atlas_font();
    let mut materials = MaterialCache::new();

    let mut node = TextNode::new("abc", &font, &mut materials, &config);
    node.set_font_cached(&other, &mut materials);

    assert_eq!(font.subscriber_count(), 0);
    assert_eq!(other.subscriber_count(), 1);
    assert_eq!(node.regenerations(), 2);
    assert_eq!(
        node.material().borrow().texture_id("Texture"),
        Some(other.atlas_texture().id())
    );
}

// ============================================================================
// Locked and Full Atlases
// ============================================================================

#[test]
fn test_locked_atlas_drops_new_glyphs() {
    let config = ClarityConfig::default();
    let font = small_atlas_font();
    let mut materials = MaterialCache::new();

    let _warm = TextNode::new("ab", &font, &mut materials, &config);
    font.set_locked(true);

    let node = TextNode::new("abc d", &font, &mut materials, &config);
    let geometries = node.geometries();
    assert_eq!(geometries.len(), 1);
    // Only 'a' and 'b' are in the atlas.
    assert_eq!(geometries[0].mesh().vertex_count(), 8);
    assert_eq!(font.atlas_size(), Size::new(32, 32));
}

#[test]
fn test_atlas_stops_at_max_size() {
    let (font, _log) = mock_font_with(FontDescriptor::new(MOCK_FAMILY, 16).atlas_sizes(32, 32));
    let mut materials = MaterialCache::new();

    let node = TextNode::new("abcdefghijkl", &font, &mut materials, &ClarityConfig::default());
    assert_eq!(font.atlas_size(), Size::new(32, 32));
    assert_eq!(font.atlas_glyph_count(), 9);
    assert_eq!(node.geometries()[0].mesh().vertex_count(), 9 * 4);
}

// ============================================================================
// Atlas Preview
// ============================================================================

#[test]
fn test_preview_follows_atlas() {
    let config = ClarityConfig::default();
    let font = small_atlas_font();
    let mut materials = MaterialCache::new();

    let mut node = TextNode::new("abc", &font, &mut materials, &config);
    node.attach_atlas_preview(128.0);
    assert_eq!(
        node.atlas_preview().and_then(|p| p.texture_id()),
        Some(font.atlas_texture().id())
    );

    let _other = TextNode::new(many_glyphs(), &font, &mut materials, &config);
    node.process_atlas_events();

    assert_eq!(
        node.atlas_preview().and_then(|p| p.texture_id()),
        Some(font.atlas_texture().id())
    );
}
