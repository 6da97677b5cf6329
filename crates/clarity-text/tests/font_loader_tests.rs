//! Integration tests for font loading.

use clarity_core::config::ClarityConfig;
use clarity_test_utils::MockGlyphSource;
use clarity_text::{FontLoader, FontSource, FontStyle, FontSystem, TextError};

/// Just a TrueType header with a table record pointing past the end of the
/// data; no face can be parsed from it.
fn create_mock_ttf() -> Vec<u8> {
    vec![
        0x00, 0x01, 0x00, 0x00, // sfntVersion
        0x00, 0x01, // numTables
        0x00, 0x10, // searchRange
        0x00, 0x00, // entrySelector
        0x00, 0x10, // rangeShift
        b'h', b'e', b'a', b'd', // tag
        0x00, 0x00, 0x00, 0x00, // checksum
        0x00, 0x00, 0x00, 0x1C, // offset
        0x00, 0x00, 0x00, 0x10, // length
    ]
}

fn loader(config: ClarityConfig) -> FontLoader {
    FontLoader::new(FontSystem::empty(), config)
}

// ============================================================================
// Size Correction
// ============================================================================

#[test]
fn test_desktop_size_correction() {
    let loader = loader(ClarityConfig::default());
    let font = loader.load_with_source(
        Box::new(MockGlyphSource::new(4)),
        "Mock",
        FontStyle::Plain,
        10,
        0,
        72,
    );

    assert_eq!(font.point_size(), 13);
    assert!((font.scale() - 10.0 / 13.0).abs() < 1e-6);
    assert_eq!(font.scaled_point_size(), 10);
}

#[test]
fn test_handheld_loads_requested_size() {
    let config = ClarityConfig::handheld(320, 1024);
    assert_eq!(config.max_atlas_size, 1024);

    let loader = loader(config);
    let font = loader.load_with_source(
        Box::new(MockGlyphSource::new(4)),
        "Mock",
        FontStyle::Bold,
        10,
        1,
        320,
    );

    assert_eq!(font.point_size(), 10);
    assert_eq!(font.scale(), 1.0);
    assert_eq!(font.style(), FontStyle::Bold);
    assert_eq!(font.outline(), 1);
    assert_eq!(font.dpi(), 320);
    assert!((font.pixel_size() - 10.0 * 320.0 / 72.0).abs() < 1e-4);
}

// ============================================================================
// Preloading and Locking
// ============================================================================

#[test]
fn test_preload_and_lock() {
    let config = ClarityConfig::default()
        .with_preload("abc ")
        .with_locked_atlas(true);
    let source = MockGlyphSource::new(4);
    let log = source.log();

    let font = loader(config).load_with_source(
        Box::new(source),
        "Mock",
        FontStyle::Plain,
        60,
        0,
        72,
    );

    assert_eq!(log.layout_count(), 1);
    assert_eq!(log.rasterize_count(), 4);
    assert_eq!(font.atlas_glyph_count(), 4);
    assert!(font.is_locked());
}

#[test]
fn test_no_preload_by_default() {
    let source = MockGlyphSource::new(4);
    let log = source.log();
    let font = loader(ClarityConfig::default()).load_with_source(
        Box::new(source),
        "Mock",
        FontStyle::Plain,
        60,
        0,
        72,
    );

    assert_eq!(log.layout_count(), 0);
    assert_eq!(font.atlas_glyph_count(), 0);
    assert!(!font.is_locked());
}

// ============================================================================
// Antialiasing
// ============================================================================

fn soft_edged_font(config: ClarityConfig) -> clarity_text::FontHandle {
    loader(config.with_preload("a")).load_with_source(
        Box::new(MockGlyphSource::new(4).with_edge_coverage(100)),
        "Mock",
        FontStyle::Plain,
        60,
        0,
        72,
    )
}

#[test]
fn test_antialiased_coverage_is_kept() {
    let font = soft_edged_font(ClarityConfig::default());
    assert!(font.is_antialiased());

    let texture = font.atlas_texture();
    assert!(texture.pixels().contains(&100));
}

#[test]
fn test_no_derivatives_rasterizes_aliased() {
    let mut config = ClarityConfig::default();
    config.set_support_derivatives(true, false);
    let font = soft_edged_font(config);
    assert!(!font.is_antialiased());

    let texture = font.atlas_texture();
    let pixels = texture.pixels();
    assert!(pixels.iter().all(|p| *p == 0 || *p == 255));
    // Only the 2x2 interior of the 4px square survives the cutoff.
    assert_eq!(pixels.iter().filter(|p| **p == 255).count(), 4);
}

// ============================================================================
// Font Files
// ============================================================================

#[test]
fn test_missing_font_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let font_path = temp_dir.path().join("missing.ttf");

    let result = loader(ClarityConfig::default()).load_font(
        FontSource::Path(font_path.clone()),
        FontStyle::Plain,
        12,
        0,
    );
    assert_eq!(result.unwrap_err(), TextError::FontFileNotFound(font_path));
}

#[test]
fn test_invalid_font_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let font_path = temp_dir.path().join("broken.ttf");
    std::fs::write(&font_path, create_mock_ttf()).unwrap();

    let result = loader(ClarityConfig::default()).load_font(
        FontSource::Path(font_path),
        FontStyle::Plain,
        12,
        0,
    );
    assert!(matches!(result, Err(TextError::InvalidFontData(_))));
}

#[test]
fn test_invalid_font_bytes() {
    let result = loader(ClarityConfig::default()).load_font_dp(
        FontSource::Bytes(vec![0xde, 0xad, 0xbe, 0xef]),
        FontStyle::Italic,
        12,
        0,
    );
    assert!(matches!(result, Err(TextError::InvalidFontData(_))));
}
