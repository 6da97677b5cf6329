//! Font loading with display size correction.

use std::path::PathBuf;

use clarity_core::config::{ClarityConfig, DeviceClass};

use crate::error::{TextError, TextResult};
use crate::font::{FontStyle, FontSystem};
use crate::handle::{FontDescriptor, FontHandle};
use crate::source::{CosmicGlyphSource, GlyphSource};

/// Where font data comes from.
#[derive(Debug, Clone)]
pub enum FontSource {
    /// A `.ttf`/`.otf` file.
    Path(PathBuf),
    /// Raw font file contents.
    Bytes(Vec<u8>),
    /// A family already known to the font system.
    Family(String),
}

/// Size a font is rasterized at and the scale that maps it back to the
/// requested size.
///
/// Small bitmap fonts look better on desktop displays when rasterized larger
/// and scaled down.
pub fn corrected_point_size(device: DeviceClass, point_size: u32) -> (u32, f32) {
    if device.is_handheld() || point_size == 0 {
        return (point_size, 1.0);
    }
    let factor = if point_size < 32 {
        0.73
    } else if point_size < 53 {
        0.84
    } else {
        return (point_size, 1.0);
    };
    let actual = ((point_size as f32 / factor).floor() as u32).max(1);
    (actual, point_size as f32 / actual as f32)
}

/// Loads fonts into a shared [`FontSystem`] and creates [`FontHandle`]s
/// configured from a [`ClarityConfig`].
pub struct FontLoader {
    font_system: FontSystem,
    config: ClarityConfig,
}

impl FontLoader {
    pub fn new(font_system: FontSystem, config: ClarityConfig) -> Self {
        Self {
            font_system,
            config,
        }
    }

    pub fn config(&self) -> &ClarityConfig {
        &self.config
    }

    pub fn font_system(&self) -> &FontSystem {
        &self.font_system
    }

    /// Load a font at 72 dpi.
    pub fn load_font(
        &self,
        source: FontSource,
        style: FontStyle,
        point_size: u32,
        outline: u32,
    ) -> TextResult<FontHandle> {
        self.load_font_with_dpi(source, style, point_size, outline, 72)
    }

    /// Load a font at the display's dpi.
    pub fn load_font_dp(
        &self,
        source: FontSource,
        style: FontStyle,
        point_size: u32,
        outline: u32,
    ) -> TextResult<FontHandle> {
        let dpi = self.config.display.dpi;
        self.load_font_with_dpi(source, style, point_size, outline, dpi)
    }

    pub fn load_font_with_dpi(
        &self,
        source: FontSource,
        style: FontStyle,
        point_size: u32,
        outline: u32,
        dpi: u32,
    ) -> TextResult<FontHandle> {
        let family = match source {
            FontSource::Path(path) => self.font_system.load_font_file(path)?,
            FontSource::Bytes(data) => self.font_system.load_font_data(data)?,
            FontSource::Family(family) => {
                if !self.font_system.resolves_family(&family) {
                    return Err(TextError::FontLoadError(format!(
                        "unknown font family '{}'",
                        family
                    )));
                }
                family
            }
        };
        let glyphs = CosmicGlyphSource::new(&self.font_system);
        Ok(self.load_with_source(Box::new(glyphs), family, style, point_size, outline, dpi))
    }

    /// Create a font over an arbitrary glyph source, applying size
    /// correction, preloading and atlas locking from the configuration.
    ///
    /// Without shader derivative support glyphs are rasterized aliased.
    pub fn load_with_source(
        &self,
        source: Box<dyn GlyphSource>,
        family: impl Into<String>,
        style: FontStyle,
        point_size: u32,
        outline: u32,
        dpi: u32,
    ) -> FontHandle {
        let (actual_size, scale) = corrected_point_size(self.config.device, point_size);
        let descriptor = FontDescriptor::new(family, actual_size)
            .style(style)
            .dpi(dpi)
            .scale(scale)
            .outline(outline)
            .antialias(self.config.support_derivatives)
            .atlas_sizes(self.config.initial_atlas_size, self.config.max_atlas_size);

        tracing::debug!(
            "Loading font '{}' {:?} at {}pt (requested {}pt, scale {:.3}, {} dpi)",
            descriptor.attributes.family,
            style,
            actual_size,
            point_size,
            scale,
            dpi
        );

        let font = FontHandle::new(descriptor, source);
        font.preload(&self.config.preload_characters);
        if self.config.lock_atlas {
            font.set_locked(true);
        }
        font
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_desktop_sizes_are_enlarged() {
        let (actual, scale) = corrected_point_size(DeviceClass::Desktop, 10);
        assert_eq!(actual, 13);
        assert!((scale - 10.0 / 13.0).abs() < 1e-6);

        let (actual, scale) = corrected_point_size(DeviceClass::Desktop, 40);
        assert_eq!(actual, 47);
        assert!((scale - 40.0 / 47.0).abs() < 1e-6);
    }

    #[test]
    fn test_large_and_handheld_sizes_are_untouched() {
        assert_eq!(corrected_point_size(DeviceClass::Desktop, 53), (53, 1.0));
        assert_eq!(corrected_point_size(DeviceClass::Desktop, 72), (72, 1.0));
        assert_eq!(corrected_point_size(DeviceClass::Handheld, 10), (10, 1.0));
    }

    #[test]
    fn test_missing_font_file() {
        let loader = FontLoader::new(FontSystem::empty(), ClarityConfig::default());
        let result = loader.load_font(
            FontSource::Path(PathBuf::from("/definitely/not/here.ttf")),
            FontStyle::Plain,
            12,
            0,
        );
        assert!(matches!(result, Err(TextError::FontFileNotFound(_))));
    }

    #[test]
    fn test_unknown_family() {
        let loader = FontLoader::new(FontSystem::empty(), ClarityConfig::default());
        let result = loader.load_font(
            FontSource::Family("Nowhere Sans".to_string()),
            FontStyle::Plain,
            12,
            0,
        );
        let err = result.unwrap_err();
        assert!(matches!(err, TextError::FontLoadError(_)));
        assert_eq!(
            err.to_string(),
            "Failed to load font: unknown font family 'Nowhere Sans'"
        );
    }
}
