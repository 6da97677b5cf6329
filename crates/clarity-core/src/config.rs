//! Configuration for the Clarity text stack.
//!
//! A single [`ClarityConfig`] value is created by the application and passed
//! by reference to the font loader and the text nodes. Nothing here is
//! global.

use crate::platform::DisplayMetrics;

/// Broad class of the device the application runs on.
///
/// Handheld devices render fonts at their requested size and keep the
/// kerning chosen by the application; desktop displays get size correction
/// and tiered kerning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceClass {
    #[default]
    Desktop,
    Handheld,
}

impl DeviceClass {
    pub fn is_handheld(self) -> bool {
        matches!(self, DeviceClass::Handheld)
    }
}

/// Kerning applied to bitmap fonts on desktop displays, chosen by the
/// font's scaled point size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KerningTiers {
    /// Sizes strictly below this get [`KerningTiers::small`].
    pub small_below: u32,
    /// Sizes strictly below this (and not small) get [`KerningTiers::medium`].
    pub medium_below: u32,
    pub small: i32,
    pub medium: i32,
    pub large: i32,
}

impl Default for KerningTiers {
    fn default() -> Self {
        Self {
            small_below: 17,
            medium_below: 23,
            small: 2,
            medium: 1,
            large: 0,
        }
    }
}

impl KerningTiers {
    /// Kerning in pixels for a scaled point size.
    pub fn kerning_for(&self, scaled_point_size: u32) -> i32 {
        if scaled_point_size < self.small_below {
            self.small
        } else if scaled_point_size < self.medium_below {
            self.medium
        } else {
            self.large
        }
    }
}

/// Configuration shared by font loading and text nodes.
#[derive(Debug, Clone)]
pub struct ClarityConfig {
    pub device: DeviceClass,
    pub kerning: KerningTiers,
    /// Edge length of a freshly created glyph atlas. Must be a power of two.
    pub initial_atlas_size: u32,
    /// Largest edge length an atlas may grow to.
    pub max_atlas_size: u32,
    /// Characters rasterized into every atlas when a font is loaded.
    pub preload_characters: String,
    /// Lock atlases after preloading so they never grow.
    pub lock_atlas: bool,
    /// Whether shader derivatives are enabled for antialiased materials.
    pub support_derivatives: bool,
    pub display: DisplayMetrics,
}

impl Default for ClarityConfig {
    fn default() -> Self {
        Self {
            device: DeviceClass::Desktop,
            kerning: KerningTiers::default(),
            initial_atlas_size: 256,
            max_atlas_size: 2048,
            preload_characters: String::new(),
            lock_atlas: false,
            support_derivatives: true,
            display: DisplayMetrics::desktop(),
        }
    }
}

impl ClarityConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration for a handheld device with the given screen density.
    ///
    /// Handheld GPUs that report a max texture size below 2048 get a 1024
    /// atlas limit.
    pub fn handheld(dpi: u32, max_texture_size: u32) -> Self {
        Self {
            device: DeviceClass::Handheld,
            max_atlas_size: if max_texture_size < 2048 { 1024 } else { 2048 },
            display: DisplayMetrics::from_dpi(dpi),
            ..Default::default()
        }
    }

    pub fn with_kerning(mut self, kerning: KerningTiers) -> Self {
        self.kerning = kerning;
        self
    }

    pub fn with_atlas_sizes(mut self, initial: u32, max: u32) -> Self {
        self.initial_atlas_size = initial;
        self.max_atlas_size = max;
        self
    }

    pub fn with_preload(mut self, characters: impl Into<String>) -> Self {
        self.preload_characters = characters.into();
        self
    }

    pub fn with_locked_atlas(mut self, lock: bool) -> Self {
        self.lock_atlas = lock;
        self
    }

    /// Enable or disable derivative support. Enabling has no effect when
    /// the device never reported support.
    pub fn set_support_derivatives(&mut self, support: bool, device_supports: bool) {
        self.support_derivatives = support && device_supports;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tiers() {
        let tiers = KerningTiers::default();
        assert_eq!(tiers.kerning_for(10), 2);
        assert_eq!(tiers.kerning_for(16), 2);
        assert_eq!(tiers.kerning_for(17), 1);
        assert_eq!(tiers.kerning_for(22), 1);
        assert_eq!(tiers.kerning_for(23), 0);
        assert_eq!(tiers.kerning_for(30), 0);
    }

    #[test]
    fn test_custom_tiers() {
        let tiers = KerningTiers {
            small_below: 12,
            medium_below: 14,
            small: 3,
            medium: 2,
            large: 1,
        };
        assert_eq!(tiers.kerning_for(11), 3);
        assert_eq!(tiers.kerning_for(13), 2);
        assert_eq!(tiers.kerning_for(40), 1);
    }

    #[test]
    fn test_handheld_atlas_limit() {
        assert_eq!(ClarityConfig::handheld(320, 1024).max_atlas_size, 1024);
        assert_eq!(ClarityConfig::handheld(320, 4096).max_atlas_size, 2048);
        assert!(ClarityConfig::handheld(320, 4096).device.is_handheld());
    }

    #[test]
    fn test_derivatives_require_device_support() {
        let mut config = ClarityConfig::default();
        config.set_support_derivatives(true, false);
        assert!(!config.support_derivatives);
        config.set_support_derivatives(true, true);
        assert!(config.support_derivatives);
    }
}
