//! Display density classification and density-independent sizing.

use std::fmt;

/// General categories for grouping screen densities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GeneralDensity {
    /// ~120 dpi
    Ldpi,
    /// ~160 dpi
    Mdpi,
    /// ~240 dpi
    Hdpi,
    /// ~320 dpi
    Xhdpi,
    /// ~480 dpi
    Xxhdpi,
    /// ~640 dpi
    Xxxhdpi,
}

impl GeneralDensity {
    pub const ALL: [GeneralDensity; 6] = [
        GeneralDensity::Ldpi,
        GeneralDensity::Mdpi,
        GeneralDensity::Hdpi,
        GeneralDensity::Xhdpi,
        GeneralDensity::Xxhdpi,
        GeneralDensity::Xxxhdpi,
    ];

    /// Classify a screen density.
    pub fn from_dpi(dpi: u32) -> Self {
        match dpi {
            640.. => GeneralDensity::Xxxhdpi,
            480.. => GeneralDensity::Xxhdpi,
            320.. => GeneralDensity::Xhdpi,
            240.. => GeneralDensity::Hdpi,
            160.. => GeneralDensity::Mdpi,
            _ => GeneralDensity::Ldpi,
        }
    }

    /// Nominal dpi of the category.
    pub fn base_dpi(self) -> u32 {
        match self {
            GeneralDensity::Ldpi => 120,
            GeneralDensity::Mdpi => 160,
            GeneralDensity::Hdpi => 240,
            GeneralDensity::Xhdpi => 320,
            GeneralDensity::Xxhdpi => 480,
            GeneralDensity::Xxxhdpi => 640,
        }
    }

    pub fn previous(self) -> Option<Self> {
        let index = self as usize;
        index.checked_sub(1).map(|i| Self::ALL[i])
    }

    pub fn next(self) -> Option<Self> {
        Self::ALL.get(self as usize + 1).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GeneralDensity::Ldpi => "ldpi",
            GeneralDensity::Mdpi => "mdpi",
            GeneralDensity::Hdpi => "hdpi",
            GeneralDensity::Xhdpi => "xhdpi",
            GeneralDensity::Xxhdpi => "xxhdpi",
            GeneralDensity::Xxxhdpi => "xxxhdpi",
        }
    }
}

impl fmt::Display for GeneralDensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Screen density information used to scale sizes on handheld displays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayMetrics {
    pub dpi: u32,
    /// `None` on desktop displays, where resources are not density qualified.
    pub density: Option<GeneralDensity>,
    /// `dpi / 160`.
    pub density_scale: f32,
    /// `dpi` relative to the base dpi of its density category.
    pub relative_scale: f32,
}

impl DisplayMetrics {
    /// Desktop displays are treated as 72 dpi with no scaling.
    pub const fn desktop() -> Self {
        Self {
            dpi: 72,
            density: None,
            density_scale: 1.0,
            relative_scale: 1.0,
        }
    }

    /// Metrics for a handheld display. A dpi of 0 yields unit scales.
    pub fn from_dpi(dpi: u32) -> Self {
        let density = GeneralDensity::from_dpi(dpi);
        let (density_scale, relative_scale) = if dpi == 0 {
            (1.0, 1.0)
        } else {
            (dpi as f32 / 160.0, dpi as f32 / density.base_dpi() as f32)
        };
        Self {
            dpi,
            density: Some(density),
            density_scale,
            relative_scale,
        }
    }

    /// Scale a value by the screen density.
    pub fn dp(&self, value: f32) -> f32 {
        value * self.density_scale
    }

    pub fn dp_int(&self, value: i32) -> i32 {
        (value as f32 * self.density_scale).round() as i32
    }

    /// Scale a value relative to the density category's base density.
    ///
    /// Intended for textures that were authored per density category.
    pub fn dp_rel(&self, value: f32) -> f32 {
        value * self.relative_scale
    }

    /// Ordered lookup candidates for a density-qualified resource.
    ///
    /// For `ui/icon.png` on an hdpi display the order is `ui/hdpi/icon.png`,
    /// the lower categories, `ui/icon.png`, then the higher categories.
    /// Returns `None` when `path` names a directory.
    pub fn density_path_candidates(&self, path: &str) -> Option<Vec<String>> {
        let (dir, file) = match path.rfind('/') {
            Some(slash) if slash == path.len() - 1 => return None,
            Some(slash) => path.split_at(slash + 1),
            None => ("", path),
        };

        let Some(density) = self.density else {
            return Some(vec![path.to_string()]);
        };

        let qualified = |d: GeneralDensity| format!("{dir}{d}/{file}");
        let mut candidates = Vec::with_capacity(GeneralDensity::ALL.len() + 1);

        let mut current = Some(density);
        while let Some(d) = current {
            candidates.push(qualified(d));
            current = d.previous();
        }
        candidates.push(format!("{dir}{file}"));
        let mut current = density.next();
        while let Some(d) = current {
            candidates.push(qualified(d));
            current = d.next();
        }

        Some(candidates)
    }
}

impl Default for DisplayMetrics {
    fn default() -> Self {
        Self::desktop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert_eq!(GeneralDensity::from_dpi(100), GeneralDensity::Ldpi);
        assert_eq!(GeneralDensity::from_dpi(160), GeneralDensity::Mdpi);
        assert_eq!(GeneralDensity::from_dpi(239), GeneralDensity::Mdpi);
        assert_eq!(GeneralDensity::from_dpi(240), GeneralDensity::Hdpi);
        assert_eq!(GeneralDensity::from_dpi(320), GeneralDensity::Xhdpi);
        assert_eq!(GeneralDensity::from_dpi(480), GeneralDensity::Xxhdpi);
        assert_eq!(GeneralDensity::from_dpi(700), GeneralDensity::Xxxhdpi);
    }

    #[test]
    fn test_neighbours() {
        assert_eq!(GeneralDensity::Ldpi.previous(), None);
        assert_eq!(GeneralDensity::Mdpi.previous(), Some(GeneralDensity::Ldpi));
        assert_eq!(GeneralDensity::Xxxhdpi.next(), None);
        assert_eq!(GeneralDensity::Hdpi.next(), Some(GeneralDensity::Xhdpi));
    }

    #[test]
    fn test_scales() {
        let metrics = DisplayMetrics::from_dpi(360);
        assert_eq!(metrics.density, Some(GeneralDensity::Xhdpi));
        assert!((metrics.density_scale - 2.25).abs() < 1e-6);
        assert!((metrics.relative_scale - 1.125).abs() < 1e-6);
        assert_eq!(metrics.dp_int(10), 23);

        let ldpi = DisplayMetrics::from_dpi(0);
        assert_eq!(ldpi.density_scale, 1.0);
        assert_eq!(ldpi.relative_scale, 1.0);
    }

    #[test]
    fn test_desktop_candidates() {
        let metrics = DisplayMetrics::desktop();
        assert_eq!(
            metrics.density_path_candidates("ui/icon.png"),
            Some(vec!["ui/icon.png".to_string()])
        );
    }

    #[test]
    fn test_handheld_candidates() {
        let metrics = DisplayMetrics::from_dpi(240);
        let candidates = metrics.density_path_candidates("ui/icon.png").unwrap();
        assert_eq!(
            candidates,
            vec![
                "ui/hdpi/icon.png",
                "ui/mdpi/icon.png",
                "ui/ldpi/icon.png",
                "ui/icon.png",
                "ui/xhdpi/icon.png",
                "ui/xxhdpi/icon.png",
                "ui/xxxhdpi/icon.png",
            ]
        );
    }

    #[test]
    fn test_directory_path_rejected() {
        let metrics = DisplayMetrics::from_dpi(240);
        assert_eq!(metrics.density_path_candidates("ui/"), None);
        assert_eq!(
            metrics.density_path_candidates("icon.png").unwrap()[0],
            "hdpi/icon.png"
        );
    }
}
