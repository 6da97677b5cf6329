use cosmic_text::{Attrs, fontdb};
use std::convert::Infallible;
use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, RwLock, RwLockWriteGuard};

use crate::error::{TextError, TextResult};

/// Family names the font system resolves through its fallback rules.
const GENERIC_FAMILIES: [&str; 3] = ["sans-serif", "serif", "monospace"];

/// A font database that manages available fonts.
pub struct FontDatabase {
    inner: fontdb::Database,
}

impl FontDatabase {
    /// Create a new font database with system fonts loaded.
    pub fn new() -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        Self { inner: db }
    }

    /// Create an empty font database.
    pub fn empty() -> Self {
        Self {
            inner: fontdb::Database::new(),
        }
    }

    /// Load a font from bytes, returning its family name.
    pub fn load_font_data(&mut self, data: Vec<u8>) -> TextResult<String> {
        load_into(&mut self.inner, data)
    }

    /// Query a font by family name.
    pub fn has_family(&self, family: &str) -> bool {
        self.inner
            .faces()
            .any(|face| face.families.iter().any(|(f, _)| f == family))
    }

    /// List all available font families.
    pub fn list_families(&self) -> Vec<String> {
        let mut families: Vec<String> = self
            .inner
            .faces()
            .flat_map(|face| face.families.iter().map(|(family, _)| family.clone()))
            .collect();
        families.sort();
        families.dedup();
        families
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for FontDatabase {
    fn default() -> Self {
        Self::new()
    }
}

fn load_into(db: &mut fontdb::Database, data: Vec<u8>) -> TextResult<String> {
    let ids = db.load_font_source(fontdb::Source::Binary(Arc::new(data)));
    ids.first()
        .and_then(|id| db.face(*id))
        .and_then(|face| face.families.first())
        .map(|(family, _)| family.clone())
        .ok_or_else(|| TextError::InvalidFontData("no font faces found".to_string()))
}

/// Font management system shared by every font loaded through it.
pub struct FontSystem {
    inner: Arc<RwLock<cosmic_text::FontSystem>>,
}

impl FontSystem {
    /// Create a new font system with the given font database.
    pub fn new(db: FontDatabase) -> Self {
        let cosmic_font_system = cosmic_text::FontSystem::new_with_locale_and_db(
            sys_locale::get_locale().unwrap_or_else(|| String::from("en-US")),
            db.inner,
        );
        Self {
            inner: Arc::new(RwLock::new(cosmic_font_system)),
        }
    }

    /// Create a new font system with system fonts.
    pub fn with_system_fonts() -> Self {
        Self::new(FontDatabase::new())
    }

    /// Create a font system that only knows explicitly loaded fonts.
    pub fn empty() -> Self {
        Self::new(FontDatabase::empty())
    }

    /// Register font bytes, returning the family name of the first face.
    pub fn load_font_data(&self, data: Vec<u8>) -> TextResult<String> {
        let mut font_system = lock(&self.inner);
        load_into(font_system.db_mut(), data)
    }

    /// Register a `.ttf`/`.otf` file, returning its family name.
    pub fn load_font_file(&self, path: impl AsRef<Path>) -> TextResult<String> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(TextError::FontFileNotFound(path.to_path_buf()));
        }
        let data = std::fs::read(path)?;
        self.load_font_data(data)
    }

    /// Whether shaping with `family` finds a face: a generic family or one
    /// that has been loaded.
    pub fn resolves_family(&self, family: &str) -> bool {
        GENERIC_FAMILIES.contains(&family) || self.has_family(family)
    }

    pub fn has_family(&self, family: &str) -> bool {
        lock(&self.inner)
            .db()
            .faces()
            .any(|face| face.families.iter().any(|(f, _)| f == family))
    }

    pub(crate) fn inner(&self) -> Arc<RwLock<cosmic_text::FontSystem>> {
        self.inner.clone()
    }
}

impl Default for FontSystem {
    fn default() -> Self {
        Self::with_system_fonts()
    }
}

/// Write access to the cosmic font system. A poisoned lock only means a
/// previous shaping call panicked; the font system itself stays usable.
pub(crate) fn lock(
    font_system: &RwLock<cosmic_text::FontSystem>,
) -> RwLockWriteGuard<'_, cosmic_text::FontSystem> {
    font_system
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Style a font is loaded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontStyle {
    #[default]
    Plain,
    Bold,
    Italic,
    BoldItalic,
}

impl FontStyle {
    /// Parse a style name. Unknown names are treated as plain.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "bold" => FontStyle::Bold,
            "italic" => FontStyle::Italic,
            "bolditalic" | "italicbold" => FontStyle::BoldItalic,
            _ => FontStyle::Plain,
        }
    }

    pub fn is_bold(self) -> bool {
        matches!(self, FontStyle::Bold | FontStyle::BoldItalic)
    }

    pub fn is_italic(self) -> bool {
        matches!(self, FontStyle::Italic | FontStyle::BoldItalic)
    }

    pub(crate) fn to_cosmic_weight(self) -> cosmic_text::Weight {
        if self.is_bold() {
            cosmic_text::Weight::BOLD
        } else {
            cosmic_text::Weight::NORMAL
        }
    }

    pub(crate) fn to_cosmic_style(self) -> cosmic_text::Style {
        if self.is_italic() {
            cosmic_text::Style::Italic
        } else {
            cosmic_text::Style::Normal
        }
    }
}

impl FromStr for FontStyle {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

/// Family and style used to shape text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FontAttributes {
    pub family: String,
    pub style: FontStyle,
}

impl FontAttributes {
    pub fn new(family: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            style: FontStyle::Plain,
        }
    }

    pub fn sans_serif() -> Self {
        Self::new("sans-serif")
    }

    pub fn monospace() -> Self {
        Self::new("monospace")
    }

    pub fn style(mut self, style: FontStyle) -> Self {
        self.style = style;
        self
    }

    pub(crate) fn to_cosmic(&self) -> Attrs<'_> {
        let family = match self.family.as_str() {
            "sans-serif" => cosmic_text::Family::SansSerif,
            "serif" => cosmic_text::Family::Serif,
            "monospace" => cosmic_text::Family::Monospace,
            name => cosmic_text::Family::Name(name),
        };
        Attrs::new()
            .family(family)
            .weight(self.style.to_cosmic_weight())
            .style(self.style.to_cosmic_style())
    }
}

impl Default for FontAttributes {
    fn default() -> Self {
        Self::sans_serif()
    }
}
