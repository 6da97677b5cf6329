/// Errors that can occur in the text system.
#[derive(Debug, Clone, PartialEq)]
pub enum TextError {
    /// Font loading failed.
    FontLoadError(String),

    /// Font file not found.
    FontFileNotFound(std::path::PathBuf),

    /// Invalid font data.
    InvalidFontData(String),

    /// A string did not name a known option (alignment, wrap mode, ...).
    UnknownOption { kind: &'static str, value: String },

    /// The glyph does not fit even in an atlas of maximum size.
    AtlasFull {
        requested_width: u32,
        requested_height: u32,
        atlas_width: u32,
        atlas_height: u32,
    },

    /// The atlas is locked and accepts no new glyphs.
    AtlasLocked,

    /// Generic IO error.
    IoError(String),
}

impl std::fmt::Display for TextError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TextError::FontLoadError(msg) => write!(f, "Failed to load font: {}", msg),
            TextError::FontFileNotFound(path) => {
                write!(f, "Font file not found: {}", path.display())
            }
            TextError::InvalidFontData(msg) => write!(f, "Invalid font data: {}", msg),
            TextError::UnknownOption { kind, value } => {
                write!(f, "Unknown {}: '{}'", kind, value)
            }
            TextError::AtlasFull {
                requested_width,
                requested_height,
                atlas_width,
                atlas_height,
            } => write!(
                f,
                "Glyph atlas is full: requested {}x{} but atlas is {}x{}",
                requested_width, requested_height, atlas_width, atlas_height
            ),
            TextError::AtlasLocked => write!(f, "Glyph atlas is locked"),
            TextError::IoError(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for TextError {}

impl From<std::io::Error> for TextError {
    fn from(err: std::io::Error) -> Self {
        TextError::IoError(err.to_string())
    }
}

/// Result type for text operations.
pub type TextResult<T> = Result<T, TextError>;
