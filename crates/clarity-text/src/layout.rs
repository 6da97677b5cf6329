//! Layout configuration owned by a text node.

use std::fmt;
use std::str::FromStr;

use clarity_core::geometry::Rect;

use crate::error::TextError;

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl HAlign {
    /// Offset of a line `content` wide inside `available` width.
    pub fn offset(self, available: f32, content: f32) -> f32 {
        match self {
            HAlign::Left => 0.0,
            HAlign::Center => (available - content) / 2.0,
            HAlign::Right => available - content,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HAlign::Left => "left",
            HAlign::Center => "center",
            HAlign::Right => "right",
        }
    }
}

impl FromStr for HAlign {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(HAlign::Left),
            "center" => Ok(HAlign::Center),
            "right" => Ok(HAlign::Right),
            _ => Err(TextError::UnknownOption {
                kind: "horizontal alignment",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for HAlign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vertical alignment of the text block inside the text box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VAlign {
    #[default]
    Top,
    Center,
    Bottom,
}

impl VAlign {
    pub fn as_str(self) -> &'static str {
        match self {
            VAlign::Top => "top",
            VAlign::Center => "center",
            VAlign::Bottom => "bottom",
        }
    }

    /// Offset of a block of `content` height inside a box of `available`
    /// height.
    pub fn offset(self, available: f32, content: f32) -> f32 {
        match self {
            VAlign::Top => 0.0,
            VAlign::Center => (available - content) / 2.0,
            VAlign::Bottom => available - content,
        }
    }
}

impl FromStr for VAlign {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" => Ok(VAlign::Top),
            "center" => Ok(VAlign::Center),
            "bottom" => Ok(VAlign::Bottom),
            _ => Err(TextError::UnknownOption {
                kind: "vertical alignment",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for VAlign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How lines break and whether glyphs past the text box are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WrapMode {
    #[default]
    NoWrap,
    Char,
    Word,
    CharClip,
    WordClip,
    Clip,
}

impl WrapMode {
    pub(crate) fn to_cosmic(self) -> cosmic_text::Wrap {
        match self {
            WrapMode::NoWrap | WrapMode::Clip => cosmic_text::Wrap::None,
            WrapMode::Char | WrapMode::CharClip => cosmic_text::Wrap::Glyph,
            WrapMode::Word | WrapMode::WordClip => cosmic_text::Wrap::Word,
        }
    }

    /// Whether lines are broken when they exceed the text box width.
    pub fn wraps(self) -> bool {
        !matches!(self, WrapMode::NoWrap | WrapMode::Clip)
    }

    /// Whether glyphs outside the text box are dropped.
    pub fn clips(self) -> bool {
        matches!(self, WrapMode::CharClip | WrapMode::WordClip | WrapMode::Clip)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WrapMode::NoWrap => "no-wrap",
            WrapMode::Char => "char",
            WrapMode::Word => "word",
            WrapMode::CharClip => "char-clip",
            WrapMode::WordClip => "word-clip",
            WrapMode::Clip => "clip",
        }
    }
}

impl FromStr for WrapMode {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "no-wrap" | "nowrap" | "none" => Ok(WrapMode::NoWrap),
            "char" => Ok(WrapMode::Char),
            "word" => Ok(WrapMode::Word),
            "char-clip" => Ok(WrapMode::CharClip),
            "word-clip" => Ok(WrapMode::WordClip),
            "clip" => Ok(WrapMode::Clip),
            _ => Err(TextError::UnknownOption {
                kind: "wrap mode",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for WrapMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything that determines the generated text geometry, apart from the
/// font itself.
#[derive(Debug, Clone, PartialEq)]
pub struct StringLayout {
    pub text: String,
    /// Maximum number of visual lines; 0 means unlimited.
    pub max_lines: u32,
    pub wrap: WrapMode,
    pub h_align: HAlign,
    pub v_align: VAlign,
    /// Extra pixels between consecutive glyphs on a line.
    pub kerning: i32,
    /// Layout box. A width of 0 disables wrapping, a height of 0 disables
    /// vertical clipping and alignment.
    pub text_box: Rect<f32>,
}

impl StringLayout {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            max_lines: 0,
            wrap: WrapMode::default(),
            h_align: HAlign::default(),
            v_align: VAlign::default(),
            kerning: 0,
            text_box: Rect::ZERO,
        }
    }

    pub fn with_text_box(mut self, text_box: Rect<f32>) -> Self {
        self.text_box = text_box;
        self
    }

    pub fn with_wrap(mut self, wrap: WrapMode) -> Self {
        self.wrap = wrap;
        self
    }

    pub fn with_alignment(mut self, h_align: HAlign, v_align: VAlign) -> Self {
        self.h_align = h_align;
        self.v_align = v_align;
        self
    }

    pub fn with_max_lines(mut self, max_lines: u32) -> Self {
        self.max_lines = max_lines;
        self
    }

    /// Width lines are aligned within, if the text box has one.
    pub fn layout_width(&self) -> Option<f32> {
        (self.text_box.width > 0.0).then_some(self.text_box.width)
    }
}

impl Default for StringLayout {
    fn default() -> Self {
        Self::new("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_alignment() {
        assert_eq!("left".parse::<HAlign>().unwrap(), HAlign::Left);
        assert_eq!("Center".parse::<HAlign>().unwrap(), HAlign::Center);
        assert_eq!("right".parse::<HAlign>().unwrap(), HAlign::Right);
        assert_eq!("bottom".parse::<VAlign>().unwrap(), VAlign::Bottom);
        assert!("middle".parse::<HAlign>().is_err());
    }

    #[test]
    fn test_parse_wrap_modes() {
        for mode in [
            WrapMode::NoWrap,
            WrapMode::Char,
            WrapMode::Word,
            WrapMode::CharClip,
            WrapMode::WordClip,
            WrapMode::Clip,
        ] {
            assert_eq!(mode.as_str().parse::<WrapMode>().unwrap(), mode);
        }

        let err = "hyphenate".parse::<WrapMode>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown wrap mode: 'hyphenate'");
    }

    #[test]
    fn test_layout_width_requires_box() {
        let layout = StringLayout::new("abc").with_wrap(WrapMode::Word);
        assert_eq!(layout.layout_width(), None);

        let layout = layout.with_text_box(Rect::new(0.0, 0.0, 120.0, 0.0));
        assert_eq!(layout.layout_width(), Some(120.0));
        assert!(layout.wrap.wraps());

        let layout = layout.with_wrap(WrapMode::Clip);
        assert_eq!(layout.layout_width(), Some(120.0));
        assert!(!layout.wrap.wraps());
        assert!(layout.wrap.clips());
    }

    #[test]
    fn test_alignment_offsets() {
        assert_eq!(VAlign::Top.offset(100.0, 40.0), 0.0);
        assert_eq!(VAlign::Center.offset(100.0, 40.0), 30.0);
        assert_eq!(VAlign::Bottom.offset(100.0, 40.0), 60.0);
        assert_eq!(HAlign::Left.offset(40.0, 38.0), 0.0);
        assert_eq!(HAlign::Center.offset(40.0, 38.0), 1.0);
        assert_eq!(HAlign::Right.offset(40.0, 38.0), 2.0);
    }
}
