//! Render parameters and their invariants (made by FontLab https://www.fontlab.com/)

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AsciiLabError;

/// Text shown when nothing has been restored from a shared link.
pub const DEFAULT_TEXT: &str = "ASCII Lab";
/// The one typeface that ships with every engine and is never probed.
pub const DEFAULT_TYPEFACE: &str = "Standard";
/// Preview content when the text is blank.
pub const PLACEHOLDER_OUTPUT: &str = "(rendered ASCII will show here)";
/// Preview content when even the default typeface fails.
pub const FATAL_OUTPUT: &str = "Failed to load font.";

pub const MAX_TEXT_CHARS: usize = 100;

pub const DEFAULT_WIDTH: u16 = 80;
pub const MIN_WIDTH: u16 = 10;
pub const MAX_WIDTH: u16 = 200;
/// Width handed to the engine when auto-width is on.
pub const UNBOUNDED_WIDTH: u16 = 1000;

pub const DEFAULT_PREVIEW_SIZE: u8 = 12;
pub const MIN_PREVIEW_SIZE: u8 = 10;
pub const MAX_PREVIEW_SIZE: u8 = 20;

/// How adjacent glyphs are spaced or overlapped along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Layout {
    #[default]
    Default,
    Full,
    Fitted,
    ControlledSmushing,
    UniversalSmushing,
}

impl Layout {
    pub const ALL: [Layout; 5] = [
        Layout::Default,
        Layout::Full,
        Layout::Fitted,
        Layout::ControlledSmushing,
        Layout::UniversalSmushing,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Layout::Default => "default",
            Layout::Full => "full",
            Layout::Fitted => "fitted",
            Layout::ControlledSmushing => "controlled smushing",
            Layout::UniversalSmushing => "universal smushing",
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Layout {
    type Err = AsciiLabError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Layout::ALL
            .into_iter()
            .find(|layout| layout.as_str() == raw)
            .ok_or_else(|| AsciiLabError::SerializedStateDecodeFailure {
                key: "layout".to_string(),
                value: raw.to_string(),
            })
    }
}

impl From<Layout> for String {
    fn from(layout: Layout) -> Self {
        layout.as_str().to_string()
    }
}

impl TryFrom<String> for Layout {
    type Error = AsciiLabError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

/// Width the engine should wrap at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    Fixed(u16),
    Unbounded,
}

impl Width {
    pub fn columns(self) -> u16 {
        match self {
            Width::Fixed(n) => n,
            Width::Unbounded => UNBOUNDED_WIDTH,
        }
    }
}

/// Everything the user can tweak about a render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderParameters {
    pub text: String,
    pub typeface: String,
    pub width: u16,
    pub auto_width: bool,
    pub preview_size: u8,
    pub horizontal_layout: Layout,
    pub vertical_layout: Layout,
}

impl Default for RenderParameters {
    fn default() -> Self {
        Self {
            text: DEFAULT_TEXT.to_string(),
            typeface: DEFAULT_TYPEFACE.to_string(),
            width: DEFAULT_WIDTH,
            auto_width: false,
            preview_size: DEFAULT_PREVIEW_SIZE,
            horizontal_layout: Layout::Default,
            vertical_layout: Layout::Default,
        }
    }
}

impl RenderParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, text: impl AsRef<str>) -> Self {
        self.text = clamp_text(text.as_ref());
        self
    }

    pub fn with_typeface(mut self, typeface: impl Into<String>) -> Self {
        self.typeface = typeface.into();
        self
    }

    pub fn with_width(mut self, width: i64) -> Self {
        self.width = clamp_width(width);
        self
    }

    pub fn with_auto_width(mut self, yes: bool) -> Self {
        self.auto_width = yes;
        self
    }

    pub fn with_preview_size(mut self, size: i64) -> Self {
        self.preview_size = clamp_preview_size(size);
        self
    }

    pub fn with_layouts(mut self, horizontal: Layout, vertical: Layout) -> Self {
        self.horizontal_layout = horizontal;
        self.vertical_layout = vertical;
        self
    }

    /// Width to hand to the engine, honouring auto-width.
    pub fn effective_width(&self) -> Width {
        if self.auto_width {
            Width::Unbounded
        } else {
            Width::Fixed(self.width)
        }
    }

    /// Check the range and length invariants (catalog membership is the session's job).
    pub fn is_within_bounds(&self) -> bool {
        self.text.chars().count() <= MAX_TEXT_CHARS
            && (MIN_WIDTH..=MAX_WIDTH).contains(&self.width)
            && (MIN_PREVIEW_SIZE..=MAX_PREVIEW_SIZE).contains(&self.preview_size)
    }
}

pub fn clamp_text(text: &str) -> String {
    text.chars().take(MAX_TEXT_CHARS).collect()
}

pub fn clamp_width(width: i64) -> u16 {
    width.clamp(MIN_WIDTH as i64, MAX_WIDTH as i64) as u16
}

pub fn clamp_preview_size(size: i64) -> u8 {
    size.clamp(MIN_PREVIEW_SIZE as i64, MAX_PREVIEW_SIZE as i64) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_strings_round_trip() {
        for layout in Layout::ALL {
            assert_eq!(layout.as_str().parse::<Layout>().unwrap(), layout);
        }
        assert!("smushed".parse::<Layout>().is_err());
    }

    #[test]
    fn builders_clamp_into_bounds() {
        let params = RenderParameters::new()
            .with_width(5)
            .with_preview_size(99)
            .with_text("x".repeat(250));

        assert_eq!(params.width, MIN_WIDTH);
        assert_eq!(params.preview_size, MAX_PREVIEW_SIZE);
        assert_eq!(params.text.chars().count(), MAX_TEXT_CHARS);
        assert!(params.is_within_bounds());
    }

    #[test]
    fn auto_width_requests_unbounded_output() {
        let params = RenderParameters::new().with_width(120).with_auto_width(true);
        assert_eq!(params.effective_width(), Width::Unbounded);
        assert_eq!(params.effective_width().columns(), UNBOUNDED_WIDTH);

        let fixed = params.with_auto_width(false);
        assert_eq!(fixed.effective_width(), Width::Fixed(120));
    }
}
