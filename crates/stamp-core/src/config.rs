//! Process-wide stamping defaults

use crate::position::{Anchor, DEFAULT_MARGIN};

/// Noto Sans Regular from the Google Fonts repository
pub const DEFAULT_FONT_URL: &str =
    "https://cdn.jsdelivr.net/gh/google/fonts@main/ofl/notosans/NotoSans-Regular.ttf";
pub const DEFAULT_POSITION: &str = "bottom-right";
pub const DEFAULT_FONT_SIZE: f64 = 11.0;

/// Stamping configuration, built once at startup
#[derive(Debug, Clone, PartialEq)]
pub struct StampConfig {
    /// Remote TrueType font tried before falling back to Helvetica
    pub font_url: String,
    pub default_position: String,
    pub default_font_size: f64,
    pub margin: f64,
}

impl Default for StampConfig {
    fn default() -> Self {
        Self {
            font_url: DEFAULT_FONT_URL.to_string(),
            default_position: DEFAULT_POSITION.to_string(),
            default_font_size: DEFAULT_FONT_SIZE,
            margin: DEFAULT_MARGIN,
        }
    }
}

impl StampConfig {
    /// An absent `pos` uses the default; a present one is taken verbatim,
    /// even when empty.
    pub fn anchor(&self, pos: Option<&str>) -> Anchor {
        Anchor::new(pos.unwrap_or(&self.default_position))
    }

    pub fn font_size(&self, size: Option<&str>) -> f64 {
        parse_font_size(size, self.default_font_size)
    }
}

/// Lenient numeric parsing for the `size` query parameter.
///
/// Surrounding whitespace is ignored and a blank value counts as zero.
/// Anything that is not a finite number, or is too large for a PDF real,
/// yields `default`.
pub fn parse_font_size(raw: Option<&str>, default: f64) -> f64 {
    let Some(raw) = raw else {
        return default;
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    match trimmed.parse::<f64>() {
        Ok(size) if size.is_finite() && size.abs() <= f64::from(f32::MAX) => size,
        _ => default,
    }
}
