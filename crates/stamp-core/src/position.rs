//! Anchor geometry
//!
//! Turns a named anchor such as `"bottom-right"` plus the page size and the
//! rendered text size into the baseline origin passed to `Td`.
//!
//! Anchor tokens are matched loosely: the horizontal class is found by
//! substring (`"center"` wins over `"right"`), the vertical class by prefix.
//! A bare `"center"` therefore centers horizontally but stays top-aligned.

/// Inset kept between the stamp and the page edges, in points
pub const DEFAULT_MARGIN: f64 = 36.0;

/// Page size in points, taken from the MediaBox
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
}

/// Rendered size of the stamp text
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
}

impl TextMetrics {
    /// The font size stands in for the text height (no ascent/descent).
    pub fn new(width: f64, font_size: f64) -> Self {
        Self {
            width,
            height: font_size,
        }
    }
}

/// Baseline origin of the stamp in PDF user space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Horizontal {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vertical {
    Top,
    Bottom,
    /// Neither "top" nor "bottom" prefix; resolves like `Top`
    Unqualified,
}

/// Raw anchor token as supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Anchor(String);

impl Anchor {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn horizontal(&self) -> Horizontal {
        if self.0.contains("center") {
            Horizontal::Center
        } else if self.0.contains("right") {
            Horizontal::Right
        } else {
            Horizontal::Left
        }
    }

    pub fn vertical(&self) -> Vertical {
        if self.0.starts_with("top") {
            Vertical::Top
        } else if self.0.starts_with("bottom") {
            Vertical::Bottom
        } else {
            Vertical::Unqualified
        }
    }
}

impl std::fmt::Display for Anchor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolve an anchor to the text origin.
///
/// No clamping is done: text wider than the page minus both margins yields
/// negative or off-page coordinates.
pub fn resolve_position(
    page: PageGeometry,
    text: TextMetrics,
    anchor: &Anchor,
    margin: f64,
) -> Position {
    let top = page.height - margin - text.height;

    let x = match anchor.horizontal() {
        Horizontal::Center => (page.width - text.width) / 2.0,
        Horizontal::Right => page.width - margin - text.width,
        Horizontal::Left => margin,
    };

    let y = match anchor.vertical() {
        Vertical::Bottom => margin,
        Vertical::Top | Vertical::Unqualified => top,
    };

    Position { x, y }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const LETTER: PageGeometry = PageGeometry {
        width: 612.0,
        height: 792.0,
    };

    fn resolve(anchor: &str, width: f64, size: f64) -> Position {
        resolve_position(
            LETTER,
            TextMetrics::new(width, size),
            &Anchor::new(anchor),
            DEFAULT_MARGIN,
        )
    }

    #[test]
    fn test_bottom_right_letter_page() {
        assert_eq!(resolve("bottom-right", 30.0, 11.0), Position { x: 546.0, y: 36.0 });
    }

    #[test]
    fn test_top_left() {
        assert_eq!(resolve("top-left", 30.0, 11.0), Position { x: 36.0, y: 745.0 });
    }

    #[test]
    fn test_top_right() {
        assert_eq!(resolve("top-right", 100.0, 12.0), Position { x: 476.0, y: 744.0 });
    }

    #[test]
    fn test_bottom_left() {
        assert_eq!(resolve("bottom-left", 100.0, 12.0), Position { x: 36.0, y: 36.0 });
    }

    #[test]
    fn test_bare_center_stays_top_aligned() {
        let pos = resolve("center", 100.0, 10.0);
        assert_eq!(pos, Position { x: 256.0, y: 746.0 });
    }

    #[test]
    fn test_bottom_center() {
        assert_eq!(resolve("bottom-center", 100.0, 10.0), Position { x: 256.0, y: 36.0 });
    }

    #[test]
    fn test_center_wins_over_right() {
        assert_eq!(resolve("top-center-right", 100.0, 10.0).x, 256.0);
    }

    #[test]
    fn test_unknown_anchor_falls_back_to_top_left() {
        assert_eq!(resolve("middle", 50.0, 11.0), Position { x: 36.0, y: 745.0 });
        assert_eq!(resolve("", 50.0, 11.0), Position { x: 36.0, y: 745.0 });
    }

    #[test]
    fn test_vertical_match_is_prefix_only() {
        // "right-bottom" contains "bottom" but does not start with it
        assert_eq!(resolve("right-bottom", 50.0, 11.0), Position { x: 526.0, y: 745.0 });
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        assert_eq!(resolve("Bottom-Right", 50.0, 11.0), Position { x: 36.0, y: 745.0 });
    }

    #[test]
    fn test_wide_text_is_not_clamped() {
        let pos = resolve("bottom-right", 700.0, 11.0);
        assert_eq!(pos.x, 612.0 - 36.0 - 700.0);
        assert!(pos.x < 0.0);
    }

    #[test]
    fn test_anchor_classification() {
        assert_eq!(Anchor::new("bottom-center").horizontal(), Horizontal::Center);
        assert_eq!(Anchor::new("bottom-center").vertical(), Vertical::Bottom);
        assert_eq!(Anchor::new("center").vertical(), Vertical::Unqualified);
        assert_eq!(Anchor::new("top-left").horizontal(), Horizontal::Left);
    }
}
