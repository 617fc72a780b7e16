//! Greedy text wrapping.
//!
//! Line breaks are computed once per text run ([`break_lines`]) and then positioned
//! ([`align_lines`]). Outline and fill passes share the same positioned lines, so the
//! two passes can never disagree on where a line breaks.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{Rect, TextAlign, TextStyle, FONT_WEIGHT_BOLD};

/// Line height as a multiple of font size.
pub const LINE_HEIGHT_FACTOR: f32 = 1.2;

/// Vertical padding added above and below the lines of a text box.
pub const TEXT_BOX_PADDING: f32 = 5.0;

/// Font description used for measuring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSpec<'a> {
    /// Family name.
    pub family: &'a str,
    /// Size in pixels.
    pub size: f32,
    /// Numeric weight.
    pub weight: u16,
}

impl FontSpec<'_> {
    /// Distance between consecutive baselines.
    #[must_use]
    pub fn line_height(&self) -> f32 {
        self.size * LINE_HEIGHT_FACTOR
    }
}

/// Measures the advance width of a run of text in a given font.
pub trait TextMeasure: Send + Sync {
    /// Width in pixels of `text` set in `font`.
    fn measure(&self, text: &str, font: &FontSpec<'_>) -> f32;
}

/// Font-independent measurer: every character advances half an em
/// (a little more when bold).
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicMeasure;

impl TextMeasure for HeuristicMeasure {
    #[allow(clippy::cast_precision_loss)]
    fn measure(&self, text: &str, font: &FontSpec<'_>) -> f32 {
        let em = if font.weight >= FONT_WEIGHT_BOLD { 0.55 } else { 0.5 };
        text.chars().count() as f32 * font.size * em
    }
}

/// Measurer where every character has the same advance, whatever the font.
#[derive(Debug, Clone, Copy)]
pub struct FixedAdvance(pub f32);

impl TextMeasure for FixedAdvance {
    #[allow(clippy::cast_precision_loss)]
    fn measure(&self, text: &str, _font: &FontSpec<'_>) -> f32 {
        text.chars().count() as f32 * self.0
    }
}

/// Shared handle to the measurer a document lays its text out with.
#[derive(Clone)]
pub struct MeasureHandle(Arc<dyn TextMeasure>);

impl MeasureHandle {
    /// Wrap a measurer.
    pub fn new(measure: impl TextMeasure + 'static) -> Self {
        Self(Arc::new(measure))
    }

    /// Wrap an already shared measurer.
    #[must_use]
    pub fn from_arc(measure: Arc<dyn TextMeasure>) -> Self {
        Self(measure)
    }

    /// Borrow the measurer.
    #[must_use]
    pub fn get(&self) -> &dyn TextMeasure {
        self.0.as_ref()
    }
}

impl Default for MeasureHandle {
    fn default() -> Self {
        Self::new(HeuristicMeasure)
    }
}

impl fmt::Debug for MeasureHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MeasureHandle(..)")
    }
}

/// A line produced by [`break_lines`] with its measured width.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasuredLine {
    /// Line text, words joined by single spaces.
    pub text: String,
    /// Measured width in pixels.
    pub width: f32,
}

/// A positioned line ready for painting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLine {
    /// Line text.
    pub text: String,
    /// Left edge of the line after alignment.
    pub x: f32,
    /// Top edge of the line.
    pub y: f32,
    /// Measured width in pixels.
    pub width: f32,
}

/// Split `text` on whitespace and greedily pack words into lines no wider than
/// `max_width`.
///
/// A word that overflows starts a new line; a single word wider than `max_width`
/// still gets its own line. At least one line is returned, even for empty input.
#[must_use]
pub fn break_lines(
    text: &str,
    max_width: f32,
    font: &FontSpec<'_>,
    measure: &dyn TextMeasure,
) -> Vec<MeasuredLine> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0.0;

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            current_width = measure.measure(&current, font);
            continue;
        }

        let candidate = format!("{current} {word}");
        let candidate_width = measure.measure(&candidate, font);
        if candidate_width > max_width {
            lines.push(MeasuredLine {
                text: std::mem::take(&mut current),
                width: current_width,
            });
            current.push_str(word);
            current_width = measure.measure(&current, font);
        } else {
            current = candidate;
            current_width = candidate_width;
        }
    }

    lines.push(MeasuredLine {
        text: current,
        width: current_width,
    });
    lines
}

/// Position broken lines inside a box of width `max_width` starting at `(x, y)`.
#[must_use]
pub fn align_lines(
    lines: &[MeasuredLine],
    x: f32,
    y: f32,
    max_width: f32,
    line_height: f32,
    align: TextAlign,
) -> Vec<TextLine> {
    let mut top = y;
    lines
        .iter()
        .map(|line| {
            let left = match align {
                TextAlign::Left => x,
                TextAlign::Center => x + (max_width - line.width) / 2.0,
                TextAlign::Right => x + (max_width - line.width),
            };
            let positioned = TextLine {
                text: line.text.clone(),
                x: left,
                y: top,
                width: line.width,
            };
            top += line_height;
            positioned
        })
        .collect()
}

/// Break and position `text` inside `area` (its width bounds the lines).
#[must_use]
pub fn wrap(
    text: &str,
    area: &Rect,
    line_height: f32,
    align: TextAlign,
    font: &FontSpec<'_>,
    measure: &dyn TextMeasure,
) -> Vec<TextLine> {
    let lines = break_lines(text, area.width, font, measure);
    align_lines(&lines, area.x, area.y, area.width, line_height, align)
}

/// Height of a text box holding `content` wrapped to `width`.
#[must_use]
pub fn fitted_height(content: &str, style: &TextStyle, width: f32, measure: &dyn TextMeasure) -> f32 {
    let font = style.font();
    let lines = break_lines(content, width, &font, measure);
    #[allow(clippy::cast_precision_loss)]
    let count = lines.len() as f32;
    count * font.line_height() + 2.0 * TEXT_BOX_PADDING
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const FONT: FontSpec<'static> = FontSpec {
        family: "Test",
        size: 10.0,
        weight: 400,
    };

    fn texts(lines: &[MeasuredLine]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn test_breaks_on_overflow() {
        // 10px per char: "a b" = 30px fits in 35, "a b c" = 50px does not.
        let lines = break_lines("a b c d", 35.0, &FONT, &FixedAdvance(10.0));
        assert_eq!(texts(&lines), vec!["a b", "c d"]);
        assert!((lines[0].width - 30.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_empty_input_yields_one_empty_line() {
        let lines = break_lines("", 100.0, &FONT, &FixedAdvance(10.0));
        assert_eq!(texts(&lines), vec![""]);
        let lines = break_lines("   ", 100.0, &FONT, &FixedAdvance(10.0));
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn test_long_word_keeps_own_line() {
        let lines = break_lines("tiny enormousword x", 50.0, &FONT, &FixedAdvance(10.0));
        assert_eq!(texts(&lines), vec!["tiny", "enormousword", "x"]);
    }

    #[test]
    fn test_alignment_offsets() {
        let lines = break_lines("ab", 100.0, &FONT, &FixedAdvance(10.0));
        let left = align_lines(&lines, 10.0, 5.0, 100.0, 12.0, TextAlign::Left);
        let center = align_lines(&lines, 10.0, 5.0, 100.0, 12.0, TextAlign::Center);
        let right = align_lines(&lines, 10.0, 5.0, 100.0, 12.0, TextAlign::Right);
        assert!((left[0].x - 10.0).abs() < f32::EPSILON);
        assert!((center[0].x - 50.0).abs() < f32::EPSILON);
        assert!((right[0].x - 90.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_vertical_advance_is_line_height() {
        let area = Rect::new(0.0, 100.0, 15.0, 0.0);
        let lines = wrap("a b c", &area, 12.0, TextAlign::Left, &FONT, &FixedAdvance(10.0));
        let tops: Vec<f32> = lines.iter().map(|l| l.y).collect();
        assert_eq!(tops, vec![100.0, 112.0, 124.0]);
    }

    #[test]
    fn test_fitted_height() {
        let style = TextStyle {
            font_size: 20.0,
            ..TextStyle::default()
        };
        // Two lines at 10px per char in a 35px box.
        let height = fitted_height("a b c d", &style, 35.0, &FixedAdvance(10.0));
        assert!((height - (2.0 * 24.0 + 10.0)).abs() < 1e-4);
    }

    #[test]
    fn test_heuristic_bold_is_wider() {
        let bold = FontSpec {
            weight: FONT_WEIGHT_BOLD,
            ..FONT
        };
        assert!(HeuristicMeasure.measure("abc", &bold) > HeuristicMeasure.measure("abc", &FONT));
    }

    proptest! {
        #[test]
        fn prop_wrap_is_deterministic(words in prop::collection::vec("[a-z]{1,8}", 0..20), width in 10.0f32..400.0) {
            let text = words.join(" ");
            let first = break_lines(&text, width, &FONT, &FixedAdvance(7.0));
            let second = break_lines(&text, width, &FONT, &FixedAdvance(7.0));
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_narrower_never_fewer_lines(words in prop::collection::vec("[a-z]{1,8}", 0..20), wide in 10.0f32..400.0, shrink in 0.0f32..1.0) {
            let text = words.join(" ");
            let narrow = wide * shrink;
            let wide_lines = break_lines(&text, wide, &FONT, &FixedAdvance(7.0)).len();
            let narrow_lines = break_lines(&text, narrow, &FONT, &FixedAdvance(7.0)).len();
            prop_assert!(narrow_lines >= wide_lines);
        }

        #[test]
        fn prop_lines_preserve_words(words in prop::collection::vec("[a-z]{1,8}", 1..20), width in 10.0f32..400.0) {
            let text = words.join(" ");
            let lines = break_lines(&text, width, &FONT, &FixedAdvance(7.0));
            let rejoined: Vec<String> = lines
                .iter()
                .flat_map(|l| l.text.split(' ').map(str::to_string))
                .collect();
            prop_assert_eq!(rejoined, words);
        }
    }
}
