//! Static font metrics and the built-in `MetricTextMeasurer`.
//!
//! Character widths are grouped into a handful of classes (narrow, lowercase, wide,
//! capitals, digits, punctuation) in em units. This is an approximation of real glyph
//! advances, good enough for deciding which steps fit a column on the server side.
//! A renderer with real layout can plug its own `TextMeasurer` instead.

use serde::{Deserialize, Serialize};

use crate::layout::measure::{ContentBlock, Measured, TextMeasurer};

// ────────────────────────────────────────────────────────────────────────────
// Font family
// ────────────────────────────────────────────────────────────────────────────

/// Typefaces of the cookbook print template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFamily {
    /// Body serif used by the print edition.
    Serif,
    /// Humanist sans used by the on-screen preview.
    Sans,
}

impl std::str::FromStr for FontFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "serif" => Ok(FontFamily::Serif),
            "sans" | "sans-serif" => Ok(FontFamily::Sans),
            other => Err(format!("unknown font family '{other}'")),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Metric table
// ────────────────────────────────────────────────────────────────────────────

/// Per-class advance widths in em units.
#[derive(Debug)]
pub struct FontMetricTable {
    pub font: FontFamily,
    narrow: f32,
    lower: f32,
    wide: f32,
    upper: f32,
    digit: f32,
    punct: f32,
    pub space_width: f32,
    /// Fallback for characters outside ASCII.
    pub average_char_width: f32,
    /// Line box height as a multiple of the font size.
    pub line_height: f32,
}

impl FontMetricTable {
    fn char_width(&self, c: char) -> f32 {
        match c {
            ' ' => self.space_width,
            'i' | 'j' | 'l' | 'f' | 't' | 'r' | 'I' | '\'' | '|' | '!' | '.' | ',' | ':' | ';' => {
                self.narrow
            }
            'm' | 'w' | 'M' | 'W' | '@' | '%' => self.wide,
            'a'..='z' => self.lower,
            'A'..='Z' => self.upper,
            '0'..='9' => self.digit,
            c if c.is_ascii() => self.punct,
            _ => self.average_char_width,
        }
    }

    /// Width of a string in em units.
    pub fn measure_str(&self, s: &str) -> f32 {
        s.chars().map(|c| self.char_width(c)).sum()
    }

    /// Lines needed to set `text` at `max_width_em` with greedy word wrap.
    ///
    /// A single word wider than the line still takes one line (it overflows
    /// horizontally rather than being broken).
    pub fn wrapped_lines(&self, text: &str, max_width_em: f32) -> u32 {
        let mut lines = 0u32;
        let mut current = 0.0_f32;
        for word in text.split_whitespace() {
            let word_w = self.measure_str(word);
            if lines == 0 {
                lines = 1;
                current = word_w;
            } else if current + self.space_width + word_w > max_width_em {
                lines += 1;
                current = word_w;
            } else {
                current += self.space_width + word_w;
            }
        }
        lines
    }
}

static SERIF_TABLE: FontMetricTable = FontMetricTable {
    font: FontFamily::Serif,
    narrow: 0.26,
    lower: 0.47,
    wide: 0.74,
    upper: 0.62,
    digit: 0.50,
    punct: 0.36,
    space_width: 0.25,
    average_char_width: 0.48,
    line_height: 1.45,
};

static SANS_TABLE: FontMetricTable = FontMetricTable {
    font: FontFamily::Sans,
    narrow: 0.27,
    lower: 0.55,
    wide: 0.82,
    upper: 0.66,
    digit: 0.56,
    punct: 0.38,
    space_width: 0.27,
    average_char_width: 0.53,
    line_height: 1.5,
};

pub fn get_metrics(font: FontFamily) -> &'static FontMetricTable {
    match font {
        FontFamily::Serif => &SERIF_TABLE,
        FontFamily::Sans => &SANS_TABLE,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Measurer
// ────────────────────────────────────────────────────────────────────────────

/// Root font size the description scale is relative to.
const ROOT_FONT_PX: f32 = 16.0;
/// Step images are printed full column width at 16:9.
const STEP_IMAGE_ASPECT: f32 = 9.0 / 16.0;
const STEP_IMAGE_MARGIN: f32 = 8.0;
const INGREDIENT_ROW_GAP: f32 = 4.0;
const GROUP_HEADING_MARGIN: f32 = 6.0;
const HEADING_MARGIN: f32 = 10.0;

/// `TextMeasurer` backed by static metric tables.
#[derive(Debug, Clone)]
pub struct MetricTextMeasurer {
    metrics: &'static FontMetricTable,
    body_px: f32,
}

impl MetricTextMeasurer {
    pub fn new(font: FontFamily, body_px: f32) -> Self {
        MetricTextMeasurer {
            metrics: get_metrics(font),
            body_px,
        }
    }

    fn text_height(&self, text: &str, width: f32, font_px: f32) -> f32 {
        let lines = self.metrics.wrapped_lines(text, width / font_px);
        lines as f32 * font_px * self.metrics.line_height
    }

    fn heading_px(&self) -> f32 {
        self.body_px * 1.5
    }

    fn subheading_px(&self) -> f32 {
        self.body_px * 1.1
    }
}

impl TextMeasurer for MetricTextMeasurer {
    fn measure(&self, block: &ContentBlock<'_>, width: f32) -> Measured {
        if !(width > 0.0) {
            return Measured::Unavailable;
        }
        let height = match block {
            ContentBlock::Instruction { step, .. } => {
                let text = self.text_height(&step.display_text(), width, self.body_px);
                let image = if step.image.is_some() {
                    width * STEP_IMAGE_ASPECT + STEP_IMAGE_MARGIN
                } else {
                    0.0
                };
                text + image
            }
            ContentBlock::IngredientList {
                ingredients,
                groups,
            } => groups
                .iter()
                .map(|group| {
                    let heading = group.heading.as_deref().map_or(0.0, |h| {
                        self.text_height(h, width, self.subheading_px()) + GROUP_HEADING_MARGIN
                    });
                    let rows: f32 = group
                        .indices
                        .iter()
                        .filter_map(|&i| ingredients.get(i))
                        .map(|ing| {
                            self.text_height(&ing.display_line(), width, self.body_px)
                                + INGREDIENT_ROW_GAP
                        })
                        .sum();
                    heading + rows
                })
                .sum::<f32>(),
            ContentBlock::Heading(kind) => {
                self.text_height(kind.label(), width, self.heading_px()) + HEADING_MARGIN
            }
            ContentBlock::Description { text, scale } => {
                self.text_height(text, width, ROOT_FONT_PX * scale)
            }
        };
        Measured::Height(height)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
