//! Page geometry and balancing constants.
//!
//! All values are layout units (CSS pixels at 96 dpi). The default page is A4 portrait.

use serde::{Deserialize, Serialize};

use crate::layout::NotReady;

/// Physical layout of the printed spread.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageGeometry {
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
    /// Horizontal gap between the two content columns.
    pub column_gap: f32,
    /// Share of the content width given to the ingredients column (0..1).
    pub ingredients_fraction: f32,
    /// Fixed height of the hero description box.
    pub description_height: f32,
}

impl Default for PageGeometry {
    fn default() -> Self {
        default_page_geometry()
    }
}

/// A4 portrait, 0.5" margins, ingredients column at 38% of the content width.
pub fn default_page_geometry() -> PageGeometry {
    PageGeometry {
        page_width: 794.0,
        page_height: 1123.0,
        margin: 48.0,
        column_gap: 32.0,
        ingredients_fraction: 0.38,
        description_height: 220.0,
    }
}

impl PageGeometry {
    pub fn content_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin
    }

    pub fn content_height(&self) -> f32 {
        self.page_height - 2.0 * self.margin
    }

    pub fn ingredients_column_width(&self) -> f32 {
        (self.content_width() - self.column_gap) * self.ingredients_fraction
    }

    pub fn instructions_column_width(&self) -> f32 {
        (self.content_width() - self.column_gap) * (1.0 - self.ingredients_fraction)
    }

    /// Overflow pages are single-column and full width.
    pub fn overflow_width(&self) -> f32 {
        self.content_width()
    }

    /// Rejects geometry that has not been laid out yet (or cannot hold anything).
    pub fn check(&self) -> Result<(), NotReady> {
        let checks = [
            ("ingredients column width", self.ingredients_column_width()),
            ("instructions column width", self.instructions_column_width()),
            ("content height", self.content_height()),
            ("description height", self.description_height),
        ];
        for (what, value) in checks {
            if !(value.is_finite() && value > 0.0) {
                return Err(NotReady::DegenerateGeometry { what, value });
            }
        }
        Ok(())
    }
}

/// How tail candidates are sized when they move into the narrower ingredients column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TailEstimate {
    /// Scale the baseline height by the column width ratio. One measurement pass.
    #[default]
    WidthRatio,
    /// Measure each candidate again at the ingredients-column width.
    Remeasure,
}

impl std::str::FromStr for TailEstimate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "width-ratio" | "ratio" => Ok(TailEstimate::WidthRatio),
            "remeasure" => Ok(TailEstimate::Remeasure),
            other => Err(format!("unknown tail estimate '{other}'")),
        }
    }
}

/// Constants of the balancing algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BalancerConfig {
    /// Vertical gap after every instruction.
    pub step_gap: f32,
    /// Horizontal padding inside a column, subtracted before computing the width ratio.
    pub column_padding: f32,
    /// Height of the wrapper that holds tail instructions under the ingredient list.
    pub tail_wrapper_overhead: f32,
    pub tail_estimate: TailEstimate,
}

impl Default for BalancerConfig {
    fn default() -> Self {
        BalancerConfig {
            step_gap: 12.0,
            column_padding: 16.0,
            tail_wrapper_overhead: 24.0,
            tail_estimate: TailEstimate::WidthRatio,
        }
    }
}
