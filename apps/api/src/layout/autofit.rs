//! AutoFitter: shrinks the hero description until it fits its fixed-height box.
//!
//! Scales are walked in integer steps so the sequence is exact:
//! 0.90, 0.85, ..., 0.50. The floor is accepted even if the text still overflows;
//! the description is never truncated.

use tracing::{debug, warn};

use crate::layout::measure::{measure_block, ContentBlock, TextMeasurer};
use crate::layout::NotReady;

pub const MAX_SCALE: f32 = 0.9;
pub const MIN_SCALE: f32 = 0.5;
pub const SCALE_STEP: f32 = 0.05;

/// Fixed box the description must fit into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitContainer {
    pub width: f32,
    pub height: f32,
}

/// Outcome of a fit: the scale to apply and whether the text fits at that scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitResult {
    pub scale: f32,
    pub fits: bool,
}

/// Returns the largest scale in `[MIN_SCALE, MAX_SCALE]` at which `text` fits `container`.
///
/// An unknown measurement counts as overflowing, so an unmeasurable description ends at
/// the floor rather than at a scale that may spill.
pub fn fit(
    text: &str,
    container: FitContainer,
    measurer: &dyn TextMeasurer,
) -> Result<FitResult, NotReady> {
    if !(container.height > 0.0 && container.width > 0.0) {
        return Err(NotReady::DegenerateGeometry {
            what: "description box",
            value: container.height.min(container.width),
        });
    }
    if text.trim().is_empty() {
        return Ok(FitResult {
            scale: MAX_SCALE,
            fits: true,
        });
    }

    let top = hundredths(MAX_SCALE);
    let step = hundredths(SCALE_STEP);
    let floor = hundredths(MIN_SCALE);
    for pct in (floor..=top).rev().step_by(step as usize) {
        let scale = pct as f32 / 100.0;
        let block = ContentBlock::Description { text, scale };
        let height = measure_block(measurer, &block, container.width)?;
        if height.value <= container.height {
            debug!(scale, height = height.value, "Description fits");
            return Ok(FitResult { scale, fits: true });
        }
    }

    warn!(
        scale = MIN_SCALE,
        box_height = container.height,
        "Description still overflows at minimum scale; accepting overflow"
    );
    Ok(FitResult {
        scale: MIN_SCALE,
        fits: false,
    })
}

fn hundredths(scale: f32) -> u32 {
    (scale * 100.0).round() as u32
}
