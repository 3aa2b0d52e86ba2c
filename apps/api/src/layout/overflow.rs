//! OverflowPaginator: lays out the steps neither content column could hold.
//!
//! Overflow pages are a single full-width column, so this is 1-D greedy packing at
//! the overflow width (a third measurement pass, separate from the baseline).
//! Every page takes at least one step, which bounds the page count by the step count.

use std::ops::Range;

use tracing::{debug, warn};

use crate::layout::measure::{Measurement, TextMeasurer};
use crate::layout::NotReady;
use crate::models::recipe::Instruction;

/// A run of steps for one overflow page.
#[derive(Debug, Clone, PartialEq)]
pub struct OverflowRun {
    pub steps: Range<usize>,
    /// False if any step on the page fell back to the worst-case height.
    pub measured: bool,
}

/// Packs `remaining` into pages of `page_available_height` at `width`.
///
/// An empty range yields no pages.
pub fn paginate(
    instructions: &[Instruction],
    remaining: Range<usize>,
    page_available_height: f32,
    width: f32,
    gap: f32,
    measurer: &dyn TextMeasurer,
) -> Result<Vec<OverflowRun>, NotReady> {
    if remaining.is_empty() {
        return Ok(Vec::new());
    }
    if !(page_available_height > 0.0 && width > 0.0) {
        return Err(NotReady::DegenerateGeometry {
            what: "overflow page",
            value: page_available_height.min(width),
        });
    }

    // Measure everything first so a pending block leaves no partial pages behind.
    let heights = Measurement::of_instructions(measurer, instructions, remaining.clone(), width)?;

    let mut pages = Vec::new();
    let mut start = remaining.start;
    let mut used = 0.0_f32;
    let mut measured = true;

    for index in remaining.clone() {
        let height = heights.step(index);
        let needed = height.value + gap;
        if index > start && used + needed > page_available_height {
            pages.push(OverflowRun {
                steps: start..index,
                measured,
            });
            start = index;
            used = 0.0;
            measured = true;
        }
        if index == start && needed > page_available_height {
            warn!(
                step = index,
                height = height.value,
                page_available_height,
                "Step is taller than an overflow page; giving it its own page"
            );
        }
        used += needed;
        measured &= height.known;
    }
    pages.push(OverflowRun {
        steps: start..remaining.end,
        measured,
    });

    debug!(
        steps = remaining.len(),
        pages = pages.len(),
        width = heights.width(),
        "Overflow paginated"
    );
    Ok(pages)
}
