//! Measurement oracle: the only source of rendered heights.
//!
//! The engine never computes text height itself. Every height read goes through a
//! `TextMeasurer`, which may be backed by static font metrics (`MetricTextMeasurer`),
//! a real rendering engine, or a fixed table in tests.

use std::collections::HashMap;

use tracing::warn;

use crate::layout::NotReady;
use crate::models::recipe::{Ingredient, IngredientGroup, Instruction};

// ────────────────────────────────────────────────────────────────────────────
// Content blocks
// ────────────────────────────────────────────────────────────────────────────

/// Fixed headings the engine asks to have measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HeadingKind {
    Ingredients,
    Instructions,
    InstructionsContinued,
}

impl HeadingKind {
    pub fn label(self) -> &'static str {
        match self {
            HeadingKind::Ingredients => "Ingredients",
            HeadingKind::Instructions => "Instructions",
            HeadingKind::InstructionsContinued => "Instructions (continued)",
        }
    }
}

/// Identity of a measurable block, independent of width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BlockId {
    Instruction(usize),
    IngredientList,
    Heading(HeadingKind),
    Description,
}

/// A block handed to the measurer together with the content it renders.
#[derive(Debug, Clone, Copy)]
pub enum ContentBlock<'a> {
    Instruction {
        index: usize,
        step: &'a Instruction,
    },
    /// The complete grouped ingredient list, subheadings included.
    IngredientList {
        ingredients: &'a [Ingredient],
        groups: &'a [IngredientGroup],
    },
    Heading(HeadingKind),
    /// Hero description rendered at `scale` (root-relative font size).
    Description { text: &'a str, scale: f32 },
}

impl ContentBlock<'_> {
    pub fn id(&self) -> BlockId {
        match self {
            ContentBlock::Instruction { index, .. } => BlockId::Instruction(*index),
            ContentBlock::IngredientList { .. } => BlockId::IngredientList,
            ContentBlock::Heading(kind) => BlockId::Heading(*kind),
            ContentBlock::Description { .. } => BlockId::Description,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Oracle
// ────────────────────────────────────────────────────────────────────────────

/// What the oracle knows about a block's height at a given width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Measured {
    Height(f32),
    /// No result for this block. The engine substitutes a worst-case height.
    Unavailable,
    /// The measurement exists but has not resolved yet (e.g. fonts or images still loading).
    Pending,
}

/// Returns the rendered height of a block at a given width, in layout units.
///
/// Implementations must be deterministic for a given (content, width, font, style).
/// `Send + Sync` so a shared measurer can sit in `AppState` behind an `Arc`.
pub trait TextMeasurer: Send + Sync {
    fn measure(&self, block: &ContentBlock<'_>, width: f32) -> Measured;
}

/// A height read with the §7 fallback applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockHeight {
    pub value: f32,
    /// False when the oracle had no usable answer and `value` is the worst case.
    pub known: bool,
}

/// Reads one block, converting oracle gaps into the conservative policy:
/// - `Pending` aborts the whole computation with `NotReady::MeasurementPending`.
/// - `Unavailable`, a non-finite value, or zero/negative height for a visible block becomes
///   `f32::INFINITY`, i.e. "does not fit in any column".
pub fn measure_block(
    measurer: &dyn TextMeasurer,
    block: &ContentBlock<'_>,
    width: f32,
) -> Result<BlockHeight, NotReady> {
    match measurer.measure(block, width) {
        Measured::Pending => Err(NotReady::MeasurementPending { block: block.id() }),
        Measured::Height(h) if h.is_finite() && h > 0.0 => Ok(BlockHeight {
            value: h,
            known: true,
        }),
        other => {
            warn!(
                block = ?block.id(),
                width,
                result = ?other,
                "Measurement unavailable; assuming block does not fit"
            );
            Ok(BlockHeight {
                value: f32::INFINITY,
                known: false,
            })
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Measurement snapshot
// ────────────────────────────────────────────────────────────────────────────

/// Block heights taken at one specific width. Never reused across widths.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    width: f32,
    heights: HashMap<BlockId, BlockHeight>,
}

impl Measurement {
    /// Measures every instruction at `width`. Either all heights are recorded or the
    /// call returns `NotReady` and nothing is kept.
    pub fn of_instructions(
        measurer: &dyn TextMeasurer,
        instructions: &[Instruction],
        indices: std::ops::Range<usize>,
        width: f32,
    ) -> Result<Self, NotReady> {
        let mut heights = HashMap::with_capacity(indices.len());
        for index in indices {
            let block = ContentBlock::Instruction {
                index,
                step: &instructions[index],
            };
            heights.insert(block.id(), measure_block(measurer, &block, width)?);
        }
        Ok(Measurement { width, heights })
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn get(&self, id: BlockId) -> Option<BlockHeight> {
        self.heights.get(&id).copied()
    }

    /// Height of instruction `index`, worst case if it was never measured.
    pub fn step(&self, index: usize) -> BlockHeight {
        self.get(BlockId::Instruction(index)).unwrap_or(BlockHeight {
            value: f32::INFINITY,
            known: false,
        })
    }
}
