//! Fake measurement oracle and fixtures shared by the layout tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::layout::measure::{BlockId, ContentBlock, Measured, TextMeasurer};
use crate::models::recipe::{Ingredient, Instruction, Recipe};

/// Returns fixed heights per block id (optionally per width).
///
/// Lookup order: forced overrides, exact `(id, width)`, any-width entry, `Unavailable`.
/// Description blocks are answered by `description_fn(scale)` when set.
#[derive(Default)]
pub struct FixedMeasurer {
    overrides: HashMap<BlockId, Measured>,
    exact: HashMap<(BlockId, u32), f32>,
    any_width: HashMap<BlockId, f32>,
    description_fn: Option<fn(f32) -> f32>,
    calls: AtomicUsize,
}

impl FixedMeasurer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_step_heights(mut self, width: f32, heights: &[f32]) -> Self {
        for (i, h) in heights.iter().enumerate() {
            self.exact
                .insert((BlockId::Instruction(i), width.to_bits()), *h);
        }
        self
    }

    pub fn with_block(mut self, id: BlockId, height: f32) -> Self {
        self.any_width.insert(id, height);
        self
    }

    pub fn with_headings(self, height: f32) -> Self {
        use crate::layout::measure::HeadingKind::*;
        self.with_block(BlockId::Heading(Ingredients), height)
            .with_block(BlockId::Heading(Instructions), height)
            .with_block(BlockId::Heading(InstructionsContinued), height)
    }

    pub fn with_unavailable(mut self, id: BlockId) -> Self {
        self.overrides.insert(id, Measured::Unavailable);
        self
    }

    pub fn with_pending(mut self, id: BlockId) -> Self {
        self.overrides.insert(id, Measured::Pending);
        self
    }

    pub fn with_description(mut self, f: fn(f32) -> f32) -> Self {
        self.description_fn = Some(f);
        self
    }

    /// Number of `measure` calls served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TextMeasurer for FixedMeasurer {
    fn measure(&self, block: &ContentBlock<'_>, width: f32) -> Measured {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let id = block.id();
        if let Some(forced) = self.overrides.get(&id) {
            return *forced;
        }
        if let (ContentBlock::Description { scale, .. }, Some(f)) = (block, self.description_fn)
        {
            return Measured::Height(f(*scale));
        }
        self.exact
            .get(&(id, width.to_bits()))
            .or_else(|| self.any_width.get(&id))
            .map(|h| Measured::Height(*h))
            .unwrap_or(Measured::Unavailable)
    }
}

pub fn make_steps(n: usize, text: &str) -> Vec<Instruction> {
    (0..n)
        .map(|i| Instruction {
            step_number: i as u32 + 1,
            text: format!("{text} {}", i + 1),
            ..Default::default()
        })
        .collect()
}

pub fn make_ingredients(n: usize) -> Vec<Ingredient> {
    (0..n)
        .map(|i| Ingredient {
            quantity: "1".to_string(),
            unit: "cup".to_string(),
            name: format!("ingredient {}", i + 1),
            purpose: None,
        })
        .collect()
}

pub fn make_recipe(ingredients: usize, steps: usize) -> Recipe {
    Recipe {
        title: "Weeknight Ragù".to_string(),
        description: "A slow-simmered sauce for busy evenings.".to_string(),
        prep_time: "15 minutes".to_string(),
        cook_time: "45 minutes".to_string(),
        total_time: "1 hour".to_string(),
        servings: "Serves: 4".to_string(),
        ingredients: make_ingredients(ingredients),
        instructions: make_steps(steps, "Stir the pot"),
        ..Default::default()
    }
}
