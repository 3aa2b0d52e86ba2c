//! PageAssembler: arranges already-computed slices into the final page sequence.
//!
//! Page 1 is the hero, page 2 the two-column content page, pages 3..N overflow.
//! Nothing is measured here. Pages refer to ingredients and instructions by index
//! into the caller's `Recipe` so the renderer can fetch text and images itself.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::layout::autofit::FitResult;
use crate::layout::balancer::SplitPlan;
use crate::layout::overflow::OverflowRun;
use crate::models::recipe::{IngredientGroup, Recipe};

// ────────────────────────────────────────────────────────────────────────────
// Plan types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutPlan {
    pub pages: Vec<Page>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Page {
    Hero(HeroPage),
    Content(ContentPage),
    Overflow(OverflowPage),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Badge {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeroPage {
    pub title: String,
    /// Font scale chosen by the AutoFitter for the description.
    pub description_scale: f32,
    /// False if the description overflows its box even at the minimum scale.
    pub description_fits: bool,
    pub has_image: bool,
    pub badges: Vec<Badge>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    Ingredients,
    Instructions,
    FullWidth,
}

/// One vertical region of a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub role: ColumnRole,
    pub ingredient_groups: Vec<IngredientGroup>,
    /// Contiguous run of instruction indices; empty when the column holds none.
    pub instructions: Range<usize>,
    /// False if any block in the column was sized with the worst-case fallback.
    pub measured: bool,
}

pub const INGREDIENTS_COLUMN: usize = 0;
pub const INSTRUCTIONS_COLUMN: usize = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentPage {
    /// `[ingredients (left), instructions (right)]`.
    pub columns: [Column; 2],
    pub split_index: usize,
    pub second_column_end_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverflowPage {
    pub column: Column,
}

// ────────────────────────────────────────────────────────────────────────────
// Assembly
// ────────────────────────────────────────────────────────────────────────────

pub fn build_hero(recipe: &Recipe, fit: FitResult) -> HeroPage {
    HeroPage {
        title: recipe.title.clone(),
        description_scale: fit.scale,
        description_fits: fit.fits,
        has_image: recipe.hero_image.is_some(),
        badges: recipe
            .badges()
            .into_iter()
            .map(|(label, value)| Badge {
                label: label.to_string(),
                value,
            })
            .collect(),
    }
}

pub fn build_content(groups: Vec<IngredientGroup>, split: &SplitPlan) -> ContentPage {
    let ingredients = Column {
        role: ColumnRole::Ingredients,
        ingredient_groups: groups,
        instructions: split.split_index..split.second_column_end_index,
        measured: split.ingredients_measured && split.tail_measured,
    };
    let instructions = Column {
        role: ColumnRole::Instructions,
        ingredient_groups: Vec::new(),
        instructions: 0..split.split_index,
        measured: split.instructions_column_measured,
    };
    ContentPage {
        columns: [ingredients, instructions],
        split_index: split.split_index,
        second_column_end_index: split.second_column_end_index,
    }
}

/// Composes hero, content and overflow pages in fixed order.
pub fn assemble(hero: HeroPage, content: ContentPage, overflow: Vec<OverflowRun>) -> LayoutPlan {
    let mut pages = Vec::with_capacity(2 + overflow.len());
    pages.push(Page::Hero(hero));
    pages.push(Page::Content(content));
    pages.extend(overflow.into_iter().map(|run| {
        Page::Overflow(OverflowPage {
            column: Column {
                role: ColumnRole::FullWidth,
                ingredient_groups: Vec::new(),
                instructions: run.steps,
                measured: run.measured,
            },
        })
    }));
    LayoutPlan { pages }
}

impl ContentPage {
    /// Columns in reading order: the instructions column continues into the
    /// tail under the ingredients.
    pub fn reading_order(&self) -> [&Column; 2] {
        [
            &self.columns[INSTRUCTIONS_COLUMN],
            &self.columns[INGREDIENTS_COLUMN],
        ]
    }
}

impl Page {
    pub fn columns_in_reading_order(&self) -> Vec<&Column> {
        match self {
            Page::Hero(_) => Vec::new(),
            Page::Content(content) => content.reading_order().to_vec(),
            Page::Overflow(overflow) => vec![&overflow.column],
        }
    }
}

impl LayoutPlan {
    /// Every instruction index in reading order.
    pub fn instruction_indices(&self) -> Vec<usize> {
        self.pages
            .iter()
            .flat_map(|p| p.columns_in_reading_order())
            .flat_map(|c| c.instructions.clone())
            .collect()
    }

    /// Every ingredient index in display order.
    pub fn ingredient_indices(&self) -> Vec<usize> {
        self.pages
            .iter()
            .flat_map(|p| p.columns_in_reading_order())
            .flat_map(|c| c.ingredient_groups.iter())
            .flat_map(|g| g.indices.iter().copied())
            .collect()
    }

    pub fn overflow_page_count(&self) -> usize {
        self.pages
            .iter()
            .filter(|p| matches!(p, Page::Overflow(_)))
            .count()
    }

    pub fn content(&self) -> Option<&ContentPage> {
        self.pages.iter().find_map(|p| match p {
            Page::Content(c) => Some(c),
            _ => None,
        })
    }
}
