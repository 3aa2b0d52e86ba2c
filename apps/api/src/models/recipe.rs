//! Recipe input types as produced by the extraction layer.
//!
//! The layout engine borrows these immutably for the duration of one computation and
//! refers back into `ingredients` / `instructions` by index only.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Purpose assigned when the extractor leaves it blank.
pub const DEFAULT_PURPOSE: &str = "cooking";

/// Placeholder the extractor uses for "no quantity" / "no unit".
const NONE_MARKER: &str = "-";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub prep_time: String,
    #[serde(default)]
    pub cook_time: String,
    #[serde(default)]
    pub total_time: String,
    #[serde(default)]
    pub servings: String,
    /// "Easy" | "Intermediate" | "Advanced" when the extractor provides it.
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub instructions: Vec<Instruction>,
    /// Base64 data URI or URL.
    #[serde(default)]
    pub hero_image: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub unit: String,
    #[serde(rename = "ingredient")]
    pub name: String,
    #[serde(default)]
    pub purpose: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    pub step_number: u32,
    #[serde(rename = "instruction")]
    pub text: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    /// Used by the visual-timestamp feature only; ignored by pagination.
    #[serde(default)]
    pub is_key_step: bool,
}

/// Ingredients sharing a purpose, in display order.
///
/// `indices` point into `Recipe::ingredients`. The "cooking" group has no heading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientGroup {
    pub purpose: String,
    pub heading: Option<String>,
    pub indices: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecipeError {
    #[error("step number 0 at position {position}; steps are 1-based")]
    ZeroStep { position: usize },

    #[error("duplicate step number {step_number}")]
    DuplicateStep { step_number: u32 },

    #[error("step {step_number} at position {position} does not follow step {previous}")]
    StepOutOfOrder {
        position: usize,
        step_number: u32,
        previous: u32,
    },
}

impl Ingredient {
    /// Normalized purpose key: trimmed, lowercase, blank → "cooking".
    pub fn purpose_key(&self) -> String {
        match self.purpose.as_deref().map(str::trim) {
            Some(p) if !p.is_empty() => p.to_lowercase(),
            _ => DEFAULT_PURPOSE.to_string(),
        }
    }

    /// The printed line: quantity, unit and name, skipping "-" placeholders.
    pub fn display_line(&self) -> String {
        [self.quantity.trim(), self.unit.trim(), self.name.trim()]
            .into_iter()
            .filter(|part| !part.is_empty() && *part != NONE_MARKER)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Instruction {
    /// The printed text including its step label, e.g. "3. Fold in the eggs".
    pub fn display_text(&self) -> String {
        format!("{}. {}", self.step_number, self.text.trim())
    }
}

impl Recipe {
    /// Checks that step numbers are 1-based, unique and strictly increasing.
    pub fn validate(&self) -> Result<(), RecipeError> {
        let mut previous: Option<u32> = None;
        for (position, step) in self.instructions.iter().enumerate() {
            if step.step_number == 0 {
                return Err(RecipeError::ZeroStep { position });
            }
            if let Some(prev) = previous {
                if step.step_number == prev {
                    return Err(RecipeError::DuplicateStep {
                        step_number: prev,
                    });
                }
                if step.step_number < prev {
                    return Err(RecipeError::StepOutOfOrder {
                        position,
                        step_number: step.step_number,
                        previous: prev,
                    });
                }
            }
            previous = Some(step.step_number);
        }
        Ok(())
    }

    /// Timing/servings/difficulty badges for the hero page, skipping empty values.
    pub fn badges(&self) -> Vec<(&'static str, String)> {
        let candidates = [
            ("Prep", Some(self.prep_time.as_str())),
            ("Cook", Some(self.cook_time.as_str())),
            ("Total", Some(self.total_time.as_str())),
            ("Servings", Some(self.servings.as_str())),
            ("Difficulty", self.difficulty.as_deref()),
        ];
        candidates
            .into_iter()
            .filter_map(|(label, value)| {
                let value = value?.trim();
                if value.is_empty() || value == NONE_MARKER {
                    None
                } else {
                    Some((label, value.to_string()))
                }
            })
            .collect()
    }
}

/// Groups ingredients by purpose for display.
///
/// The "cooking" group always comes first and carries no heading; every other purpose
/// follows in first-appearance order with a capitalized heading. Order within a group
/// follows the original list.
pub fn group_ingredients(ingredients: &[Ingredient]) -> Vec<IngredientGroup> {
    let mut cooking = IngredientGroup {
        purpose: DEFAULT_PURPOSE.to_string(),
        heading: None,
        indices: Vec::new(),
    };
    let mut others: Vec<IngredientGroup> = Vec::new();

    for (i, ingredient) in ingredients.iter().enumerate() {
        let key = ingredient.purpose_key();
        if key == DEFAULT_PURPOSE {
            cooking.indices.push(i);
            continue;
        }
        match others.iter_mut().find(|g| g.purpose == key) {
            Some(group) => group.indices.push(i),
            None => others.push(IngredientGroup {
                heading: Some(capitalize(&key)),
                purpose: key,
                indices: vec![i],
            }),
        }
    }

    let mut groups = Vec::with_capacity(others.len() + 1);
    if !cooking.indices.is_empty() {
        groups.push(cooking);
    }
    groups.extend(others);
    groups
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
