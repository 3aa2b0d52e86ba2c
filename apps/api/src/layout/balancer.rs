//! ColumnBalancer: splits the instruction list across the two-column content page.
//!
//! # Algorithm
//! 1. Baseline: measure every instruction at the instructions-column width.
//! 2. Primary split: greedily fill the instructions column; the first step that would
//!    exceed its available height is `split_index`.
//! 3. Tail: estimate the remaining steps at the (narrower) ingredients-column width and
//!    greedily place them under the ingredient list; the first that would exceed the
//!    space left there is `second_column_end_index`.
//! 4. Everything from `second_column_end_index` on goes to overflow pages.
//!
//! # State machine
//! `Unsplit --compute--> Split`, `Unsplit --not ready--> Pending`, and any state
//! `--invalidate--> Unsplit`. Steps 1–3 only run outside `Split`, so a baseline is
//! never taken from a layout that is already split.

use serde::Serialize;
use tracing::{debug, warn};

use crate::layout::geometry::{BalancerConfig, TailEstimate};
use crate::layout::measure::{measure_block, BlockHeight, ContentBlock, Measurement, TextMeasurer};
use crate::layout::NotReady;
use crate::models::recipe::{Ingredient, IngredientGroup, Instruction};

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

/// Snapshot of everything one balancing pass depends on.
#[derive(Debug, Clone, Copy)]
pub struct BalanceInput<'a> {
    pub ingredients: &'a [Ingredient],
    pub groups: &'a [IngredientGroup],
    pub instructions: &'a [Instruction],
    /// Space in the ingredients column after its heading.
    pub ingredients_available_height: f32,
    /// Space in the instructions column after its heading.
    pub instructions_available_height: f32,
    pub ingredients_column_width: f32,
    pub instructions_column_width: f32,
}

/// Result of one balancing pass.
///
/// Steps `[0, split_index)` fill the instructions column, `[split_index,
/// second_column_end_index)` sit under the ingredients, the rest overflow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplitPlan {
    pub split_index: usize,
    pub second_column_end_index: usize,
    /// Instruction count the plan was computed for.
    pub instruction_count: usize,
    pub ingredients_content_height: f32,
    pub ingredients_measured: bool,
    pub instructions_column_measured: bool,
    pub tail_measured: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SplitState {
    Unsplit,
    /// Last attempt could not run; retried on the next `balance` call.
    Pending(NotReady),
    Split(SplitPlan),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SplitEvent {
    /// Content, container size or viewport changed.
    Invalidated,
    Computed(SplitPlan),
    Deferred(NotReady),
}

/// Pure transition function of the split state machine.
///
/// A `Split` state only leaves through `Invalidated`; results arriving while split
/// are ignored.
pub fn transition(state: SplitState, event: SplitEvent) -> SplitState {
    match (state, event) {
        (_, SplitEvent::Invalidated) => SplitState::Unsplit,
        (SplitState::Split(plan), _) => SplitState::Split(plan),
        (_, SplitEvent::Computed(plan)) => SplitState::Split(plan),
        (_, SplitEvent::Deferred(reason)) => SplitState::Pending(reason),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Balancer
// ────────────────────────────────────────────────────────────────────────────

/// Holds the split state for one layout instance.
#[derive(Debug, Clone)]
pub struct ColumnBalancer {
    state: SplitState,
    config: BalancerConfig,
}

impl ColumnBalancer {
    pub fn new(config: BalancerConfig) -> Self {
        ColumnBalancer {
            state: SplitState::Unsplit,
            config,
        }
    }

    pub fn state(&self) -> &SplitState {
        &self.state
    }

    pub fn config(&self) -> &BalancerConfig {
        &self.config
    }

    pub fn invalidate(&mut self) {
        self.apply(SplitEvent::Invalidated);
    }

    /// Returns the split for `input` and records it, computing it only when not
    /// already split.
    pub fn balance(
        &mut self,
        input: &BalanceInput<'_>,
        measurer: &dyn TextMeasurer,
    ) -> Result<SplitPlan, NotReady> {
        let plan = self.plan(input, measurer)?;
        self.commit(plan.clone());
        Ok(plan)
    }

    /// Returns the cached split or computes a new one without recording it.
    ///
    /// A cached split recorded for a different instruction count is stale input that
    /// nobody invalidated; it is dropped and recomputed. Callers that run further
    /// stages record the result with `commit` once every stage has succeeded.
    pub fn plan(
        &mut self,
        input: &BalanceInput<'_>,
        measurer: &dyn TextMeasurer,
    ) -> Result<SplitPlan, NotReady> {
        if let SplitState::Split(plan) = &self.state {
            if plan.instruction_count == input.instructions.len() {
                return Ok(plan.clone());
            }
            warn!(
                cached = plan.instruction_count,
                current = input.instructions.len(),
                "Split state is stale; recomputing"
            );
            self.invalidate();
        }

        match compute_split(input, &self.config, measurer) {
            Ok(plan) => Ok(plan),
            Err(reason) => {
                self.defer(reason.clone());
                Err(reason)
            }
        }
    }

    pub fn commit(&mut self, plan: SplitPlan) {
        self.apply(SplitEvent::Computed(plan));
    }

    /// Records that the computation could not finish. A recorded split is kept.
    pub fn defer(&mut self, reason: NotReady) {
        debug!(%reason, "Balancing deferred");
        self.apply(SplitEvent::Deferred(reason));
    }

    fn apply(&mut self, event: SplitEvent) {
        let state = std::mem::replace(&mut self.state, SplitState::Unsplit);
        self.state = transition(state, event);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Core computation
// ────────────────────────────────────────────────────────────────────────────

/// One full balancing pass from an unsplit state. Pure apart from measurer calls.
pub fn compute_split(
    input: &BalanceInput<'_>,
    config: &BalancerConfig,
    measurer: &dyn TextMeasurer,
) -> Result<SplitPlan, NotReady> {
    check_positive("instructions column height", input.instructions_available_height)?;
    check_positive("ingredients column height", input.ingredients_available_height)?;
    check_positive("instructions column width", input.instructions_column_width)?;
    check_positive("ingredients column width", input.ingredients_column_width)?;
    check_positive(
        "instructions column width after padding",
        input.instructions_column_width - config.column_padding,
    )?;
    check_positive(
        "ingredients column width after padding",
        input.ingredients_column_width - config.column_padding,
    )?;

    let ingredients_height = if input.ingredients.is_empty() {
        BlockHeight {
            value: 0.0,
            known: true,
        }
    } else {
        let block = ContentBlock::IngredientList {
            ingredients: input.ingredients,
            groups: input.groups,
        };
        measure_block(measurer, &block, input.ingredients_column_width)?
    };

    let count = input.instructions.len();
    if count == 0 {
        return Ok(SplitPlan {
            split_index: 0,
            second_column_end_index: 0,
            instruction_count: 0,
            ingredients_content_height: ingredients_height.value,
            ingredients_measured: ingredients_height.known,
            instructions_column_measured: true,
            tail_measured: true,
        });
    }

    // Step 1: baseline over the full, unsplit list at the instructions width.
    let baseline = Measurement::of_instructions(
        measurer,
        input.instructions,
        0..count,
        input.instructions_column_width,
    )?;

    // Step 2
    let split_index = primary_split(
        &baseline,
        count,
        input.instructions_available_height,
        config.step_gap,
    );

    // Step 3
    let tail_available = input.ingredients_available_height - ingredients_height.value;
    let (second_column_end_index, tail_measured) = if split_index < count {
        place_tail(input, config, measurer, &baseline, split_index, tail_available)?
    } else {
        (count, true)
    };

    let plan = SplitPlan {
        split_index,
        second_column_end_index,
        instruction_count: count,
        ingredients_content_height: ingredients_height.value,
        ingredients_measured: ingredients_height.known,
        instructions_column_measured: (0..split_index).all(|i| baseline.step(i).known),
        tail_measured,
    };
    debug!(
        split_index,
        second_column_end_index,
        count,
        tail_available,
        baseline_width = baseline.width(),
        "Columns balanced"
    );
    Ok(plan)
}

/// First index whose running height (plus gap) exceeds `available`.
///
/// At least one step is always placed, even if it alone is taller than the column.
fn primary_split(baseline: &Measurement, count: usize, available: f32, gap: f32) -> usize {
    let mut total = 0.0_f32;
    for i in 0..count {
        total += baseline.step(i).value + gap;
        if total > available {
            if i == 0 {
                warn!(
                    height = baseline.step(0).value,
                    available, "First step is taller than the instructions column; placing it alone"
                );
                return 1;
            }
            return i;
        }
    }
    count
}

/// Greedily places steps `[split_index, ..)` under the ingredient list.
///
/// Returns the end index and whether every placed step had a known height.
fn place_tail(
    input: &BalanceInput<'_>,
    config: &BalancerConfig,
    measurer: &dyn TextMeasurer,
    baseline: &Measurement,
    split_index: usize,
    tail_available: f32,
) -> Result<(usize, bool), NotReady> {
    let width_ratio = (input.instructions_column_width - config.column_padding)
        / (input.ingredients_column_width - config.column_padding);

    let count = input.instructions.len();
    let mut total = config.tail_wrapper_overhead;
    let mut all_known = true;

    for i in split_index..count {
        let estimate = match config.tail_estimate {
            TailEstimate::WidthRatio => {
                let base = baseline.step(i);
                BlockHeight {
                    value: base.value * width_ratio,
                    known: base.known,
                }
            }
            TailEstimate::Remeasure => {
                let block = ContentBlock::Instruction {
                    index: i,
                    step: &input.instructions[i],
                };
                measure_block(measurer, &block, input.ingredients_column_width)?
            }
        };
        total += estimate.value + config.step_gap;
        if total > tail_available {
            return Ok((i, all_known));
        }
        all_known &= estimate.known;
    }
    Ok((count, all_known))
}

fn check_positive(what: &'static str, value: f32) -> Result<(), NotReady> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(NotReady::DegenerateGeometry { what, value })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::measure::BlockId;
    use crate::layout::test_support::{make_ingredients, make_steps, FixedMeasurer};

    const INSTR_W: f32 = 400.0;
    const INGR_W: f32 = 250.0;
    /// (400 - 16) / (250 - 16)
    const RATIO: f32 = 384.0 / 234.0;

    struct Fixture {
        ingredients: Vec<Ingredient>,
        groups: Vec<IngredientGroup>,
        steps: Vec<Instruction>,
    }

    impl Fixture {
        fn new(ingredients: usize, steps: usize) -> Self {
            let ingredients = make_ingredients(ingredients);
            let groups = crate::models::recipe::group_ingredients(&ingredients);
            Fixture {
                ingredients,
                groups,
                steps: make_steps(steps, "Simmer gently"),
            }
        }

        fn input(&self, instructions_available: f32, ingredients_available: f32) -> BalanceInput<'_> {
            BalanceInput {
                ingredients: &self.ingredients,
                groups: &self.groups,
                instructions: &self.steps,
                ingredients_available_height: ingredients_available,
                instructions_available_height: instructions_available,
                ingredients_column_width: INGR_W,
                instructions_column_width: INSTR_W,
            }
        }
    }

    fn uniform_measurer(count: usize, step: f32, ingredients: f32) -> FixedMeasurer {
        FixedMeasurer::new()
            .with_step_heights(INSTR_W, &vec![step; count])
            .with_block(BlockId::IngredientList, ingredients)
    }

    // ── transition ──────────────────────────────────────────────────────────

    #[test]
    fn test_transition_table() {
        let plan = SplitPlan {
            split_index: 1,
            second_column_end_index: 1,
            instruction_count: 1,
            ingredients_content_height: 0.0,
            ingredients_measured: true,
            instructions_column_measured: true,
            tail_measured: true,
        };
        let pending = NotReady::MeasurementPending {
            block: BlockId::IngredientList,
        };

        let s = transition(SplitState::Unsplit, SplitEvent::Computed(plan.clone()));
        assert_eq!(s, SplitState::Split(plan.clone()));

        let s = transition(s, SplitEvent::Deferred(pending.clone()));
        assert_eq!(s, SplitState::Split(plan.clone()), "split ignores late results");

        let s = transition(s, SplitEvent::Invalidated);
        assert_eq!(s, SplitState::Unsplit);

        let s = transition(s, SplitEvent::Deferred(pending.clone()));
        assert_eq!(s, SplitState::Pending(pending));

        let s = transition(s, SplitEvent::Computed(plan.clone()));
        assert_eq!(s, SplitState::Split(plan));
    }

    // ── scenarios ───────────────────────────────────────────────────────────

    #[test]
    fn test_scenario_a_everything_fits() {
        let fx = Fixture::new(3, 4);
        let measurer = uniform_measurer(4, 40.0, 120.0);
        let plan = compute_split(&fx.input(900.0, 900.0), &BalancerConfig::default(), &measurer)
            .unwrap();
        assert_eq!(plan.split_index, 4);
        assert_eq!(plan.second_column_end_index, 4);
    }

    #[test]
    fn test_scenario_b_split_and_tail() {
        let fx = Fixture::new(3, 20);
        // 80 + 12 gap = 92 per step; 950 holds 10.
        // Tail: 500 left; 24 + 3 × (80 × RATIO + 12) ≈ 454 fits, a 4th does not.
        let measurer = uniform_measurer(20, 80.0, 400.0);
        let plan = compute_split(&fx.input(950.0, 900.0), &BalancerConfig::default(), &measurer)
            .unwrap();
        assert_eq!(plan.split_index, 10);
        assert_eq!(plan.second_column_end_index, 13);
        assert_eq!(plan.ingredients_content_height, 400.0);
        assert!(24.0 + 3.0 * (80.0 * RATIO + 12.0) <= 500.0);
    }

    #[test]
    fn test_scenario_c_empty_ingredients_offer_whole_column() {
        let config = BalancerConfig::default();

        let with_ingredients = Fixture::new(3, 5);
        let measurer = uniform_measurer(5, 80.0, 400.0);
        let b = compute_split(&with_ingredients.input(200.0, 500.0), &config, &measurer).unwrap();

        let without = Fixture::new(0, 5);
        let c = compute_split(&without.input(200.0, 500.0), &config, &measurer).unwrap();

        assert_eq!(c.ingredients_content_height, 0.0);
        assert_eq!(b.split_index, c.split_index);
        assert!(
            c.second_column_end_index - c.split_index > b.second_column_end_index - b.split_index
        );
        assert_eq!(c.second_column_end_index, 5);
    }

    #[test]
    fn test_scenario_d_oversized_first_step_placed_alone() {
        let fx = Fixture::new(3, 3);
        let measurer = FixedMeasurer::new()
            .with_step_heights(INSTR_W, &[2000.0, 50.0, 50.0])
            .with_block(BlockId::IngredientList, 100.0);
        let plan = compute_split(&fx.input(900.0, 900.0), &BalancerConfig::default(), &measurer)
            .unwrap();
        assert_eq!(plan.split_index, 1);
        assert!(plan.second_column_end_index >= 1);
    }

    #[test]
    fn test_no_instructions() {
        let fx = Fixture::new(3, 0);
        let measurer = uniform_measurer(0, 0.0, 100.0);
        let plan = compute_split(&fx.input(900.0, 900.0), &BalancerConfig::default(), &measurer)
            .unwrap();
        assert_eq!(plan.split_index, 0);
        assert_eq!(plan.second_column_end_index, 0);
    }

    // ── properties ──────────────────────────────────────────────────────────

    #[test]
    fn test_split_index_monotonic_in_available_height() {
        let fx = Fixture::new(2, 12);
        let heights: Vec<f32> = (0..12).map(|i| 30.0 + (i * 17 % 50) as f32).collect();
        let measurer = FixedMeasurer::new()
            .with_step_heights(INSTR_W, &heights)
            .with_block(BlockId::IngredientList, 80.0);
        let config = BalancerConfig::default();

        let mut previous = usize::MAX;
        for available in (1..=120).rev().map(|k| k as f32 * 10.0) {
            let plan = compute_split(&fx.input(available, 600.0), &config, &measurer).unwrap();
            assert!(
                plan.split_index <= previous,
                "split grew from {previous} to {} at {available}",
                plan.split_index
            );
            previous = plan.split_index;
        }
    }

    #[test]
    fn test_balance_is_idempotent() {
        let fx = Fixture::new(3, 20);
        let measurer = uniform_measurer(20, 80.0, 400.0);
        let input = fx.input(950.0, 900.0);

        let mut first = ColumnBalancer::new(BalancerConfig::default());
        let mut second = ColumnBalancer::new(BalancerConfig::default());
        let a = first.balance(&input, &measurer).unwrap();
        let b = first.balance(&input, &measurer).unwrap();
        let c = second.balance(&input, &measurer).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    // ── state machine behaviour ─────────────────────────────────────────────

    #[test]
    fn test_split_state_does_not_remeasure() {
        let fx = Fixture::new(3, 20);
        let measurer = uniform_measurer(20, 80.0, 400.0);
        let input = fx.input(950.0, 900.0);
        let mut balancer = ColumnBalancer::new(BalancerConfig::default());

        balancer.balance(&input, &measurer).unwrap();
        let calls = measurer.calls();
        assert!(matches!(balancer.state(), SplitState::Split(_)));

        balancer.balance(&input, &measurer).unwrap();
        assert_eq!(measurer.calls(), calls, "cached split must not re-measure");

        balancer.invalidate();
        assert_eq!(balancer.state(), &SplitState::Unsplit);
        balancer.balance(&input, &measurer).unwrap();
        assert!(measurer.calls() > calls);
    }

    #[test]
    fn test_stale_split_is_recomputed() {
        let long = Fixture::new(3, 20);
        let short = Fixture::new(3, 4);
        let measurer = uniform_measurer(20, 80.0, 400.0);
        let mut balancer = ColumnBalancer::new(BalancerConfig::default());

        balancer.balance(&long.input(950.0, 900.0), &measurer).unwrap();
        let plan = balancer.balance(&short.input(950.0, 900.0), &measurer).unwrap();
        assert_eq!(plan.instruction_count, 4);
        assert_eq!(plan.split_index, 4);
    }

    #[test]
    fn test_degenerate_geometry_defers_then_recovers() {
        let fx = Fixture::new(3, 4);
        let measurer = uniform_measurer(4, 40.0, 120.0);
        let mut balancer = ColumnBalancer::new(BalancerConfig::default());

        let err = balancer.balance(&fx.input(0.0, 900.0), &measurer).unwrap_err();
        assert!(matches!(err, NotReady::DegenerateGeometry { .. }));
        assert!(matches!(balancer.state(), SplitState::Pending(_)));

        let plan = balancer.balance(&fx.input(900.0, 900.0), &measurer).unwrap();
        assert_eq!(plan.split_index, 4);
    }

    #[test]
    fn test_pending_measurement_commits_nothing() {
        let fx = Fixture::new(3, 4);
        let measurer = uniform_measurer(4, 40.0, 120.0).with_pending(BlockId::Instruction(3));
        let mut balancer = ColumnBalancer::new(BalancerConfig::default());
        let err = balancer.balance(&fx.input(900.0, 900.0), &measurer).unwrap_err();
        assert_eq!(
            err,
            NotReady::MeasurementPending {
                block: BlockId::Instruction(3)
            }
        );
        assert!(!matches!(balancer.state(), SplitState::Split(_)));
    }

    #[test]
    fn test_plan_does_not_record_until_committed() {
        let fx = Fixture::new(3, 20);
        let measurer = uniform_measurer(20, 80.0, 400.0);
        let mut balancer = ColumnBalancer::new(BalancerConfig::default());

        let plan = balancer.plan(&fx.input(950.0, 900.0), &measurer).unwrap();
        assert_eq!(balancer.state(), &SplitState::Unsplit);

        balancer.defer(NotReady::MeasurementPending {
            block: BlockId::Instruction(15),
        });
        assert!(matches!(balancer.state(), SplitState::Pending(_)));

        balancer.commit(plan.clone());
        assert_eq!(balancer.state(), &SplitState::Split(plan));
    }

    #[test]
    fn test_instructions_column_narrower_than_padding_is_degenerate() {
        let fx = Fixture::new(3, 20);
        let measurer = FixedMeasurer::new()
            .with_step_heights(6.66, &[500.0; 20])
            .with_block(BlockId::IngredientList, 800.0);
        let input = BalanceInput {
            instructions_column_width: 6.66,
            ..fx.input(950.0, 900.0)
        };
        let err = compute_split(&input, &BalancerConfig::default(), &measurer).unwrap_err();
        assert!(matches!(
            err,
            NotReady::DegenerateGeometry {
                what: "instructions column width after padding",
                ..
            }
        ));
    }

    // ── fallbacks ───────────────────────────────────────────────────────────

    #[test]
    fn test_unknown_step_height_pushes_content_forward() {
        let fx = Fixture::new(3, 4);
        let measurer = uniform_measurer(4, 40.0, 120.0).with_unavailable(BlockId::Instruction(2));
        let plan = compute_split(&fx.input(900.0, 900.0), &BalancerConfig::default(), &measurer)
            .unwrap();
        assert_eq!(plan.split_index, 2);
        assert_eq!(plan.second_column_end_index, 2, "unknown step must not enter the tail");
        assert!(plan.instructions_column_measured);
    }

    #[test]
    fn test_unknown_ingredient_height_leaves_no_tail() {
        let fx = Fixture::new(3, 20);
        let measurer = uniform_measurer(20, 80.0, 400.0).with_unavailable(BlockId::IngredientList);
        let plan = compute_split(&fx.input(950.0, 900.0), &BalancerConfig::default(), &measurer)
            .unwrap();
        assert_eq!(plan.split_index, 10);
        assert_eq!(plan.second_column_end_index, 10);
        assert!(!plan.ingredients_measured);
    }

    // ── tail estimate modes ─────────────────────────────────────────────────

    #[test]
    fn test_remeasure_uses_ingredients_width_heights() {
        let fx = Fixture::new(3, 20);
        // At the narrow width every step is only 60 tall: 24 + k × 72 ≤ 500 → k = 6.
        let heights = FixedMeasurer::new()
            .with_step_heights(INSTR_W, &[80.0; 20])
            .with_step_heights(INGR_W, &[60.0; 20])
            .with_block(BlockId::IngredientList, 400.0);
        let config = BalancerConfig {
            tail_estimate: TailEstimate::Remeasure,
            ..BalancerConfig::default()
        };
        let plan = compute_split(&fx.input(950.0, 900.0), &config, &heights).unwrap();
        assert_eq!(plan.split_index, 10);
        assert_eq!(plan.second_column_end_index, 16);
    }
}
