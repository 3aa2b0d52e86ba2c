//! Layout orchestration: Recipe → AutoFitter + ColumnBalancer → OverflowPaginator →
//! PageAssembler.
//!
//! `LayoutSession` keeps the only mutable state (the balancer's split state) for one
//! rendered recipe. Callers signal invalidations; the session performs no timers or
//! debouncing. `compute_layout` is the stateless one-shot used by the HTTP API.

use tracing::{debug, info};

use crate::layout::assembler::{self, LayoutPlan};
use crate::layout::autofit::{self, FitContainer};
use crate::layout::balancer::{BalanceInput, ColumnBalancer, SplitState};
use crate::layout::geometry::{BalancerConfig, PageGeometry};
use crate::layout::measure::{measure_block, ContentBlock, HeadingKind, TextMeasurer};
use crate::layout::overflow::{self, OverflowRun};
use crate::layout::NotReady;
use crate::models::recipe::{group_ingredients, Recipe};

#[derive(Debug, Clone)]
pub struct LayoutSession {
    geometry: PageGeometry,
    balancer: ColumnBalancer,
}

impl LayoutSession {
    pub fn new(geometry: PageGeometry, config: BalancerConfig) -> Self {
        LayoutSession {
            geometry,
            balancer: ColumnBalancer::new(config),
        }
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub fn split_state(&self) -> &SplitState {
        self.balancer.state()
    }

    /// The recipe content changed; the next `compute` starts from an unsplit baseline.
    pub fn content_changed(&mut self) {
        self.balancer.invalidate();
    }

    /// Container or viewport size changed. Identical geometry is a no-op.
    pub fn resize(&mut self, geometry: PageGeometry) {
        if geometry != self.geometry {
            debug!(?geometry, "Geometry changed; invalidating split");
            self.geometry = geometry;
            self.balancer.invalidate();
        }
    }

    /// Computes the full plan. Either a complete plan or `NotReady`; never a partial one.
    ///
    /// The split is recorded only once every stage has succeeded.
    pub fn compute(
        &mut self,
        recipe: &Recipe,
        measurer: &dyn TextMeasurer,
    ) -> Result<LayoutPlan, NotReady> {
        let g = self.geometry;
        g.check()?;

        // Hero page
        let fit = autofit::fit(
            &recipe.description,
            FitContainer {
                width: g.content_width(),
                height: g.description_height,
            },
            measurer,
        )?;

        // Content page
        let groups = group_ingredients(&recipe.ingredients);
        let ingredients_heading = measure_block(
            measurer,
            &ContentBlock::Heading(HeadingKind::Ingredients),
            g.ingredients_column_width(),
        )?;
        let instructions_heading = measure_block(
            measurer,
            &ContentBlock::Heading(HeadingKind::Instructions),
            g.instructions_column_width(),
        )?;
        let input = BalanceInput {
            ingredients: &recipe.ingredients,
            groups: &groups,
            instructions: &recipe.instructions,
            ingredients_available_height: g.content_height() - ingredients_heading.value,
            instructions_available_height: g.content_height() - instructions_heading.value,
            ingredients_column_width: g.ingredients_column_width(),
            instructions_column_width: g.instructions_column_width(),
        };
        let split = self.balancer.plan(&input, measurer)?;

        // Overflow pages
        let overflow_runs =
            match self.paginate_overflow(recipe, split.second_column_end_index, measurer) {
                Ok(runs) => runs,
                Err(reason) => {
                    self.balancer.defer(reason.clone());
                    return Err(reason);
                }
            };
        self.balancer.commit(split.clone());

        let plan = assembler::assemble(
            assembler::build_hero(recipe, fit),
            assembler::build_content(groups, &split),
            overflow_runs,
        );
        info!(
            title = %recipe.title,
            steps = recipe.instructions.len(),
            split_index = split.split_index,
            second_column_end_index = split.second_column_end_index,
            overflow_pages = plan.overflow_page_count(),
            description_scale = fit.scale,
            "Layout computed"
        );
        Ok(plan)
    }
}

impl LayoutSession {
    fn paginate_overflow(
        &self,
        recipe: &Recipe,
        second_column_end_index: usize,
        measurer: &dyn TextMeasurer,
    ) -> Result<Vec<OverflowRun>, NotReady> {
        let remaining = second_column_end_index..recipe.instructions.len();
        if remaining.is_empty() {
            return Ok(Vec::new());
        }
        let g = self.geometry;
        let continued = measure_block(
            measurer,
            &ContentBlock::Heading(HeadingKind::InstructionsContinued),
            g.overflow_width(),
        )?;
        overflow::paginate(
            &recipe.instructions,
            remaining,
            g.content_height() - continued.value,
            g.overflow_width(),
            self.balancer.config().step_gap,
            measurer,
        )
    }
}

/// Computes a plan from scratch with a fresh session.
pub fn compute_layout(
    recipe: &Recipe,
    geometry: PageGeometry,
    config: BalancerConfig,
    measurer: &dyn TextMeasurer,
) -> Result<LayoutPlan, NotReady> {
    LayoutSession::new(geometry, config).compute(recipe, measurer)
}
