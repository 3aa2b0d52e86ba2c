//! Axum route handlers for the Layout API.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::layout::assembler::LayoutPlan;
use crate::layout::engine::compute_layout;
use crate::layout::geometry::{BalancerConfig, PageGeometry};
use crate::models::recipe::Recipe;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LayoutRequest {
    pub recipe: Recipe,
    /// Overrides the server's default page geometry.
    #[serde(default)]
    pub geometry: Option<PageGeometry>,
}

#[derive(Debug, Serialize)]
pub struct LayoutResponse {
    pub plan_id: Uuid,
    pub computed_at: DateTime<Utc>,
    pub plan: LayoutPlan,
}

#[derive(Debug, Serialize)]
pub struct LayoutDefaultsResponse {
    pub geometry: PageGeometry,
    pub balancer: BalancerConfig,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/layout
///
/// Stateless: every request is a fresh layout session, so identical requests produce
/// identical plans.
pub async fn handle_compute_layout(
    State(state): State<AppState>,
    Json(req): Json<LayoutRequest>,
) -> Result<Json<LayoutResponse>, AppError> {
    req.recipe
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let geometry = req.geometry.unwrap_or(state.geometry);
    let config = state.balancer_config;
    let measurer = state.measurer.clone();
    let recipe = req.recipe;

    // CPU-bound measurement and packing runs off the async executor.
    let plan = tokio::task::spawn_blocking(move || {
        compute_layout(&recipe, geometry, config, measurer.as_ref())
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in layout: {e}")))??;

    Ok(Json(LayoutResponse {
        plan_id: Uuid::new_v4(),
        computed_at: Utc::now(),
        plan,
    }))
}

/// GET /api/v1/layout/defaults
pub async fn handle_layout_defaults(State(state): State<AppState>) -> Json<LayoutDefaultsResponse> {
    Json(LayoutDefaultsResponse {
        geometry: state.geometry,
        balancer: state.balancer_config,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
