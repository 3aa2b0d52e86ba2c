pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::layout::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Layout API
        .route("/api/v1/layout", post(handlers::handle_compute_layout))
        .route(
            "/api/v1/layout/defaults",
            get(handlers::handle_layout_defaults),
        )
        .with_state(state)
}
