use std::sync::Arc;

use crate::config::Config;
use crate::layout::{BalancerConfig, PageGeometry, TextMeasurer};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Measurement oracle used for server-side layout. Default: static font metrics.
    pub measurer: Arc<dyn TextMeasurer>,
    /// Page geometry used when a request does not bring its own.
    pub geometry: PageGeometry,
    pub balancer_config: BalancerConfig,
}
