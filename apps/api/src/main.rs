use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cookbook_api::config::Config;
use cookbook_api::layout::{default_page_geometry, BalancerConfig, MetricTextMeasurer};
use cookbook_api::routes::build_router;
use cookbook_api::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("cookbook_api={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Cookbook API v{}", env!("CARGO_PKG_VERSION"));

    let measurer = Arc::new(MetricTextMeasurer::new(config.font, config.font_size_px));
    let geometry = default_page_geometry();
    let balancer_config = BalancerConfig {
        tail_estimate: config.tail_estimate,
        ..BalancerConfig::default()
    };
    info!(
        "Layout: {:?} {}px, tail estimate {:?}, page {}x{}",
        config.font,
        config.font_size_px,
        config.tail_estimate,
        geometry.page_width,
        geometry.page_height
    );

    let state = AppState {
        config: config.clone(),
        measurer,
        geometry,
        balancer_config,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins to the web app's domain

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
