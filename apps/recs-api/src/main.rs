use std::sync::Arc;

use axum::{Router, routing::get};
use axum_helpers::{create_app, health_router};
use domain_recommend::{ElasticStore, RecommendationService, TmdbProvider, handlers};
use tower_http::trace::TraceLayer;
use tracing::info;

mod config;
mod telemetry;

use config::Config;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output
    telemetry::install_color_eyre();

    let config = Config::from_env()?;

    telemetry::init_tracing(&config.environment);
    telemetry::init_metrics();

    let store =
        ElasticStore::from_env().map_err(|e| eyre::eyre!("Failed to build store client: {}", e))?;

    let mut service = RecommendationService::new(store);

    // Poster enrichment is optional; without credentials the API serves
    // recommendations without imagery.
    match TmdbProvider::from_env() {
        Ok(provider) => {
            info!("Poster enrichment enabled");
            service = service.with_poster_provider(Arc::new(provider));
        }
        Err(e) => {
            tracing::warn!("Poster enrichment disabled: {}", e);
        }
    }

    let app = Router::new()
        .nest("/api", handlers::router(service))
        .merge(health_router(
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
        ))
        .route(
            "/metrics",
            get(|| async { telemetry::render_metrics() }),
        )
        .layer(TraceLayer::new_for_http());

    info!("Starting recs API");

    create_app(app, &config.address())
        .await
        .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Recs API shutdown complete");
    Ok(())
}
