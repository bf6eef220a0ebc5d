//! JSON API over the location pipelines.

pub mod handlers;
pub mod state;

use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub use state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/position", get(handlers::position))
        .route("/api/geocode", get(handlers::geocode))
        .route("/api/component", get(handlers::component))
        .route("/api/same-city", get(handlers::same_city))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

pub async fn start(host: &str, port: u16, state: AppState) -> std::io::Result<()> {
    let app = build_router(state);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    log::info!("placesense server listening on http://{}", addr);
    axum::serve(listener, app).await
}
