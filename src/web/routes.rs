//! HTTP routes for the earthquake map
//!
//! Provides API endpoints for the map layers and static file serving.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use tracing::{debug, error};

use crate::feed::{FeedError, FeedSource};
use crate::layers::{EarthquakeLayer, PlateLayer};
use crate::legend::{Legend, LegendView};
use crate::map::MapView;

use super::Assets;
use super::server::AppState;

/// Create API routes
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/config", get(get_config))
        .route("/api/earthquakes", get(get_earthquakes))
        .route("/api/plates", get(get_plates))
        .route("/api/legend", get(get_legend))
        .route("/api/health", get(health_check))
}

/// Create static file routes
pub fn static_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index_html))
        .route("/{*path}", get(static_handler))
}

/// Log a feed failure and turn it into a 502 for the page's console
fn feed_failure(feed: &str, source: &FeedSource, e: FeedError) -> Response {
    error!(feed, source = %source, error = %e, "failed to load feed");
    (
        StatusCode::BAD_GATEWAY,
        Json(serde_json::json!({"error": format!("Failed to load {} feed: {}", feed, e)})),
    )
        .into_response()
}

/// GET /api/config - Returns the map view configuration
async fn get_config(State(state): State<Arc<AppState>>) -> Json<MapView> {
    Json(state.view.clone())
}

/// GET /api/earthquakes - Fetches the earthquake feed and returns styled points
async fn get_earthquakes(State(state): State<Arc<AppState>>) -> Response {
    let source = &state.settings.earthquakes;
    match state.loader.fetch(source).await {
        Ok(collection) => {
            let layer = EarthquakeLayer::build(&collection, &state.settings.style);
            debug!(points = layer.points.len(), "serving earthquake layer");
            Json(layer).into_response()
        }
        Err(e) => feed_failure("earthquakes", source, e),
    }
}

/// GET /api/plates - Fetches the plate boundary feed
async fn get_plates(State(state): State<Arc<AppState>>) -> Response {
    let Some(source) = state.settings.plates.as_ref() else {
        return (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "Plate overlay is disabled"})),
        )
            .into_response();
    };

    match state.loader.fetch(source).await {
        Ok(collection) => {
            Json(PlateLayer::new(collection, state.settings.plate_style.clone())).into_response()
        }
        Err(e) => feed_failure("plates", source, e),
    }
}

/// GET /api/legend - Returns the static magnitude legend
async fn get_legend() -> Json<LegendView> {
    Json(Legend::build().into_view())
}

/// GET /api/health - Health check endpoint
async fn health_check() -> &'static str {
    "ok"
}

/// GET / - Serve index.html
async fn index_html() -> impl IntoResponse {
    match Assets::get("index.html") {
        Some(content) => Html(content.data.into_owned()).into_response(),
        None => (StatusCode::NOT_FOUND, "index.html not found").into_response(),
    }
}

/// Static file handler for embedded assets
async fn static_handler(
    axum::extract::Path(path): axum::extract::Path<String>,
) -> impl IntoResponse {
    let path = path.trim_start_matches('/');

    match Assets::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            (
                [(header::CONTENT_TYPE, mime.as_ref().to_string())],
                content.data.into_owned(),
            )
                .into_response()
        }
        None => (StatusCode::NOT_FOUND, format!("File not found: {}", path)).into_response(),
    }
}
