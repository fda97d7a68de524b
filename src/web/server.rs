//! Web server for the earthquake map
//!
//! Provides an HTTP server using Axum to serve the map page and its JSON
//! API endpoints.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::config::MapSettings;
use crate::feed::FeedLoader;
use crate::map::MapView;

use super::routes;

/// Shared application state
pub struct AppState {
    pub settings: MapSettings,
    pub loader: FeedLoader,
    pub view: MapView,
}

impl AppState {
    pub fn new(settings: MapSettings, api_endpoint: Option<String>) -> Self {
        let view = MapView::from_settings(&settings, api_endpoint);
        Self {
            settings,
            loader: FeedLoader::new(),
            view,
        }
    }
}

/// Configuration for the web server
pub struct ServerConfig {
    pub port: u16,
    pub open_browser: bool,
    pub api_endpoint: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            open_browser: true,
            api_endpoint: None,
        }
    }
}

/// Build the router for the given state
pub fn app(state: Arc<AppState>, cors: bool) -> Router {
    let mut api = routes::api_routes();
    if cors {
        api = api.layer(CorsLayer::permissive());
    }

    Router::new()
        .merge(api)
        .merge(routes::static_routes())
        .with_state(state)
}

/// Start the web server and serve the map
pub async fn start_server(
    settings: MapSettings,
    config: ServerConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cors = config.api_endpoint.is_some();
    let state = Arc::new(AppState::new(settings, config.api_endpoint.clone()));
    let app = app(state, cors);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = TcpListener::bind(addr).await?;

    let url = format!("http://localhost:{}", config.port);
    info!(%url, "starting web server");

    if config.open_browser {
        if let Err(e) = open::that(&url) {
            warn!(error = %e, "could not open browser, please open {} manually", url);
        }
    }

    eprintln!("Serving map at {} (Ctrl+C to stop)", url);

    axum::serve(listener, app).await?;

    Ok(())
}
