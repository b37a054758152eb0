//! HTTP endpoints consumed by the UI.

mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use crate::error::{AppError, Result};
use crate::models::{Config, ServerConfig};
use crate::services::{ActivityScraper, AdminService};
use crate::storage::DocumentStore;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub scraper: Arc<ActivityScraper>,
    pub admin: AdminService,
}

impl AppState {
    pub fn new(config: Arc<Config>, scraper: ActivityScraper, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            config,
            scraper: Arc::new(scraper),
            admin: AdminService::new(store),
        }
    }
}

pub fn create_router(state: AppState) -> Result<Router> {
    let cors = cors_layer(&state.config.server)?;
    Ok(routes::router().layer(cors).with_state(state))
}

fn cors_layer(server: &ServerConfig) -> Result<CorsLayer> {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Ok(match &server.allowed_origin {
        Some(origin) => {
            let origin = HeaderValue::from_str(origin)
                .map_err(|e| AppError::config(format!("invalid allowed_origin '{origin}': {e}")))?;
            layer.allow_origin(origin)
        }
        None => layer.allow_origin(Any),
    })
}

/// Bind and serve until the process is stopped.
pub async fn serve(state: AppState, addr: SocketAddr) -> Result<()> {
    let app = create_router(state)?;
    let listener = TcpListener::bind(addr).await?;
    log::info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
