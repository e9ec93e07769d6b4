use anyhow::Result;
use axum::extract::DefaultBodyLimit;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

mod config;
mod error;
mod logging;
mod routes;
mod services;
pub mod models;

use services::session::SessionStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    logging::init_logging()?;

    // Load configuration
    let config = config::load_config()?;
    let addr = config.bind_addr;
    let max_file_size = config.max_file_size;

    // Build our application state
    let state = Arc::new(AppState::new(config));

    let app = routes::routes()
        .layer(DefaultBodyLimit::max(max_file_size))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    tracing::info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// Application state
#[derive(Clone)]
pub struct AppState {
    config: config::Config,
    sessions: SessionStore,
}

impl AppState {
    pub fn new(config: config::Config) -> Self {
        let sessions = SessionStore::new(config.session_ttl);
        Self { config, sessions }
    }
}
