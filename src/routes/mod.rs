use axum::{http::Method, routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::AppState;

pub mod datasets;
pub mod reports;
pub mod sessions;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health_check))
        .merge(datasets::routes())
        .merge(reports::routes())
        .merge(sessions::routes())
}

pub(crate) fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600))
}

async fn health_check() -> &'static str {
    "OK"
}
