use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};

use super::{convert, handlers, middleware::metrics_middleware};
use crate::state::AppState;

/// Allowance on top of the upload limit for multipart framing, so a file just
/// over the limit still reaches the size check and gets its plain-text error.
const MULTIPART_OVERHEAD_BYTES: u64 = 1024 * 1024;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Front-end static files path (configurable via env)
    let static_dir = std::env::var("STATIC_DIR").unwrap_or_else(|_| "static".to_string());

    let body_limit = state
        .config()
        .storage
        .max_upload_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);
    let body_limit = usize::try_from(body_limit).unwrap_or(usize::MAX);

    // API routes
    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/formats", get(handlers::list_formats))
        .with_state(Arc::clone(&state));

    // Upload and conversion
    let convert_routes = Router::new()
        .route("/converter", post(convert::upload))
        .route("/convert/{filename}", post(convert::convert))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .merge(convert_routes)
        .route("/metrics", get(handlers::metrics))
        .fallback_service(ServeDir::new(&static_dir))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
}
