use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    Json,
};
use convertino_core::format::{AUDIO_FORMATS, IMAGE_FORMATS, VIDEO_FORMATS};
use convertino_core::Config;
use serde::Serialize;
use std::sync::Arc;

use crate::metrics::encode_metrics;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<Config> {
    Json(state.config().clone())
}

/// Accepted extensions per media kind. Each list doubles as the target formats for that kind.
#[derive(Serialize)]
pub struct FormatsResponse {
    pub image: &'static [&'static str],
    pub audio: &'static [&'static str],
    pub video: &'static [&'static str],
}

pub async fn list_formats() -> Json<FormatsResponse> {
    Json(FormatsResponse {
        image: IMAGE_FORMATS,
        audio: AUDIO_FORMATS,
        video: VIDEO_FORMATS,
    })
}

pub async fn metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        encode_metrics(),
    )
}
