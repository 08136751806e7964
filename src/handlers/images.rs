use axum::{Json, extract::State};
use std::sync::Arc;
use std::time::Instant;
use crate::error::ApiError;
use crate::state::AppState;
use crate::models::{ImageRequest, ImageResponse};
use crate::metrics::{REQUEST_TOTAL, REQUEST_LATENCY};

// Resolve a generated image through the cache/dedup gateway.
// On error the caller is expected to show its fallback image.
pub async fn image_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ImageRequest>,
) -> Result<Json<ImageResponse>, ApiError> {
    REQUEST_TOTAL.inc();

    if payload.prompt.trim().is_empty() {
        return Err(ApiError::InvalidRequest("prompt must not be empty".to_string()));
    }

    let start_time = Instant::now();

    let result = state.gateway.resolve(&payload.prompt).await;

    // failures count towards latency too
    REQUEST_LATENCY.observe(start_time.elapsed().as_secs_f64());
    let artifact = result?;

    Ok(Json(ImageResponse {
        mime_type: artifact.mime_type.clone(),
        data_url: artifact.to_data_url(),
        prompt: payload.prompt,
    }))
}
