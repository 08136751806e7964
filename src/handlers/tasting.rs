use axum::{Json, extract::State};
use std::sync::Arc;
use std::time::Instant;
use crate::error::ApiError;
use crate::state::AppState;
use crate::models::{PairingRequest, PairingResponse, SpeechRequest, SpeechResponse};
use crate::metrics::{REQUEST_TOTAL, REQUEST_LATENCY};

pub async fn pairing_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PairingRequest>,
) -> Result<Json<PairingResponse>, ApiError> {
    REQUEST_TOTAL.inc();

    let query = payload.query.trim();
    if query.is_empty() {
        return Err(ApiError::InvalidRequest("query must not be empty".to_string()));
    }

    let start_time = Instant::now();
    let result = state.tasting.pairing_suggestion(query).await;
    REQUEST_LATENCY.observe(start_time.elapsed().as_secs_f64());
    let pairing = result?;

    Ok(Json(pairing))
}

pub async fn speech_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SpeechRequest>,
) -> Result<Json<SpeechResponse>, ApiError> {
    REQUEST_TOTAL.inc();

    if payload.text.trim().is_empty() {
        return Err(ApiError::InvalidRequest("text must not be empty".to_string()));
    }

    let start_time = Instant::now();
    let result = state.tasting.tasting_audio(&payload.text).await;
    REQUEST_LATENCY.observe(start_time.elapsed().as_secs_f64());
    let audio = result?;

    Ok(Json(SpeechResponse {
        data: audio.to_base64(),
        mime_type: audio.mime_type,
    }))
}
