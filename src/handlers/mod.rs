mod health;
mod images;
mod metrics;
mod tasting;

pub use health::health_handler;
pub use images::image_handler;
pub use metrics::metrics_handler;
pub use tasting::{pairing_handler, speech_handler};

use axum::{Router, routing::{get, post}};
use std::sync::Arc;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/api/images", post(image_handler))
        .route("/api/pairing", post(pairing_handler))
        .route("/api/speech", post(speech_handler))
        .with_state(state)
}
