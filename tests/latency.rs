//! Failed requests still land in the latency histogram.
//!
//! Kept in its own test binary so nothing else touches the global registry.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use cacao_gateway::handlers::router;
use cacao_gateway::metrics::REQUEST_LATENCY;
use cacao_gateway::provider::{GeminiClient, GeminiConfig};
use cacao_gateway::state::AppState;
use cacao_gateway::GenerationGateway;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

#[tokio::test]
async fn failed_requests_are_timed() {
    // no api key: every provider call fails with 503
    let gemini = Arc::new(GeminiClient::new(reqwest::Client::new(), GeminiConfig::default()));
    let app = router(Arc::new(AppState::new(
        GenerationGateway::new(gemini.clone()),
        gemini,
    )));

    let before = REQUEST_LATENCY.get_sample_count();

    for (uri, body) in [
        ("/api/images", json!({ "prompt": "sunset" })),
        ("/api/pairing", json!({ "query": "espresso" })),
        ("/api/speech", json!({ "text": "notes of fig" })),
    ] {
        let req = Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    assert_eq!(REQUEST_LATENCY.get_sample_count(), before + 3);
}
