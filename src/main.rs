use anyhow::Context;
use cacao_gateway::config::Args;
use cacao_gateway::gateway::GenerationGateway;
use cacao_gateway::handlers;
use cacao_gateway::logging;
use cacao_gateway::provider::GeminiClient;
use cacao_gateway::shutdown::shutdown_signal;
use cacao_gateway::state::AppState;
use clap::Parser; // for cli
use std::sync::Arc;
use tracing::{info, warn};

// this is main async function with tokio
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // parse cli arguments
    let args = Args::parse();
    logging::init(&args.log_level);

    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = args.timeout() {
        builder = builder.timeout(timeout);
    }
    let client = builder.build().context("building http client")?;

    let gemini = Arc::new(GeminiClient::new(client, args.gemini_config()));
    if !gemini.is_configured() {
        warn!("GEMINI_API_KEY not set - generation requests will fail until it is configured");
    }

    // one gateway for the whole process
    let state = Arc::new(AppState::new(
        GenerationGateway::new(gemini.clone()),
        gemini,
    ));

    let app = handlers::router(state);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    info!(port = args.port, "Gateway running on http://localhost:{}", args.port);
    info!(
        base_url = %args.api_base_url,
        image_model = %args.image_model,
        text_model = %args.text_model,
        tts_model = %args.tts_model,
        "Forwarding to Gemini"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}
