use clap::Parser;
use std::time::Duration;
use crate::provider::GeminiConfig;
use crate::provider::gemini::{DEFAULT_BASE_URL, DEFAULT_IMAGE_MODEL, DEFAULT_TEXT_MODEL, DEFAULT_TTS_MODEL};

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "cacao-gateway")]
#[command(about = "Caching, deduplicating proxy for generated images, pairings and tasting audio")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, env = "CACAO_PORT", default_value_t = 8080)]
    pub port: u16,

    // Gemini API key; without one every generation fails as "not configured"
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, env = "GEMINI_API_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub api_base_url: String,

    #[arg(long, default_value = DEFAULT_IMAGE_MODEL)]
    pub image_model: String,

    #[arg(long, default_value = DEFAULT_TEXT_MODEL)]
    pub text_model: String,

    #[arg(long, default_value = DEFAULT_TTS_MODEL)]
    pub tts_model: String,

    // Provider request timeout in seconds, 0 = none
    #[arg(long, default_value_t = 0)]
    pub request_timeout: u64,

    // Log level, RUST_LOG wins when set
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Args {
    // legacy frontend variable name is still honoured
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("VITE_GEMINI_API_KEY").ok())
            .filter(|k| !k.trim().is_empty())
    }

    pub fn gemini_config(&self) -> GeminiConfig {
        GeminiConfig {
            api_key: self.resolved_api_key(),
            base_url: self.api_base_url.clone(),
            image_model: self.image_model.clone(),
            text_model: self.text_model.clone(),
            tts_model: self.tts_model.clone(),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.request_timeout > 0).then(|| Duration::from_secs(self.request_timeout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["cacao-gateway", "--api-key", "k"]).unwrap();
        assert_eq!(args.port, 8080);
        assert_eq!(args.image_model, DEFAULT_IMAGE_MODEL);
        assert_eq!(args.timeout(), None);

        let config = args.gemini_config();
        assert_eq!(config.api_key.as_deref(), Some("k"));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn timeout_in_seconds() {
        let args = Args::try_parse_from([
            "cacao-gateway",
            "--api-key",
            "k",
            "--request-timeout",
            "45",
        ])
        .unwrap();
        assert_eq!(args.timeout(), Some(Duration::from_secs(45)));
    }
}
