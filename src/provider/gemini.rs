use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, warn};

use super::{GenerationProvider, TastingService};
use crate::cache::prompt_fingerprint;
use crate::error::ProviderError;
use crate::models::{Artifact, GroundingSource, PairingResponse};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_TTS_MODEL: &str = "gemini-2.5-flash-preview-tts";

const DEFAULT_IMAGE_MIME: &str = "image/png";
// raw 16-bit mono PCM, what the TTS model emits
const DEFAULT_AUDIO_MIME: &str = "audio/L16;codec=pcm;rate=24000";
const TTS_VOICE: &str = "Fenrir";

const SOMMELIER_INSTRUCTION: &str = "You are a world-class chocolate sommelier. Provide a sophisticated and concise pairing suggestion (maximum 80 words) for the user's query. Explain why the chocolate profile (dark, nutty, floral, etc.) complements the query item. Use an elegant and descriptive tone.";
const PAIRING_APOLOGY: &str = "I apologize, I could not generate a pairing at this moment.";

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub image_model: String,
    pub text_model: String,
    pub tts_model: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            tts_model: DEFAULT_TTS_MODEL.to_string(),
        }
    }
}

// Gemini generateContent over REST
pub struct GeminiClient {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(client: reqwest::Client, config: GeminiConfig) -> Self {
        // blank key counts as missing
        let api_key = config.api_key.filter(|k| !k.trim().is_empty());
        Self {
            client,
            config: GeminiConfig { api_key, ..config },
        }
    }

    pub fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    async fn generate_content(
        &self,
        model: &str,
        body: &Value,
    ) -> Result<GenerateContentResponse, ProviderError> {
        // fail fast, no network io without a key
        let api_key = self.config.api_key.as_deref().ok_or_else(|| {
            ProviderError::NotConfigured("set GEMINI_API_KEY to enable generation".to_string())
        })?;

        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model
        );

        let res = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(body)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(ProviderError::Upstream {
                status: status.as_u16(),
                message: upstream_message(&text),
            });
        }

        Ok(res.json::<GenerateContentResponse>().await?)
    }
}

#[async_trait]
impl GenerationProvider for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<Artifact, ProviderError> {
        debug!(prompt = %prompt_fingerprint(prompt), model = %self.config.image_model, "requesting image");

        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });
        let response = self.generate_content(&self.config.image_model, &body).await?;

        first_inline_artifact(&response, DEFAULT_IMAGE_MIME)?.ok_or_else(|| {
            ProviderError::NoArtifact("no image data found in response".to_string())
        })
    }
}

#[async_trait]
impl TastingService for GeminiClient {
    async fn pairing_suggestion(&self, query: &str) -> Result<PairingResponse, ProviderError> {
        let body = json!({
            "contents": [{
                "parts": [{ "text": format!("Suggest a premium dark chocolate pairing for: \"{}\"", query) }]
            }],
            "systemInstruction": { "parts": [{ "text": SOMMELIER_INSTRUCTION }] },
            "tools": [{ "googleSearch": {} }],
            "generationConfig": { "thinkingConfig": { "thinkingBudget": 0 } }
        });

        let response = self
            .generate_content(&self.config.text_model, &body)
            .await
            .inspect_err(|e| warn!(error = %e, "pairing request failed"))?;

        Ok(pairing_from_response(&response))
    }

    async fn tasting_audio(&self, text: &str) -> Result<Artifact, ProviderError> {
        let body = json!({
            "contents": [{
                "parts": [{ "text": format!("Say in a smooth, informative, and luxurious tone: \"{}\"", text) }]
            }],
            "generationConfig": {
                "responseModalities": ["AUDIO"],
                "speechConfig": {
                    "voiceConfig": { "prebuiltVoiceConfig": { "voiceName": TTS_VOICE } }
                }
            }
        });

        let response = self
            .generate_content(&self.config.tts_model, &body)
            .await
            .inspect_err(|e| warn!(error = %e, "tts request failed"))?;

        leading_inline_artifact(&response, DEFAULT_AUDIO_MIME)?
            .ok_or_else(|| ProviderError::NoArtifact("no audio data received".to_string()))
    }
}

// Wire format (subset of generateContent we read)

#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Deserialize, Serialize, Debug, Default)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub inline_data: Option<InlineData>,
}

#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub data: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMetadata {
    #[serde(default)]
    pub grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Deserialize, Serialize, Debug, Default)]
pub struct GroundingChunk {
    #[serde(default)]
    pub web: Option<WebChunk>,
}

#[derive(Deserialize, Serialize, Debug, Default)]
pub struct WebChunk {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

fn first_parts(response: &GenerateContentResponse) -> &[Part] {
    response
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .map(|c| c.parts.as_slice())
        .unwrap_or(&[])
}

/// First part of the first candidate carrying non-empty inline data, decoded.
pub fn first_inline_artifact(
    response: &GenerateContentResponse,
    default_mime: &str,
) -> Result<Option<Artifact>, ProviderError> {
    let inline = first_parts(response).iter().find_map(|part| {
        part.inline_data
            .as_ref()
            .filter(|d| d.data.as_deref().is_some_and(|s| !s.is_empty()))
    });

    inline.map(|d| decode_inline(d, default_mime)).transpose()
}

/// Inline data of the very first part only; TTS replies put the audio there.
pub fn leading_inline_artifact(
    response: &GenerateContentResponse,
    default_mime: &str,
) -> Result<Option<Artifact>, ProviderError> {
    let inline = first_parts(response)
        .first()
        .and_then(|part| part.inline_data.as_ref())
        .filter(|d| d.data.as_deref().is_some_and(|s| !s.is_empty()));

    inline.map(|d| decode_inline(d, default_mime)).transpose()
}

fn decode_inline(inline: &InlineData, default_mime: &str) -> Result<Artifact, ProviderError> {
    let encoded = inline.data.as_deref().unwrap_or_default();
    let data = STANDARD
        .decode(encoded)
        .map_err(|e| ProviderError::Decode(e.to_string()))?;
    let mime_type = inline
        .mime_type
        .clone()
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| default_mime.to_string());

    Ok(Artifact::new(data, mime_type))
}

pub fn pairing_from_response(response: &GenerateContentResponse) -> PairingResponse {
    let text: String = first_parts(response)
        .iter()
        .filter_map(|p| p.text.as_deref())
        .collect();
    let suggestion = if text.trim().is_empty() {
        PAIRING_APOLOGY.to_string()
    } else {
        text
    };

    // only web chunks that have both a uri and a title
    let sources: Vec<GroundingSource> = response
        .candidates
        .first()
        .and_then(|c| c.grounding_metadata.as_ref())
        .map(|m| {
            m.grounding_chunks
                .iter()
                .filter_map(|chunk| chunk.web.as_ref())
                .filter_map(|web| match (&web.uri, &web.title) {
                    (Some(uri), Some(title)) if !uri.is_empty() && !title.is_empty() => {
                        Some(GroundingSource {
                            title: title.clone(),
                            uri: uri.clone(),
                        })
                    }
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();

    PairingResponse { suggestion, sources }
}

// Pull `error.message` out of a Gemini error body, else the raw body
fn upstream_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(v: Value) -> GenerateContentResponse {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn picks_first_part_with_inline_data() {
        let response = parse(json!({
            "candidates": [{
                "content": { "parts": [
                    { "text": "here you go" },
                    { "inlineData": { "mimeType": "image/jpeg", "data": "" } },
                    { "inlineData": { "mimeType": "image/webp", "data": "aGVsbG8=" } }
                ]}
            }]
        }));

        let artifact = first_inline_artifact(&response, DEFAULT_IMAGE_MIME)
            .unwrap()
            .unwrap();
        assert_eq!(artifact.data, b"hello");
        assert_eq!(artifact.mime_type, "image/webp");
    }

    #[test]
    fn missing_mime_defaults_to_png() {
        let response = parse(json!({
            "candidates": [{ "content": { "parts": [{ "inlineData": { "data": "aGk=" } }] } }]
        }));

        let artifact = first_inline_artifact(&response, DEFAULT_IMAGE_MIME)
            .unwrap()
            .unwrap();
        assert_eq!(artifact.mime_type, "image/png");
    }

    #[test]
    fn no_inline_data_is_none() {
        let response = parse(json!({
            "candidates": [{ "content": { "parts": [{ "text": "sorry, text only" }] } }]
        }));
        assert!(first_inline_artifact(&response, DEFAULT_IMAGE_MIME).unwrap().is_none());

        let empty = parse(json!({}));
        assert!(first_inline_artifact(&empty, DEFAULT_IMAGE_MIME).unwrap().is_none());
    }

    #[test]
    fn bad_base64_is_decode_error() {
        let response = parse(json!({
            "candidates": [{ "content": { "parts": [{ "inlineData": { "data": "%%%" } }] } }]
        }));
        assert!(matches!(
            first_inline_artifact(&response, DEFAULT_IMAGE_MIME),
            Err(ProviderError::Decode(_))
        ));
    }

    #[test]
    fn audio_is_read_from_the_leading_part_only() {
        let trailing = parse(json!({
            "candidates": [{ "content": { "parts": [
                { "text": "transcript" },
                { "inlineData": { "data": "AAEC" } }
            ]}}]
        }));
        assert!(leading_inline_artifact(&trailing, DEFAULT_AUDIO_MIME).unwrap().is_none());

        let leading = parse(json!({
            "candidates": [{ "content": { "parts": [{ "inlineData": { "data": "AAEC" } }] } }]
        }));
        let audio = leading_inline_artifact(&leading, DEFAULT_AUDIO_MIME)
            .unwrap()
            .unwrap();
        assert_eq!(audio.data, vec![0, 1, 2]);
        assert_eq!(audio.mime_type, DEFAULT_AUDIO_MIME);
    }

    #[test]
    fn pairing_keeps_only_complete_sources() {
        let response = parse(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "A 70% Manabí " }, { "text": "with espresso." }] },
                "groundingMetadata": { "groundingChunks": [
                    { "web": { "uri": "https://a.example", "title": "A" } },
                    { "web": { "uri": "https://b.example" } },
                    { "web": { "title": "C" } },
                    {}
                ]}
            }]
        }));

        let pairing = pairing_from_response(&response);
        assert_eq!(pairing.suggestion, "A 70% Manabí with espresso.");
        assert_eq!(
            pairing.sources,
            vec![GroundingSource {
                title: "A".into(),
                uri: "https://a.example".into()
            }]
        );
    }

    #[test]
    fn empty_pairing_text_falls_back_to_apology() {
        let pairing = pairing_from_response(&parse(json!({ "candidates": [] })));
        assert_eq!(pairing.suggestion, PAIRING_APOLOGY);
        assert!(pairing.sources.is_empty());
    }

    #[test]
    fn upstream_message_prefers_error_field() {
        assert_eq!(
            upstream_message(r#"{"error":{"code":400,"message":"API key not valid"}}"#),
            "API key not valid"
        );
        assert_eq!(upstream_message("bad gateway"), "bad gateway");
    }

    #[tokio::test]
    async fn missing_key_fails_without_network() {
        let client = GeminiClient::new(
            reqwest::Client::new(),
            GeminiConfig {
                api_key: Some("   ".into()),
                base_url: "http://127.0.0.1:9".into(),
                ..GeminiConfig::default()
            },
        );
        assert!(!client.is_configured());

        let err = client.generate("sunset").await.unwrap_err();
        assert!(matches!(err, ProviderError::NotConfigured(_)));

        let err = client.pairing_suggestion("espresso").await.unwrap_err();
        assert!(matches!(err, ProviderError::NotConfigured(_)));

        let err = client.tasting_audio("notes of fig").await.unwrap_err();
        assert!(matches!(err, ProviderError::NotConfigured(_)));
    }
}
