use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

// Generated artifact - raw bytes + content type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub data: Vec<u8>,
    pub mime_type: String,
}

impl Artifact {
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            data,
            mime_type: mime_type.into(),
        }
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.data)
    }

    /// `data:<mime>;base64,<payload>` form that an `<img src>` accepts directly.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }
}

// POST /api/images
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct ImageRequest {
    pub prompt: String,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct ImageResponse {
    pub prompt: String,
    pub mime_type: String,
    pub data_url: String,
}

// POST /api/pairing
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct PairingRequest {
    pub query: String,
}

// web source the sommelier's answer was grounded on
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct GroundingSource {
    pub title: String,
    pub uri: String,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct PairingResponse {
    pub suggestion: String,
    pub sources: Vec<GroundingSource>,
}

// POST /api/speech
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct SpeechRequest {
    pub text: String,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct SpeechResponse {
    pub mime_type: String,
    pub data: String, // base64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_url_carries_mime_and_base64_payload() {
        let artifact = Artifact::new(b"png!".to_vec(), "image/png");
        assert_eq!(artifact.to_data_url(), "data:image/png;base64,cG5nIQ==");
    }
}
