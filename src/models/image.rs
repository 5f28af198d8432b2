use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct ImageGenerationRequest {
    pub prompt: String,
    pub negative_prompt: Option<String>,
    pub model_id: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl ImageGenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            negative_prompt: None,
            model_id: None,
            width: None,
            height: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ImageGenerationResponse {
    pub image_data: String, // Base64 encoded
    pub model: String,
}

#[derive(Serialize, Deserialize)]
pub struct TitanImageResponse {
    pub images: Vec<String>,
    pub error: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct StabilityImageResponse {
    pub artifacts: Vec<StabilityArtifact>,
}

#[derive(Serialize, Deserialize)]
pub struct StabilityArtifact {
    pub base64: String,
    #[serde(rename = "finishReason")]
    pub finish_reason: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct OpenAiImageResponse {
    pub data: Vec<OpenAiImageData>,
}

#[derive(Serialize, Deserialize)]
pub struct OpenAiImageData {
    pub b64_json: Option<String>,
}
