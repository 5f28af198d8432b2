use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelProvider {
    Amazon,
    Anthropic,
    Meta,
    Mistral,
}

impl ModelProvider {
    /// Best guess from a Bedrock model id or inference profile ARN.
    pub fn from_model_id(model_id: &str) -> Self {
        let id = model_id.to_ascii_lowercase();
        if id.contains("anthropic") || id.contains("claude") || id.starts_with("arn:aws:bedrock") {
            ModelProvider::Anthropic
        } else if id.contains("meta.llama") {
            ModelProvider::Meta
        } else if id.contains("mistral") {
            ModelProvider::Mistral
        } else {
            ModelProvider::Amazon
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextGenerationRequest {
    pub prompt: String,
    pub system: Option<String>,
    pub max_tokens: Option<i32>,
    pub temperature: Option<f32>,
    pub model_id: Option<String>,
    pub provider: Option<ModelProvider>,
}

impl TextGenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system: None,
            max_tokens: None,
            temperature: None,
            model_id: None,
            provider: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TextGenerationResponse {
    pub text: String,
    pub model: String,
    pub finish_reason: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct AnthropicResponse {
    pub content: Vec<AnthropicContent>,
    pub stop_reason: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct AnthropicContent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Serialize, Deserialize)]
pub struct LlamaResponse {
    pub generation: String,
    pub stop_reason: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct MistralResponse {
    pub outputs: Vec<MistralOutput>,
}

#[derive(Serialize, Deserialize)]
pub struct MistralOutput {
    pub text: String,
    pub stop_reason: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct TitanTextResponse {
    pub results: Vec<TitanTextResult>,
}

#[derive(Serialize, Deserialize)]
pub struct TitanTextResult {
    #[serde(rename = "outputText")]
    pub output_text: String,
    #[serde(rename = "completionReason")]
    pub completion_reason: Option<String>,
}
