use super::BackgroundProvider;
use crate::{
    brand::Canvas,
    config::{ImageProviderKind, OpenAiConfig},
    error::{Result, ThumbnailError},
    models::OpenAiImageResponse,
};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

/// OpenAI images API (`/images/generations`), base64 response format.
#[derive(Clone)]
pub struct OpenAiImageProvider {
    client: Client,
    api_key: String,
    model: String,
    size: String,
    endpoint: String,
}

impl OpenAiImageProvider {
    pub fn new(config: &OpenAiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ThumbnailError::ConfigError("OPENAI_API_KEY is not set".into()))?;

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ThumbnailError::ConfigError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
            size: config.size.clone(),
            endpoint: format!("{}/images/generations", config.base_url.trim_end_matches('/')),
        })
    }

    fn payload(&self, prompt: &str) -> serde_json::Value {
        // dall-e models need an explicit response format; gpt-image models always return b64.
        if self.model.starts_with("dall-e") {
            json!({
                "model": self.model,
                "prompt": prompt,
                "n": 1,
                "size": self.size,
                "response_format": "b64_json",
            })
        } else {
            json!({
                "model": self.model,
                "prompt": prompt,
                "n": 1,
                "size": self.size,
                "output_format": "png",
            })
        }
    }
}

#[async_trait]
impl BackgroundProvider for OpenAiImageProvider {
    fn id(&self) -> &str {
        ImageProviderKind::OpenAi.as_str()
    }

    async fn generate(&self, prompt: &str, _canvas: Canvas) -> Result<Vec<u8>> {
        log::debug!("OpenAI background via {} ({})", self.model, self.size);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.payload(prompt))
            .send()
            .await
            .map_err(|e| ThumbnailError::RequestError(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ThumbnailError::ResponseError(e.to_string()))?;
        if !status.is_success() {
            return Err(ThumbnailError::ResponseError(format!(
                "OpenAI images API returned {}: {}",
                status,
                String::from_utf8_lossy(&body)
            )));
        }

        decode_response(&body)
    }
}

fn decode_response(body: &[u8]) -> Result<Vec<u8>> {
    let parsed: OpenAiImageResponse = serde_json::from_slice(body)
        .map_err(|e| ThumbnailError::ResponseError(e.to_string()))?;
    let encoded = parsed
        .data
        .into_iter()
        .find_map(|item| item.b64_json)
        .ok_or_else(|| ThumbnailError::ResponseError("No image data returned".into()))?;
    STANDARD
        .decode(encoded.as_bytes())
        .map_err(|e| ThumbnailError::ResponseError(format!("invalid base64 image: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_api_key() {
        let err = OpenAiImageProvider::new(&OpenAiConfig::default()).err().unwrap();
        assert!(matches!(err, ThumbnailError::ConfigError(_)));
    }

    #[test]
    fn endpoint_and_payload() {
        let config = OpenAiConfig {
            base_url: "http://localhost:9000/v1/".to_string(),
            ..OpenAiConfig::default().with_api_key("sk-test")
        };
        let provider = OpenAiImageProvider::new(&config).unwrap();
        assert_eq!(provider.endpoint, "http://localhost:9000/v1/images/generations");
        assert_eq!(provider.id(), "openai");

        let payload = provider.payload("green office");
        assert_eq!(payload["model"], "gpt-image-1");
        assert_eq!(payload["size"], "1536x1024");
        assert!(payload.get("response_format").is_none());
    }

    #[test]
    fn decodes_first_b64_entry() {
        let body = br#"{"data":[{"b64_json":null},{"b64_json":"aGVsbG8="}]}"#;
        assert_eq!(decode_response(body).unwrap(), b"hello");
        assert!(decode_response(br#"{"data":[]}"#).is_err());
    }
}
