use super::BackgroundProvider;
use crate::{
    bedrock::{
        image_client::{STABILITY_IMAGE_MODEL, TITAN_IMAGE_MODEL},
        ImageClient,
    },
    brand::Canvas,
    config::ImageProviderKind,
    error::{Result, ThumbnailError},
    models::ImageGenerationRequest,
};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};

const NEGATIVE_PROMPT: &str = "text, letters, words, watermark, logo, signature, blurry";

/// Bedrock-hosted image model (Titan Image Generator or Stability SDXL).
#[derive(Clone)]
pub struct BedrockImageProvider {
    client: ImageClient,
    id: &'static str,
    model_id: &'static str,
}

impl BedrockImageProvider {
    pub fn titan(client: ImageClient) -> Self {
        Self {
            client,
            id: ImageProviderKind::Titan.as_str(),
            model_id: TITAN_IMAGE_MODEL,
        }
    }

    pub fn stability(client: ImageClient) -> Self {
        Self {
            client,
            id: ImageProviderKind::Stability.as_str(),
            model_id: STABILITY_IMAGE_MODEL,
        }
    }

    /// Closest 16:9-ish size the model accepts. The result is cropped to the canvas later.
    fn request_size(&self) -> (u32, u32) {
        if self.model_id.starts_with("stability.") {
            (1344, 768)
        } else {
            (1152, 640)
        }
    }

    fn build_request(&self, prompt: &str) -> ImageGenerationRequest {
        let (width, height) = self.request_size();
        ImageGenerationRequest {
            prompt: prompt.to_string(),
            negative_prompt: Some(NEGATIVE_PROMPT.to_string()),
            model_id: Some(self.model_id.to_string()),
            width: Some(width),
            height: Some(height),
        }
    }
}

#[async_trait]
impl BackgroundProvider for BedrockImageProvider {
    fn id(&self) -> &str {
        self.id
    }

    async fn generate(&self, prompt: &str, canvas: Canvas) -> Result<Vec<u8>> {
        log::debug!(
            "Bedrock background via {} for {}x{} canvas",
            self.model_id,
            canvas.width,
            canvas.height
        );
        let response = self.client.generate(self.build_request(prompt)).await?;
        STANDARD
            .decode(response.image_data.as_bytes())
            .map_err(|e| ThumbnailError::ResponseError(format!("invalid base64 image: {}", e)))
    }
}
