use crate::{
    error::{Result, ThumbnailError},
    models::{
        ImageGenerationRequest, ImageGenerationResponse, StabilityImageResponse,
        TitanImageResponse,
    },
};
use aws_sdk_bedrockruntime::{error::ProvideErrorMetadata, primitives::Blob, Client};
use serde_json::json;

pub const TITAN_IMAGE_MODEL: &str = "amazon.titan-image-generator-v2:0";
pub const STABILITY_IMAGE_MODEL: &str = "stability.stable-diffusion-xl-v1";

#[derive(Clone)]
pub struct ImageClient {
    client: Client,
}

impl ImageClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn generate(
        &self,
        request: ImageGenerationRequest,
    ) -> Result<ImageGenerationResponse> {
        let model_id = request.model_id.as_deref().unwrap_or(TITAN_IMAGE_MODEL);
        let request_payload = build_request_payload(&request, model_id)?;

        let request_json = serde_json::to_string(&request_payload)
            .map_err(|e| ThumbnailError::SerializationError(e.to_string()))?;

        log::info!("Generating image with model: {}", model_id);

        let response = self
            .client
            .invoke_model()
            .model_id(model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(request_json.into_bytes()))
            .send()
            .await
            .map_err(|e| match e.as_service_error() {
                Some(service_error) => ThumbnailError::AwsServiceError(format!(
                    "Bedrock service error: {} - {}",
                    service_error.code().unwrap_or("unknown"),
                    service_error.message().unwrap_or("no message")
                )),
                None => ThumbnailError::AwsError(e.to_string()),
            })?;

        let response_bytes = response.body.into_inner();
        let response_str = String::from_utf8(response_bytes)
            .map_err(|e| ThumbnailError::ResponseError(e.to_string()))?;

        let image_data = parse_image_response(model_id, &response_str)?;

        Ok(ImageGenerationResponse {
            image_data,
            model: model_id.to_string(),
        })
    }
}

fn build_request_payload(
    request: &ImageGenerationRequest,
    model_id: &str,
) -> Result<serde_json::Value> {
    let width = request.width.unwrap_or(1024);
    let height = request.height.unwrap_or(1024);

    let payload = match model_id {
        id if id.starts_with("amazon.titan-image") => {
            let mut params = json!({ "text": request.prompt });
            if let Some(negative) = &request.negative_prompt {
                params["negativeText"] = json!(negative);
            }
            json!({
                "taskType": "TEXT_IMAGE",
                "textToImageParams": params,
                "imageGenerationConfig": {
                    "numberOfImages": 1,
                    "quality": "standard",
                    "width": width,
                    "height": height,
                    "cfgScale": 8.0
                }
            })
        }
        id if id.starts_with("stability.") => {
            let mut prompts = vec![json!({ "text": request.prompt, "weight": 1.0 })];
            if let Some(negative) = &request.negative_prompt {
                prompts.push(json!({ "text": negative, "weight": -1.0 }));
            }
            json!({
                "text_prompts": prompts,
                "cfg_scale": 7,
                "steps": 30,
                "width": width,
                "height": height
            })
        }
        _ => {
            return Err(ThumbnailError::RequestError(format!(
                "Unsupported image model: {}",
                model_id
            )))
        }
    };

    Ok(payload)
}

/// Returns the first image as base64.
fn parse_image_response(model_id: &str, body: &str) -> Result<String> {
    if model_id.starts_with("stability.") {
        let parsed: StabilityImageResponse = serde_json::from_str(body)
            .map_err(|e| ThumbnailError::ResponseError(e.to_string()))?;
        return parsed
            .artifacts
            .into_iter()
            .next()
            .map(|artifact| artifact.base64)
            .ok_or_else(|| ThumbnailError::ResponseError("No images generated".into()));
    }

    let parsed: TitanImageResponse = serde_json::from_str(body)
        .map_err(|e| ThumbnailError::ResponseError(e.to_string()))?;
    if let Some(error) = parsed.error {
        return Err(ThumbnailError::ResponseError(error));
    }
    parsed
        .images
        .into_iter()
        .next()
        .ok_or_else(|| ThumbnailError::ResponseError("No images generated".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn titan_payload_uses_requested_size() {
        let mut request = ImageGenerationRequest::new("green streaks");
        request.width = Some(1152);
        request.height = Some(640);
        let payload = build_request_payload(&request, TITAN_IMAGE_MODEL).unwrap();
        assert_eq!(payload["taskType"], "TEXT_IMAGE");
        assert_eq!(payload["imageGenerationConfig"]["width"], 1152);
        assert_eq!(payload["textToImageParams"]["text"], "green streaks");
    }

    #[test]
    fn stability_payload_weights_negative_prompt() {
        let mut request = ImageGenerationRequest::new("office");
        request.negative_prompt = Some("text, letters".to_string());
        let payload = build_request_payload(&request, STABILITY_IMAGE_MODEL).unwrap();
        assert_eq!(payload["text_prompts"][1]["weight"], -1.0);
    }

    #[test]
    fn unknown_model_is_rejected() {
        let request = ImageGenerationRequest::new("x");
        assert!(build_request_payload(&request, "vendor.painter-v9").is_err());
    }

    #[test]
    fn parses_both_response_shapes() {
        let titan = r#"{"images":["aGVsbG8="],"error":null}"#;
        assert_eq!(parse_image_response(TITAN_IMAGE_MODEL, titan).unwrap(), "aGVsbG8=");

        let stability = r#"{"artifacts":[{"base64":"d29ybGQ=","finishReason":"SUCCESS"}]}"#;
        assert_eq!(
            parse_image_response(STABILITY_IMAGE_MODEL, stability).unwrap(),
            "d29ybGQ="
        );

        let empty = r#"{"images":[]}"#;
        assert!(parse_image_response(TITAN_IMAGE_MODEL, empty).is_err());
    }
}
