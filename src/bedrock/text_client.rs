use crate::{
    error::{Result, ThumbnailError},
    models::{
        AnthropicResponse, LlamaResponse, MistralResponse, ModelProvider, TextGenerationRequest,
        TextGenerationResponse, TitanTextResponse,
    },
};
use aws_sdk_bedrockruntime::{error::ProvideErrorMetadata, primitives::Blob, Client};
use serde_json::json;

pub const DEFAULT_TEXT_MODEL: &str = "anthropic.claude-3-haiku-20240307-v1:0";

#[derive(Clone)]
pub struct TextClient {
    client: Client,
}

impl TextClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn generate(&self, request: TextGenerationRequest) -> Result<TextGenerationResponse> {
        let model_id = request
            .model_id
            .clone()
            .unwrap_or_else(|| DEFAULT_TEXT_MODEL.to_string());
        let provider = request
            .provider
            .unwrap_or_else(|| ModelProvider::from_model_id(&model_id));

        let request_payload = build_request_payload(&request, provider);
        let request_json = serde_json::to_string(&request_payload)
            .map_err(|e| ThumbnailError::SerializationError(e.to_string()))?;

        log::info!("Invoking model: {}", model_id);
        log::debug!("Text generation request payload: {}", request_json);

        let response = self
            .client
            .invoke_model()
            .model_id(&model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(request_json.into_bytes()))
            .send()
            .await
            .map_err(|e| {
                log::error!("Bedrock text generation error details: {:?}", e);

                if let Some(service_error) = e.as_service_error() {
                    ThumbnailError::AwsServiceError(format!(
                        "Bedrock service error: {} - {}",
                        service_error.code().unwrap_or("unknown"),
                        service_error.message().unwrap_or("no message")
                    ))
                } else {
                    ThumbnailError::AwsError(format!("AWS SDK error: {}", e))
                }
            })?;

        let response_bytes = response.body.into_inner();
        let body = String::from_utf8(response_bytes)
            .map_err(|e| ThumbnailError::ResponseError(e.to_string()))?;

        parse_completion(provider, &model_id, &body)
    }
}

fn build_request_payload(request: &TextGenerationRequest, provider: ModelProvider) -> serde_json::Value {
    let max_tokens = request.max_tokens.unwrap_or(1024);
    let temperature = request.temperature.unwrap_or(0.7);

    match provider {
        ModelProvider::Anthropic => {
            let mut payload = json!({
                "messages": [
                    {
                        "role": "user",
                        "content": request.prompt
                    }
                ],
                "max_tokens": max_tokens,
                "temperature": temperature,
                "anthropic_version": "bedrock-2023-05-31"
            });
            if let (Some(system), Some(obj)) = (&request.system, payload.as_object_mut()) {
                obj.insert("system".to_string(), json!(system));
            }
            payload
        }
        ModelProvider::Amazon => json!({
            "inputText": with_system_preamble(request),
            "textGenerationConfig": {
                "maxTokenCount": max_tokens,
                "temperature": temperature,
                "topP": 0.9
            }
        }),
        ModelProvider::Meta => json!({
            "prompt": with_system_preamble(request),
            "max_gen_len": max_tokens,
            "temperature": temperature,
            "top_p": 0.9
        }),
        ModelProvider::Mistral => json!({
            "prompt": format!("<s>[INST] {} [/INST]", with_system_preamble(request)),
            "max_tokens": max_tokens,
            "temperature": temperature,
            "top_p": 0.9
        }),
    }
}

/// Models without a system slot get the instructions prepended to the prompt.
fn with_system_preamble(request: &TextGenerationRequest) -> String {
    match &request.system {
        Some(system) => format!("{}\n\n{}", system, request.prompt),
        None => request.prompt.clone(),
    }
}

/// Pulls the generated text out of a provider-specific response body.
pub(crate) fn parse_completion(
    provider: ModelProvider,
    model_id: &str,
    body: &str,
) -> Result<TextGenerationResponse> {
    let (text, finish_reason) = match provider {
        ModelProvider::Anthropic => {
            let parsed: AnthropicResponse = serde_json::from_str(body)
                .map_err(|e| ThumbnailError::ResponseError(e.to_string()))?;
            let text = parsed
                .content
                .iter()
                .filter(|block| block.kind == "text")
                .map(|block| block.text.as_str())
                .collect::<Vec<_>>()
                .join("");
            (text, parsed.stop_reason)
        }
        ModelProvider::Amazon => {
            let parsed: TitanTextResponse = serde_json::from_str(body)
                .map_err(|e| ThumbnailError::ResponseError(e.to_string()))?;
            let first = parsed
                .results
                .into_iter()
                .next()
                .ok_or_else(|| ThumbnailError::ResponseError("No results returned".into()))?;
            (first.output_text, first.completion_reason)
        }
        ModelProvider::Meta => {
            let parsed: LlamaResponse = serde_json::from_str(body)
                .map_err(|e| ThumbnailError::ResponseError(e.to_string()))?;
            (parsed.generation, parsed.stop_reason)
        }
        ModelProvider::Mistral => {
            let parsed: MistralResponse = serde_json::from_str(body)
                .map_err(|e| ThumbnailError::ResponseError(e.to_string()))?;
            let first = parsed
                .outputs
                .into_iter()
                .next()
                .ok_or_else(|| ThumbnailError::ResponseError("No outputs returned".into()))?;
            (first.text, first.stop_reason)
        }
    };

    if text.trim().is_empty() {
        return Err(ThumbnailError::ResponseError("Model returned no text".into()));
    }

    Ok(TextGenerationResponse {
        text,
        model: model_id.to_string(),
        finish_reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anthropic_payload_carries_system_prompt() {
        let mut request = TextGenerationRequest::new("title");
        request.system = Some("be brief".to_string());
        let payload = build_request_payload(&request, ModelProvider::Anthropic);
        assert_eq!(payload["system"], "be brief");
        assert_eq!(payload["messages"][0]["content"], "title");
    }

    #[test]
    fn titan_payload_inlines_system_prompt() {
        let mut request = TextGenerationRequest::new("title");
        request.system = Some("be brief".to_string());
        let payload = build_request_payload(&request, ModelProvider::Amazon);
        assert_eq!(payload["inputText"], "be brief\n\ntitle");
    }

    #[test]
    fn parses_anthropic_completion() {
        let body = r#"{"content":[{"type":"text","text":"{\"a\":1}"}],"stop_reason":"end_turn"}"#;
        let response = parse_completion(ModelProvider::Anthropic, "claude", body).unwrap();
        assert_eq!(response.text, "{\"a\":1}");
        assert_eq!(response.finish_reason.as_deref(), Some("end_turn"));
    }

    #[test]
    fn parses_titan_completion() {
        let body = r#"{"results":[{"outputText":"hello","completionReason":"FINISH"}]}"#;
        let response = parse_completion(ModelProvider::Amazon, "titan", body).unwrap();
        assert_eq!(response.text, "hello");
    }

    #[test]
    fn empty_completion_is_an_error() {
        let body = r#"{"generation":"   ","stop_reason":"stop"}"#;
        assert!(parse_completion(ModelProvider::Meta, "llama", body).is_err());
        assert!(parse_completion(ModelProvider::Mistral, "mistral", "not json").is_err());
    }
}
