use super::TitleClassifier;
use crate::{
    bedrock::TextClient,
    config::AnalyzerConfig,
    error::{Result, ThumbnailError},
    models::{Analysis, TextGenerationRequest},
};
use async_trait::async_trait;

const SYSTEM_PROMPT: &str = r#"You design YouTube and blog thumbnails for an insurance quoting product.
Pick exactly one template:
- "speed": the title is about saving time or doing something fast
- "conversion": the title is about winning or losing deals, leads or revenue
- "comparison": the title compares the product with a competitor or the status quo
- "feature": the title introduces or explains a capability
- "trust": the title is about security, compliance or reliability
Write punchy copy. The headline is UPPERCASE, at most 6 words, and may use a single "\n" to split it into two balanced lines.
The subtext is one short sentence. The metric is a short number with a unit such as "60%", "24 SEC" or "3X", or "" when the title has no number.
For "comparison" the metric is the product's own number. For "trust" leave metric and metricLabel empty.
The imagePrompt describes a photographic or abstract background with no text or logos, in dark emerald tones.
Respond with a single JSON object and nothing else:
{"template": "...", "headline": "...", "subtext": "...", "metric": "...", "metricLabel": "...", "imagePrompt": "...", "reasoning": "..."}"#;

/// Full-generation analyzer backed by a Bedrock text model.
#[derive(Clone)]
pub struct BedrockAnalyzer {
    client: TextClient,
    config: AnalyzerConfig,
}

impl BedrockAnalyzer {
    pub fn new(client: TextClient, config: AnalyzerConfig) -> Self {
        Self { client, config }
    }

    fn build_request(&self, title: &str) -> TextGenerationRequest {
        TextGenerationRequest {
            prompt: build_prompt(title),
            system: Some(SYSTEM_PROMPT.to_string()),
            max_tokens: Some(self.config.max_tokens),
            temperature: Some(self.config.temperature),
            model_id: Some(self.config.model_id.clone()),
            provider: Some(self.config.provider),
        }
    }
}

#[async_trait]
impl TitleClassifier for BedrockAnalyzer {
    fn name(&self) -> &str {
        &self.config.model_id
    }

    async fn classify(&self, title: &str) -> Result<Analysis> {
        let response = self
            .client
            .generate(self.build_request(title))
            .await
            .map_err(|e| ThumbnailError::AnalysisError(e.to_string()))?;

        log::debug!("Analyzer raw output: {}", response.text);
        let analysis = parse_analysis(&response.text)?;
        log::info!(
            "Analyzer chose template '{}' for title '{}'",
            analysis.template,
            title
        );
        Ok(analysis)
    }
}

fn build_prompt(title: &str) -> String {
    format!("Title: {}\n\nReturn the JSON object now.", title.trim())
}

/// Extracts the first JSON object from model output (which may be fenced or chatty)
/// and validates it into an [`Analysis`].
pub fn parse_analysis(output: &str) -> Result<Analysis> {
    let start = output.find('{');
    let end = output.rfind('}');
    let json = match (start, end) {
        (Some(start), Some(end)) if end > start => &output[start..=end],
        _ => {
            return Err(ThumbnailError::AnalysisError(
                "analyzer output contained no JSON object".into(),
            ))
        }
    };

    let mut analysis: Analysis = serde_json::from_str(json)
        .map_err(|e| ThumbnailError::AnalysisError(format!("unparsable analyzer output: {}", e)))?;

    // Some models double-escape the break marker.
    analysis.headline = analysis.headline.replace("\\n", "\n");
    if analysis.headline.trim().is_empty() {
        return Err(ThumbnailError::AnalysisError(
            "analyzer returned an empty headline".into(),
        ));
    }
    if analysis.image_prompt.trim().is_empty() {
        return Err(ThumbnailError::AnalysisError(
            "analyzer returned an empty image prompt".into(),
        ));
    }
    if !analysis.template.shows_metric() {
        analysis.metric.clear();
        analysis.metric_label.clear();
    }
    Ok(analysis)
}
