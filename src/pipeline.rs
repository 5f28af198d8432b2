//! The two orchestrators.
//!
//! Full generation: validate → AI analysis → overrides → background and overlay
//! in parallel → composite → PNG, all under one timeout.
//!
//! Preview: validate → heuristic → gradient → composite → PNG. No network, and
//! the same title always produces the same bytes.

use crate::{
    background::{
        BackgroundGenerator, BackgroundProvider, BedrockImageProvider, OpenAiImageProvider,
    },
    bedrock::BedrockClient,
    brand::BrandConfig,
    classifier::{BedrockAnalyzer, HeuristicClassifier, TitleClassifier},
    compositor::{encode_png, Compositor},
    config::{Config, ImageProviderKind},
    error::{Result, ThumbnailError},
    logger::timer,
    models::{Analysis, GenerateRequest, GenerateResponse, ThumbnailConfig},
    render::TemplateRenderer,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::RgbaImage;
use std::{path::Path, sync::Arc, time::Duration};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

pub fn validate_title(title: &str) -> Result<&str> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ThumbnailError::ValidationError("title is required".into()));
    }
    Ok(title)
}

#[derive(Debug, Clone)]
pub struct GeneratedThumbnail {
    pub png: Vec<u8>,
    pub config: ThumbnailConfig,
    pub analysis: Analysis,
    pub bg_provider: String,
}

impl GeneratedThumbnail {
    pub fn into_response(self) -> GenerateResponse {
        GenerateResponse {
            image: STANDARD.encode(&self.png),
            config: self.config,
            reasoning: self.analysis.reasoning.unwrap_or_default(),
            bg_provider: self.bg_provider,
        }
    }
}

#[derive(Clone)]
pub struct ThumbnailPipeline {
    analyzer: Arc<dyn TitleClassifier>,
    heuristic: HeuristicClassifier,
    backgrounds: BackgroundGenerator,
    renderer: Arc<TemplateRenderer>,
    compositor: Compositor,
    gradient: Arc<RgbaImage>,
    timeout: Duration,
}

impl ThumbnailPipeline {
    pub fn new(
        analyzer: Arc<dyn TitleClassifier>,
        backgrounds: BackgroundGenerator,
        renderer: Arc<TemplateRenderer>,
        brand: Arc<BrandConfig>,
    ) -> Self {
        let gradient = Arc::new(backgrounds.gradient().image);
        Self {
            analyzer,
            heuristic: HeuristicClassifier::new(brand.brand_name.clone()),
            backgrounds,
            renderer,
            compositor: Compositor::new(brand.canvas),
            gradient,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Heuristic analysis and gradient backgrounds only; needs no credentials.
    pub fn local(brand: BrandConfig, font_dir: Option<&Path>) -> Self {
        let brand = Arc::new(brand);
        let renderer = Arc::new(TemplateRenderer::with_font_dir(Arc::clone(&brand), font_dir));
        let analyzer = Arc::new(HeuristicClassifier::new(brand.brand_name.clone()));
        Self::new(analyzer, BackgroundGenerator::new(&brand), renderer, brand)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Wires the Bedrock analyzer and the configured image providers, in order.
    /// Providers that cannot be constructed are skipped with a warning.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let brand = Arc::new(config.brand.clone());
        let renderer = Arc::new(TemplateRenderer::with_font_dir(
            Arc::clone(&brand),
            config.font_dir.as_deref(),
        ));

        let bedrock = BedrockClient::new(config.bedrock.clone().unwrap_or_default()).await?;
        let analyzer = BedrockAnalyzer::new(bedrock.text().clone(), config.analyzer.clone());

        let mut backgrounds = BackgroundGenerator::new(&brand);
        for kind in &config.image_providers {
            let provider: Arc<dyn BackgroundProvider> = match kind {
                ImageProviderKind::Titan => {
                    Arc::new(BedrockImageProvider::titan(bedrock.image().clone()))
                }
                ImageProviderKind::Stability => {
                    Arc::new(BedrockImageProvider::stability(bedrock.image().clone()))
                }
                ImageProviderKind::OpenAi => {
                    let openai = config.openai.clone().unwrap_or_default();
                    match OpenAiImageProvider::new(&openai) {
                        Ok(provider) => Arc::new(provider),
                        Err(e) => {
                            log::warn!("Skipping OpenAI image provider: {}", e);
                            continue;
                        }
                    }
                }
            };
            backgrounds = backgrounds.with_provider(provider);
        }

        Ok(Self::new(Arc::new(analyzer), backgrounds, renderer, brand)
            .with_timeout(config.generation_timeout))
    }

    pub fn analyzer_name(&self) -> &str {
        self.analyzer.name()
    }

    pub fn background_providers(&self) -> Vec<&str> {
        self.backgrounds.provider_ids()
    }

    pub async fn generate(&self, request: GenerateRequest) -> Result<GeneratedThumbnail> {
        let title = validate_title(&request.title)?;
        match tokio::time::timeout(self.timeout, self.run_generate(title, &request)).await {
            Ok(result) => result,
            Err(_) => {
                log::warn!(
                    "Generation for '{}' exceeded {}s",
                    title,
                    self.timeout.as_secs()
                );
                Err(ThumbnailError::TimeoutError(self.timeout))
            }
        }
    }

    async fn run_generate(&self, title: &str, request: &GenerateRequest) -> Result<GeneratedThumbnail> {
        let _total = timer("generate");

        let analysis = {
            let _t = timer("analysis");
            self.analyzer.classify(title).await?
        };

        let config = match &request.overrides {
            Some(overrides) if !overrides.is_empty() => {
                log::debug!("Applying overrides: {:?}", overrides);
                overrides.apply(&analysis)
            }
            _ => analysis.to_config(),
        };

        let prompt = analysis.image_prompt.trim().to_string();
        if prompt.is_empty() {
            return Err(ThumbnailError::BackgroundGenerationError(format!(
                "{} returned an empty image prompt",
                self.analyzer.name()
            )));
        }
        let renderer = Arc::clone(&self.renderer);
        let overlay_config = config.clone();
        let overlay = async move {
            let _t = timer("overlay render");
            tokio::task::spawn_blocking(move || renderer.render(&overlay_config))
                .await
                .map_err(|e| ThumbnailError::InternalError(format!("render task failed: {}", e)))?
        };
        let background = async {
            let _t = timer("background");
            self.backgrounds.generate(Some(&prompt)).await
        };

        let (background, overlay) = tokio::try_join!(background, overlay)?;

        let png = {
            let _t = timer("composite + encode");
            let composed = self.compositor.composite(&background.image, &overlay)?;
            encode_png(&composed)?
        };

        log::info!(
            "Generated '{}' thumbnail ({} bytes, background: {})",
            config.template,
            png.len(),
            background.provider_id
        );

        Ok(GeneratedThumbnail {
            png,
            config,
            analysis,
            bg_provider: background.provider_id,
        })
    }

    /// The rule-based analysis the preview path uses, exposed for the designer tooling.
    pub fn heuristic_analysis(&self, title: &str) -> Result<Analysis> {
        Ok(self.heuristic.analyze(validate_title(title)?))
    }

    /// Preview on a blocking thread, since rasterizing is CPU-bound.
    pub async fn preview(&self, title: &str) -> Result<Vec<u8>> {
        let pipeline = self.clone();
        let title = title.to_string();
        tokio::task::spawn_blocking(move || pipeline.preview_png(&title))
            .await
            .map_err(|e| ThumbnailError::InternalError(format!("preview task failed: {}", e)))?
    }

    pub fn preview_png(&self, title: &str) -> Result<Vec<u8>> {
        let title = validate_title(title)?;
        let _t = timer("preview");
        let config = self.heuristic.analyze(title).to_config();
        log::debug!("Preview of '{}' uses template '{}'", title, config.template);
        self.render_config(&config)
    }

    /// Renders an explicit config over the brand gradient.
    pub fn render_config(&self, config: &ThumbnailConfig) -> Result<Vec<u8>> {
        let overlay = self.renderer.render(config)?;
        let composed = self.compositor.composite(&self.gradient, &overlay)?;
        encode_png(&composed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn titles_are_trimmed_and_required() {
        assert_eq!(validate_title("  60% faster ").unwrap(), "60% faster");
        for blank in ["", "   ", "\n\t"] {
            let err = validate_title(blank).unwrap_err();
            assert_eq!(err.to_string(), "title is required");
        }
    }

    #[test]
    fn response_carries_base64_and_empty_reasoning() {
        let analysis = crate::classifier::heuristic_analysis("60% faster quoting");
        let generated = GeneratedThumbnail {
            png: vec![1, 2, 3],
            config: analysis.to_config(),
            analysis,
            bg_provider: "gradient".to_string(),
        };
        let response = generated.into_response();
        assert_eq!(response.image, "AQID");
        assert_eq!(response.reasoning, "");
        assert_eq!(response.bg_provider, "gradient");
    }
}
