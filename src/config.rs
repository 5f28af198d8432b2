use crate::brand::BrandConfig;
use crate::error::{Result, ThumbnailError};
use crate::models::ModelProvider;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct BedrockConfig {
    pub region: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
}

impl Default for BedrockConfig {
    fn default() -> Self {
        BedrockConfig {
            region: None,
            access_key: None,
            secret_key: None,
        }
    }
}

impl BedrockConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let region = env::var("AWS_REGION")
            .or_else(|_| env::var("AWS_DEFAULT_REGION"))
            .ok();
        let access_key = env::var("AWS_ACCESS_KEY_ID").ok();
        let secret_key = env::var("AWS_SECRET_ACCESS_KEY").ok();

        BedrockConfig {
            region,
            access_key,
            secret_key,
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_credentials(
        mut self,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        self.access_key = Some(access_key.into());
        self.secret_key = Some(secret_key.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub size: String,
    pub base_url: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        OpenAiConfig {
            api_key: None,
            model: "gpt-image-1".to_string(),
            size: "1536x1024".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }
}

impl OpenAiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        OpenAiConfig {
            api_key: env::var("OPENAI_API_KEY").ok(),
            model: env::var("OPENAI_IMAGE_MODEL").unwrap_or(defaults.model),
            size: env::var("OPENAI_IMAGE_SIZE").unwrap_or(defaults.size),
            base_url: env::var("OPENAI_BASE_URL").unwrap_or(defaults.base_url),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

/// Which model writes the thumbnail copy in full-generation mode.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    pub model_id: String,
    pub provider: ModelProvider,
    pub max_tokens: i32,
    pub temperature: f32,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        let model_id = crate::bedrock::text_client::DEFAULT_TEXT_MODEL.to_string();
        AnalyzerConfig {
            provider: ModelProvider::from_model_id(&model_id),
            model_id,
            max_tokens: 800,
            temperature: 0.7,
        }
    }
}

impl AnalyzerConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(model_id) = env::var("THUMBGEN_ANALYZER_MODEL") {
            config.provider = ModelProvider::from_model_id(&model_id);
            config.model_id = model_id;
        }
        let provider = env::var("THUMBGEN_ANALYZER_PROVIDER")
            .ok()
            .and_then(|value| serde_json::from_value(serde_json::json!(value.to_lowercase())).ok());
        if let Some(provider) = provider {
            config.provider = provider;
        }
        config
    }
}

/// Background image backends, tried in the configured order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageProviderKind {
    Titan,
    Stability,
    OpenAi,
}

impl ImageProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageProviderKind::Titan => "titan",
            ImageProviderKind::Stability => "stability",
            ImageProviderKind::OpenAi => "openai",
        }
    }
}

impl FromStr for ImageProviderKind {
    type Err = ThumbnailError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "titan" | "bedrock" => Ok(ImageProviderKind::Titan),
            "stability" | "sdxl" => Ok(ImageProviderKind::Stability),
            "openai" => Ok(ImageProviderKind::OpenAi),
            other => Err(ThumbnailError::ConfigError(format!(
                "unknown image provider '{}'",
                other
            ))),
        }
    }
}

/// Parses a comma list such as `titan,openai`. Blank entries are skipped.
pub fn parse_provider_list(value: &str) -> Result<Vec<ImageProviderKind>> {
    value
        .split(',')
        .filter(|item| !item.trim().is_empty())
        .map(str::parse)
        .collect()
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: Option<u16>,
    pub bedrock: Option<BedrockConfig>,
    pub openai: Option<OpenAiConfig>,
    pub analyzer: AnalyzerConfig,
    pub image_providers: Vec<ImageProviderKind>,
    pub generation_timeout: Duration,
    pub font_dir: Option<PathBuf>,
    pub brand: BrandConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: None,
            bedrock: None,
            openai: None,
            analyzer: AnalyzerConfig::default(),
            image_providers: vec![ImageProviderKind::Titan, ImageProviderKind::Stability],
            generation_timeout: Duration::from_secs(DEFAULT_GENERATION_TIMEOUT_SECS),
            font_dir: None,
            brand: BrandConfig::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let port = env::var("PORT").ok().and_then(|port| port.parse().ok());
        let image_providers = match env::var("THUMBGEN_IMAGE_PROVIDERS") {
            Ok(value) => parse_provider_list(&value)?,
            Err(_) => defaults.image_providers,
        };
        let generation_timeout = env::var("THUMBGEN_GENERATION_TIMEOUT_SECS")
            .ok()
            .and_then(|secs| secs.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.generation_timeout);
        let font_dir = env::var("THUMBGEN_FONT_DIR").ok().map(PathBuf::from);

        let openai = OpenAiConfig::from_env();
        let openai = if openai.api_key.is_some() {
            Some(openai)
        } else {
            None
        };

        Ok(Config {
            port,
            bedrock: Some(BedrockConfig::from_env()),
            openai,
            analyzer: AnalyzerConfig::from_env(),
            image_providers,
            generation_timeout,
            font_dir,
            brand: BrandConfig::from_env(),
        })
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_bedrock(mut self, config: BedrockConfig) -> Self {
        self.bedrock = Some(config);
        self
    }

    pub fn with_openai(mut self, config: OpenAiConfig) -> Self {
        self.openai = Some(config);
        self
    }

    pub fn with_image_providers(mut self, providers: Vec<ImageProviderKind>) -> Self {
        self.image_providers = providers;
        self
    }

    pub fn with_generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = timeout;
        self
    }

    pub fn with_brand(mut self, brand: BrandConfig) -> Self {
        self.brand = brand;
        self
    }

    pub fn port_or_default(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }
}
