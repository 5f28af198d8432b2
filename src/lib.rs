pub mod background;
pub mod bedrock;
pub mod brand;
pub mod classifier;
pub mod compositor;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod pipeline;
pub mod render;
#[cfg(feature = "server")]
pub mod server;

pub use background::{Background, BackgroundGenerator, BackgroundProvider};
pub use bedrock::{BedrockClient, ImageClient, TextClient};
pub use brand::{BrandConfig, Canvas, Palette};
pub use classifier::{heuristic_analysis, BedrockAnalyzer, HeuristicClassifier, TitleClassifier};
pub use compositor::{encode_png, Compositor};
pub use config::{BedrockConfig, Config, ImageProviderKind, OpenAiConfig};
pub use error::{Result, ThumbnailError};
pub use models::{
    Analysis, GenerateRequest, GenerateResponse, Template, ThumbnailConfig, ThumbnailOverrides,
};
pub use pipeline::{GeneratedThumbnail, ThumbnailPipeline};
pub use render::TemplateRenderer;
