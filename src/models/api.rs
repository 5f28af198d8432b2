use super::thumbnail::{ThumbnailConfig, ThumbnailOverrides};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub overrides: Option<ThumbnailOverrides>,
}

impl GenerateRequest {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            overrides: None,
        }
    }

    pub fn with_overrides(mut self, overrides: ThumbnailOverrides) -> Self {
        self.overrides = Some(overrides);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    /// Base64 encoded PNG
    pub image: String,
    pub config: ThumbnailConfig,
    pub reasoning: String,
    pub bg_provider: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreviewQuery {
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
