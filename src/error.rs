use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ThumbnailError {
    /// Missing or empty caller input. The message is returned to the client verbatim.
    #[error("{0}")]
    ValidationError(String),
    #[error("Analysis error: {0}")]
    AnalysisError(String),
    #[error("Background generation error: {0}")]
    BackgroundGenerationError(String),
    #[error("Render error: {0}")]
    RenderError(String),
    /// Background and overlay disagree on size. Always a bug, never caller-caused.
    #[error("Composition error: {0}")]
    CompositionError(String),
    #[error("Generation timed out after {}s", .0.as_secs())]
    TimeoutError(Duration),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Request error: {0}")]
    RequestError(String),
    #[error("Response error: {0}")]
    ResponseError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("AWS error: {0}")]
    AwsError(String),
    #[error("AWS service error: {0}")]
    AwsServiceError(String),
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ThumbnailError {
    pub fn is_client_error(&self) -> bool {
        matches!(self, ThumbnailError::ValidationError(_))
    }
}

impl From<image::ImageError> for ThumbnailError {
    fn from(e: image::ImageError) -> Self {
        ThumbnailError::InternalError(format!("image codec: {}", e))
    }
}

impl From<serde_json::Error> for ThumbnailError {
    fn from(e: serde_json::Error) -> Self {
        ThumbnailError::SerializationError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ThumbnailError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_is_bare() {
        let err = ThumbnailError::ValidationError("title is required".into());
        assert_eq!(err.to_string(), "title is required");
        assert!(err.is_client_error());
    }

    #[test]
    fn timeout_reports_seconds() {
        let err = ThumbnailError::TimeoutError(Duration::from_secs(60));
        assert_eq!(err.to_string(), "Generation timed out after 60s");
        assert!(!err.is_client_error());
    }
}
