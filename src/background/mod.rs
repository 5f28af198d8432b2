//! Background images: a deterministic brand gradient, or an AI image fetched
//! from an ordered list of providers.

pub mod bedrock;
pub mod openai;

use crate::{
    brand::{BrandConfig, Canvas, Palette},
    error::{Result, ThumbnailError},
};
use async_trait::async_trait;
use image::{imageops::FilterType, Rgba, RgbaImage};
use std::sync::Arc;

pub use bedrock::BedrockImageProvider;
pub use openai::OpenAiImageProvider;

pub const GRADIENT_ID: &str = "gradient";

/// A remote text-to-image service.
///
/// Implementations return encoded image bytes (PNG, JPEG, ...); decoding and
/// resizing to the canvas happen in [`BackgroundGenerator`].
#[async_trait]
pub trait BackgroundProvider: Send + Sync {
    fn id(&self) -> &str;

    async fn generate(&self, prompt: &str, canvas: Canvas) -> Result<Vec<u8>>;
}

#[derive(Debug, Clone)]
pub struct Background {
    pub image: RgbaImage,
    pub provider_id: String,
}

#[derive(Clone)]
pub struct BackgroundGenerator {
    providers: Vec<Arc<dyn BackgroundProvider>>,
    canvas: Canvas,
    stops: [[u8; 3]; 3],
}

impl BackgroundGenerator {
    pub fn new(brand: &BrandConfig) -> Self {
        let p = &brand.palette;
        Self {
            providers: Vec::new(),
            canvas: brand.canvas,
            stops: [
                Palette::rgb(&p.ink),
                Palette::rgb(&p.brand),
                Palette::rgb(&p.ink),
            ],
        }
    }

    /// Appends a provider; providers are tried in insertion order.
    pub fn with_provider(mut self, provider: Arc<dyn BackgroundProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn provider_ids(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.id()).collect()
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Diagonal ink → green → ink gradient. Pure function of the brand.
    pub fn gradient(&self) -> Background {
        let Canvas { width, height } = self.canvas;
        let span = (width + height).saturating_sub(2).max(1) as f32;
        let stops = self.stops;

        let image = RgbaImage::from_fn(width, height, |x, y| {
            let t = (x + y) as f32 / span;
            // 0..0.5 rises to the middle stop, 0.5..1 falls back.
            let (from, to, local) = if t <= 0.5 {
                (stops[0], stops[1], t * 2.0)
            } else {
                (stops[1], stops[2], (t - 0.5) * 2.0)
            };
            let mix = |i: usize| {
                (from[i] as f32 + (to[i] as f32 - from[i] as f32) * local).round() as u8
            };
            Rgba([mix(0), mix(1), mix(2), 255])
        });

        Background {
            image,
            provider_id: GRADIENT_ID.to_string(),
        }
    }

    /// `None` yields the gradient. With a prompt, providers are tried in order
    /// and the first decodable image wins.
    pub async fn generate(&self, prompt: Option<&str>) -> Result<Background> {
        let prompt = match prompt {
            Some(prompt) => prompt,
            None => return Ok(self.gradient()),
        };

        if self.providers.is_empty() {
            return Err(ThumbnailError::BackgroundGenerationError(
                "no image providers configured".into(),
            ));
        }

        let mut last_error = None;
        for provider in &self.providers {
            log::debug!("Requesting background from '{}'", provider.id());
            match self.fetch(provider.as_ref(), prompt).await {
                Ok(image) => {
                    log::info!("Background generated by '{}'", provider.id());
                    return Ok(Background {
                        image,
                        provider_id: provider.id().to_string(),
                    });
                }
                Err(e) => {
                    log::warn!("Background provider '{}' failed: {}", provider.id(), e);
                    last_error = Some(e);
                }
            }
        }

        let reason = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "unknown failure".to_string());
        Err(ThumbnailError::BackgroundGenerationError(format!(
            "all image providers failed; last error: {}",
            reason
        )))
    }

    async fn fetch(&self, provider: &dyn BackgroundProvider, prompt: &str) -> Result<RgbaImage> {
        let bytes = provider.generate(prompt, self.canvas).await?;
        fit_to_canvas(&bytes, self.canvas)
    }
}

/// Decodes `bytes` and scales/center-crops the result to exactly `canvas`.
pub fn fit_to_canvas(bytes: &[u8], canvas: Canvas) -> Result<RgbaImage> {
    let decoded = image::load_from_memory(bytes).map_err(|e| {
        ThumbnailError::BackgroundGenerationError(format!("provider returned undecodable image: {}", e))
    })?;
    if canvas.matches(decoded.width(), decoded.height()) {
        return Ok(decoded.to_rgba8());
    }
    Ok(decoded
        .resize_to_fill(canvas.width, canvas.height, FilterType::Lanczos3)
        .to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbImage};
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Stub {
        id: &'static str,
        response: std::result::Result<Vec<u8>, &'static str>,
        calls: AtomicUsize,
    }

    impl Stub {
        fn ok(id: &'static str, bytes: Vec<u8>) -> Arc<Self> {
            Arc::new(Self {
                id,
                response: Ok(bytes),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(id: &'static str, message: &'static str) -> Arc<Self> {
            Arc::new(Self {
                id,
                response: Err(message),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl BackgroundProvider for Stub {
        fn id(&self) -> &str {
            self.id
        }

        async fn generate(&self, _prompt: &str, _canvas: Canvas) -> Result<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.response
                .clone()
                .map_err(|m| ThumbnailError::ResponseError(m.to_string()))
        }
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        RgbImage::from_pixel(width, height, image::Rgb([200, 10, 10]))
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn gradient_is_deterministic_and_opaque() {
        let generator = BackgroundGenerator::new(&BrandConfig::default());
        let a = generator.gradient();
        let b = generator.gradient();
        assert_eq!(a.provider_id, "gradient");
        assert_eq!(a.image.dimensions(), (1280, 720));
        assert_eq!(a.image.as_raw(), b.image.as_raw());
        assert!(a.image.pixels().all(|p| p.0[3] == 255));
        // Corners sit on the ink stop, the centre on the green one.
        assert_eq!(a.image.get_pixel(0, 0).0, [0x07, 0x12, 0x0e, 255]);
        assert!(a.image.get_pixel(640, 360).0[1] > a.image.get_pixel(0, 0).0[1]);
    }

    #[test]
    fn gradient_peaks_at_brand_green() {
        let brand = BrandConfig::default();
        let generator = BackgroundGenerator::new(&brand);
        let centre = generator.gradient().image.get_pixel(640, 360).0;
        let green = Palette::rgb(&brand.palette.brand);
        for i in 0..3 {
            assert!(centre[i].abs_diff(green[i]) <= 2, "{:?} vs {:?}", centre, green);
        }
    }

    #[tokio::test]
    async fn no_prompt_means_gradient() {
        let stub = Stub::ok("titan", png(8, 8));
        let generator = BackgroundGenerator::new(&BrandConfig::default()).with_provider(stub.clone());
        let bg = generator.generate(None).await.unwrap();
        assert_eq!(bg.provider_id, "gradient");
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn falls_back_in_order() {
        let first = Stub::failing("titan", "throttled");
        let second = Stub::ok("openai", png(1536, 1024));
        let third = Stub::ok("stability", png(8, 8));
        let generator = BackgroundGenerator::new(&BrandConfig::default())
            .with_provider(first.clone())
            .with_provider(second.clone())
            .with_provider(third.clone());

        let bg = generator.generate(Some("emerald office")).await.unwrap();
        assert_eq!(bg.provider_id, "openai");
        assert_eq!(bg.image.dimensions(), (1280, 720));
        assert_eq!(first.calls.load(Ordering::SeqCst), 1);
        assert_eq!(third.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn undecodable_bytes_count_as_failure() {
        let generator = BackgroundGenerator::new(&BrandConfig::default())
            .with_provider(Stub::ok("titan", b"not an image".to_vec()))
            .with_provider(Stub::ok("stability", png(640, 360)));
        let bg = generator.generate(Some("x")).await.unwrap();
        assert_eq!(bg.provider_id, "stability");
    }

    #[tokio::test]
    async fn all_failing_reports_last_error() {
        let generator = BackgroundGenerator::new(&BrandConfig::default())
            .with_provider(Stub::failing("titan", "first"))
            .with_provider(Stub::failing("openai", "second"));
        let err = generator.generate(Some("x")).await.unwrap_err();
        match err {
            ThumbnailError::BackgroundGenerationError(message) => {
                assert!(message.contains("second"), "{}", message)
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let empty = BackgroundGenerator::new(&BrandConfig::default());
        assert!(matches!(
            empty.generate(Some("x")).await,
            Err(ThumbnailError::BackgroundGenerationError(_))
        ));
    }
}
