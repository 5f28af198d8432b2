use async_trait::async_trait;
use image::{ImageFormat, RgbImage};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thumbgen::{
    heuristic_analysis,
    render::{Direction, MetricComparison},
    Analysis, BackgroundGenerator, BackgroundProvider, BrandConfig, Canvas, GenerateRequest,
    Result, Template, TemplateRenderer, ThumbnailError, ThumbnailOverrides, ThumbnailPipeline,
    TitleClassifier,
};

/// Returns a canned analysis, optionally after a delay.
struct ScriptedAnalyzer {
    analysis: Option<Analysis>,
    delay: Duration,
    calls: AtomicUsize,
}

impl ScriptedAnalyzer {
    fn returning(analysis: Analysis) -> Arc<Self> {
        Arc::new(Self {
            analysis: Some(analysis),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            analysis: None,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        })
    }

    fn slow(analysis: Analysis, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            analysis: Some(analysis),
            delay,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl TitleClassifier for ScriptedAnalyzer {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn classify(&self, _title: &str) -> Result<Analysis> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.analysis
            .clone()
            .ok_or_else(|| ThumbnailError::AnalysisError("model unavailable".into()))
    }
}

/// Serves a solid square PNG so the generator has to resize it.
struct SquareProvider;

#[async_trait]
impl BackgroundProvider for SquareProvider {
    fn id(&self) -> &str {
        "square"
    }

    async fn generate(&self, _prompt: &str, _canvas: Canvas) -> Result<Vec<u8>> {
        let mut out = Cursor::new(Vec::new());
        RgbImage::from_pixel(1024, 1024, image::Rgb([30, 60, 90]))
            .write_to(&mut out, ImageFormat::Png)
            .map_err(|e| ThumbnailError::InternalError(e.to_string()))?;
        Ok(out.into_inner())
    }
}

fn comparison_analysis() -> Analysis {
    let mut analysis = heuristic_analysis("Quotely vs Applied Systems");
    analysis.headline = "QUOTELY VS\nAPPLIED SYSTEMS".to_string();
    analysis.reasoning = Some("title names a competitor".to_string());
    analysis
}

fn pipeline(analyzer: Arc<dyn TitleClassifier>) -> ThumbnailPipeline {
    let brand = Arc::new(BrandConfig::default());
    let renderer = Arc::new(TemplateRenderer::new(Arc::clone(&brand)));
    let backgrounds = BackgroundGenerator::new(&brand).with_provider(Arc::new(SquareProvider));
    ThumbnailPipeline::new(analyzer, backgrounds, renderer, brand)
}

fn decoded_size(png: &[u8]) -> (u32, u32) {
    let image = image::load_from_memory(png).unwrap();
    (image.width(), image.height())
}

#[tokio::test]
async fn preview_is_canvas_sized_and_byte_identical() {
    let pipeline = ThumbnailPipeline::local(BrandConfig::default(), None);
    let first = pipeline.preview("60% faster quoting").await.unwrap();
    let second = pipeline.preview("60% faster quoting").await.unwrap();
    assert_eq!(decoded_size(&first), (1280, 720));
    assert_eq!(first, second);

    let other = pipeline.preview("Quotely vs Applied Systems").await.unwrap();
    assert_ne!(first, other);
}

#[tokio::test]
async fn preview_and_generate_reject_blank_titles() {
    let pipeline = ThumbnailPipeline::local(BrandConfig::default(), None);
    let err = pipeline.preview("   ").await.unwrap_err();
    assert_eq!(err.to_string(), "title is required");

    let err = pipeline.generate(GenerateRequest::new("")).await.unwrap_err();
    assert!(matches!(err, ThumbnailError::ValidationError(_)));
}

#[tokio::test]
async fn overrides_replace_only_named_fields() {
    let analyzer = ScriptedAnalyzer::returning(comparison_analysis());
    let pipeline = pipeline(analyzer.clone());

    let overrides = ThumbnailOverrides {
        metric: Some("2 MIN".to_string()),
        ..Default::default()
    };
    let request = GenerateRequest::new("Quotely vs Applied Systems").with_overrides(overrides);
    let generated = pipeline.generate(request).await.unwrap();

    assert_eq!(generated.config.template, Template::Comparison);
    assert_eq!(generated.config.metric, "2 MIN");
    assert_eq!(generated.config.headline, "QUOTELY VS\nAPPLIED SYSTEMS");
    assert_eq!(generated.config.subtext, generated.analysis.subtext);
    assert_eq!(generated.bg_provider, "square");
    assert_eq!(decoded_size(&generated.png), (1280, 720));
    assert_eq!(analyzer.calls.load(Ordering::SeqCst), 1);

    let response = generated.into_response();
    assert_eq!(response.reasoning, "title names a competitor");
    assert!(!response.image.is_empty());
}

#[tokio::test]
async fn analyzer_failure_is_not_downgraded() {
    let pipeline = pipeline(ScriptedAnalyzer::failing());
    let err = pipeline
        .generate(GenerateRequest::new("60% faster quoting"))
        .await
        .unwrap_err();
    assert!(matches!(err, ThumbnailError::AnalysisError(_)));
}

#[tokio::test]
async fn slow_generation_times_out() {
    let analyzer = ScriptedAnalyzer::slow(comparison_analysis(), Duration::from_secs(5));
    let pipeline = pipeline(analyzer).with_timeout(Duration::from_millis(50));
    let err = pipeline
        .generate(GenerateRequest::new("Quotely vs Applied Systems"))
        .await
        .unwrap_err();
    assert!(matches!(err, ThumbnailError::TimeoutError(_)));
}

#[tokio::test]
async fn missing_providers_fail_generation() {
    let brand = Arc::new(BrandConfig::default());
    let renderer = Arc::new(TemplateRenderer::new(Arc::clone(&brand)));
    let pipeline = ThumbnailPipeline::new(
        ScriptedAnalyzer::returning(comparison_analysis()),
        BackgroundGenerator::new(&brand),
        renderer,
        brand,
    );
    let err = pipeline
        .generate(GenerateRequest::new("Quotely vs Applied Systems"))
        .await
        .unwrap_err();
    assert!(matches!(err, ThumbnailError::BackgroundGenerationError(_)));
}

#[tokio::test]
async fn empty_image_prompt_is_not_downgraded_to_gradient() {
    let mut analysis = comparison_analysis();
    analysis.image_prompt = "   ".to_string();
    let pipeline = pipeline(ScriptedAnalyzer::returning(analysis));
    let err = pipeline
        .generate(GenerateRequest::new("Quotely vs Applied Systems"))
        .await
        .unwrap_err();
    match err {
        ThumbnailError::BackgroundGenerationError(message) => {
            assert!(message.contains("empty image prompt"), "{}", message)
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn brand_named_second_still_leads_the_headline() {
    let pipeline = pipeline(ScriptedAnalyzer::returning(heuristic_analysis(
        "Applied Systems vs Quotely",
    )));
    let generated = pipeline
        .generate(GenerateRequest::new("Applied Systems vs Quotely"))
        .await
        .unwrap();
    assert_eq!(generated.config.template, Template::Comparison);
    assert_eq!(generated.config.headline, "QUOTELY VS\nAPPLIED SYSTEMS");
}

#[test]
fn heuristic_always_picks_a_known_template() {
    let titles = [
        "60% faster quoting",
        "Quotely vs Applied Systems",
        "The best alternative to EZLynx",
        "Stop losing 3x more leads",
        "Is your agency SOC 2 compliant?",
        "Introducing bulk renewals",
        "!!!",
        "ñandú 🚀 日本語",
        "a",
    ];
    for title in titles {
        let analysis = heuristic_analysis(title);
        assert!(Template::ALL.contains(&analysis.template), "{}", title);
        assert!(!analysis.headline.is_empty(), "{}", title);
    }
}

#[test]
fn comparison_left_metric_beats_right() {
    for metric in ["2 MIN", "60%", "3X", "$50K"] {
        let cmp = MetricComparison::from_metric(metric);
        assert_ne!(cmp.direction, Direction::Qualitative, "{}", metric);
        assert!(cmp.ours_is_better(), "{}", metric);
    }

    let renderer = TemplateRenderer::new(Arc::new(BrandConfig::default()));
    let mut config = comparison_analysis().to_config();
    config.metric = "2 MIN".to_string();
    let svg = renderer.build_svg(&config);
    let ours = svg.find(">2 MIN<").unwrap();
    let theirs = svg.find(">20 MIN<").unwrap();
    assert!(svg[..ours].rfind("x=\"320.0\"") > svg[..ours].rfind("x=\"960.0\""));
    assert!(svg[..theirs].rfind("x=\"960.0\"").is_some());
}
