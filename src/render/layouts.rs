//! Layout algorithms for the five templates.
//!
//! Coordinates assume the 1280×720 canvas; the footer bar occupies the bottom
//! `brand_bar_height` pixels and everything else lives above it.

use super::comparison::MetricComparison;
use super::svg::{fit_font_size, Anchor, SvgDoc, Text};
use crate::brand::BrandConfig;
use crate::models::{Template, ThumbnailConfig};

pub(crate) const HEADLINE_X: f32 = 80.0;
/// Headline column width when a metric badge sits on the right.
const HEADLINE_WIDTH: f32 = 820.0;
const HEADLINE_MAX_SIZE: f32 = 92.0;
const HEADLINE_MIN_SIZE: f32 = 44.0;
const LINE_SPACING: f32 = 1.08;
const SUBTEXT_SIZE: f32 = 38.0;
const SUBTEXT_GAP: f32 = 70.0;

/// Center of the upper-right metric/emblem slot.
const BADGE_CX: f32 = 1050.0;
const BADGE_CY: f32 = 220.0;

/// Divider between the comparison panels.
pub(crate) const PANEL_SPLIT: f32 = 640.0;
const LEFT_PANEL_CX: f32 = 320.0;
const RIGHT_PANEL_CX: f32 = 960.0;
const PANEL_METRIC_Y: f32 = 410.0;

/// First baseline of the headline. Two-line headlines start higher so the block stays centered.
pub(crate) fn headline_baseline(line_count: usize) -> f32 {
    if line_count >= 2 {
        250.0
    } else {
        330.0
    }
}

/// Geometry of a drawn headline block, used to place decorations around it.
struct HeadlineBlock {
    first_baseline: f32,
    size: f32,
}

pub(crate) fn compose_svg(config: &ThumbnailConfig, brand: &BrandConfig) -> String {
    let mut doc = SvgDoc::new(brand.canvas, &brand.font_family);

    let footer_caption = match config.template {
        Template::Speed => {
            speed(&mut doc, config, brand);
            &brand.brand_url
        }
        Template::Conversion => {
            conversion(&mut doc, config, brand);
            &brand.brand_url
        }
        Template::Comparison => {
            comparison(&mut doc, config, brand);
            &brand.comparison_tagline
        }
        Template::Feature => {
            feature(&mut doc, config, brand);
            &brand.brand_url
        }
        Template::Trust => {
            trust(&mut doc, config, brand);
            &brand.brand_url
        }
    };

    brand_bar(&mut doc, brand, footer_caption);
    doc.finish()
}

fn brand_bar(doc: &mut SvgDoc, brand: &BrandConfig, caption: &str) {
    let top = brand.content_height() as f32;
    let height = brand.brand_bar_height as f32;
    let width = brand.canvas.width as f32;
    let baseline = top + height * 0.64;
    let p = &brand.palette;

    doc.rect(0.0, top, width, height, &p.ink, 1.0);
    doc.rect(0.0, top, width, 4.0, &p.brand, 1.0);
    doc.text(Text::new(HEADLINE_X, baseline, &brand.brand_name.to_uppercase(), 34.0, &p.white));
    doc.text(
        Text::new(width - HEADLINE_X, baseline, caption, 24.0, &p.light_gray)
            .anchor(Anchor::End)
            .weight(600),
    );
}

/// Left-aligned headline and subtext shared by every layout except comparison.
fn headline_block(doc: &mut SvgDoc, config: &ThumbnailConfig, brand: &BrandConfig) -> HeadlineBlock {
    let lines = config.headline_lines();
    let longest = lines
        .iter()
        .max_by_key(|line| line.chars().count())
        .map(String::as_str)
        .unwrap_or("");
    let size = fit_font_size(longest, HEADLINE_WIDTH, HEADLINE_MAX_SIZE, HEADLINE_MIN_SIZE);
    let first_baseline = headline_baseline(lines.len());

    let mut baseline = first_baseline;
    for (i, line) in lines.iter().enumerate() {
        baseline = first_baseline + i as f32 * size * LINE_SPACING;
        doc.text(Text::new(HEADLINE_X, baseline, line, size, &brand.palette.white));
    }

    let subtext_size = fit_font_size(&config.subtext, HEADLINE_WIDTH + 200.0, SUBTEXT_SIZE, 24.0);
    doc.text(
        Text::new(
            HEADLINE_X,
            baseline + SUBTEXT_GAP,
            &config.subtext,
            subtext_size,
            &brand.palette.accent,
        )
        .weight(700),
    );

    HeadlineBlock {
        first_baseline,
        size,
    }
}

/// Metric and its caption centered on `cx`, sized to `max_width`.
fn metric_text(
    doc: &mut SvgDoc,
    config: &ThumbnailConfig,
    brand: &BrandConfig,
    (cx, cy): (f32, f32),
    max_width: f32,
    label_y: f32,
) {
    let size = fit_font_size(&config.metric, max_width, 76.0, 32.0);
    doc.text(
        Text::new(cx, cy + size * 0.35, &config.metric, size, &brand.palette.white)
            .anchor(Anchor::Middle),
    );
    doc.text(
        Text::new(cx, label_y, &config.metric_label, 24.0, &brand.palette.white)
            .anchor(Anchor::Middle)
            .weight(700),
    );
}

fn speed(doc: &mut SvgDoc, config: &ThumbnailConfig, brand: &BrandConfig) {
    let p = &brand.palette;

    let streaks: [(f32, f32); 3] = [(220.0, 0.9), (160.0, 0.6), (100.0, 0.35)];
    for (i, (length, opacity)) in streaks.into_iter().enumerate() {
        let y = 70.0 + i as f32 * 22.0;
        doc.line((HEADLINE_X, y), (HEADLINE_X + length, y), &p.accent, 6.0, opacity, None);
    }

    if config.has_metric() {
        doc.circle(BADGE_CX, BADGE_CY, 130.0, &p.brand);
        doc.ring(BADGE_CX, BADGE_CY, 112.0, &p.white, 3.0, 0.35);
        metric_text(doc, config, brand, (BADGE_CX, BADGE_CY - 10.0), 200.0, BADGE_CY + 60.0);
    }

    headline_block(doc, config, brand);
}

fn conversion(doc: &mut SvgDoc, config: &ThumbnailConfig, brand: &BrandConfig) {
    let p = &brand.palette;
    doc.rect(0.0, 0.0, 18.0, brand.content_height() as f32, &p.warning, 1.0);

    if config.has_metric() {
        doc.rounded_rect(BADGE_CX - 150.0, BADGE_CY - 110.0, 300.0, 200.0, 28.0, &p.warning);
        metric_text(doc, config, brand, (BADGE_CX, BADGE_CY - 25.0), 260.0, BADGE_CY + 50.0);
    }

    headline_block(doc, config, brand);
}

fn feature(doc: &mut SvgDoc, config: &ThumbnailConfig, brand: &BrandConfig) {
    let p = &brand.palette;

    if config.has_metric() {
        doc.rounded_rect(BADGE_CX - 145.0, BADGE_CY - 70.0, 290.0, 120.0, 60.0, &p.brand);
        metric_text(doc, config, brand, (BADGE_CX, BADGE_CY - 10.0), 240.0, BADGE_CY + 95.0);
    }

    let block = headline_block(doc, config, brand);

    let dots_y = block.first_baseline - block.size - 30.0;
    for (i, color) in [p.brand.as_str(), p.accent.as_str(), p.white.as_str()]
        .into_iter()
        .enumerate()
    {
        doc.circle(HEADLINE_X + 8.0 + i as f32 * 30.0, dots_y, 9.0, color);
    }
}

fn trust(doc: &mut SvgDoc, config: &ThumbnailConfig, brand: &BrandConfig) {
    let p = &brand.palette;
    let (cx, top) = (BADGE_CX, 90.0);
    let shield = format!(
        "M {cx} {top} L {r} {t1} L {r} {t2} Q {r} {t3} {cx} {bottom} Q {l} {t3} {l} {t2} L {l} {t1} Z",
        cx = cx,
        top = top,
        r = cx + 110.0,
        l = cx - 110.0,
        t1 = top + 40.0,
        t2 = top + 130.0,
        t3 = top + 220.0,
        bottom = top + 260.0,
    );
    doc.path(&shield, &p.brand, Some((p.white.as_str(), 6.0)));
    doc.text(
        Text::new(cx, top + 170.0, &brand.brand_letter, 120.0, &p.white).anchor(Anchor::Middle),
    );

    headline_block(doc, config, brand);
}

/// Right-side name: the side of a "VS" matchup that is not the brand.
fn competitor_name(config: &ThumbnailConfig, brand_name: &str) -> String {
    let words: Vec<String> = config
        .headline_lines()
        .join(" ")
        .to_uppercase()
        .split_whitespace()
        .map(String::from)
        .collect();
    let split = match words
        .iter()
        .position(|w| w == "VS" || w == "VS." || w == "VERSUS")
    {
        Some(i) => i,
        None => return "OTHERS".to_string(),
    };

    let brand = brand_name.to_uppercase();
    let left = words[..split].join(" ");
    let right = words[split + 1..].join(" ");
    [right, left]
        .into_iter()
        .find(|side| !side.is_empty() && *side != brand)
        .unwrap_or_else(|| "OTHERS".to_string())
}

fn comparison(doc: &mut SvgDoc, config: &ThumbnailConfig, brand: &BrandConfig) {
    let p = &brand.palette;
    let content_height = brand.content_height() as f32;
    let width = brand.canvas.width as f32;
    let metrics = MetricComparison::from_metric(&config.metric);

    doc.rect(0.0, 0.0, PANEL_SPLIT, content_height, &p.brand_dark, 0.92);
    doc.rect(PANEL_SPLIT, 0.0, width - PANEL_SPLIT, content_height, &p.neutral_panel, 0.92);
    doc.line(
        (PANEL_SPLIT, 0.0),
        (PANEL_SPLIT, content_height),
        &p.white,
        4.0,
        0.8,
        Some("18 14"),
    );

    let lines = config.headline_lines();
    let longest = lines
        .iter()
        .max_by_key(|line| line.chars().count())
        .map(String::as_str)
        .unwrap_or("");
    let headline_size = fit_font_size(longest, width - 2.0 * HEADLINE_X, 64.0, 36.0);
    let first_baseline = if lines.len() >= 2 { 100.0 } else { 130.0 };
    for (i, line) in lines.iter().enumerate() {
        let y = first_baseline + i as f32 * headline_size * LINE_SPACING;
        doc.text(Text::new(width / 2.0, y, line, headline_size, &p.white).anchor(Anchor::Middle));
    }

    let ours_name = brand.brand_name.to_uppercase();
    let theirs_name = competitor_name(config, &brand.brand_name);
    let panel_width = PANEL_SPLIT - 80.0;

    doc.text(
        Text::new(
            LEFT_PANEL_CX,
            270.0,
            &ours_name,
            fit_font_size(&ours_name, panel_width, 34.0, 20.0),
            &p.accent,
        )
        .anchor(Anchor::Middle),
    );
    doc.text(
        Text::new(
            LEFT_PANEL_CX,
            PANEL_METRIC_Y,
            &metrics.ours,
            fit_font_size(&metrics.ours, panel_width, 140.0, 48.0),
            &p.accent,
        )
        .anchor(Anchor::Middle),
    );
    let ours_caption = if config.metric_label.trim().is_empty() {
        format!("WITH {}", ours_name)
    } else {
        config.metric_label.to_uppercase()
    };
    doc.text(
        Text::new(LEFT_PANEL_CX, 470.0, &ours_caption, 28.0, &p.white)
            .anchor(Anchor::Middle)
            .weight(700),
    );

    doc.text(
        Text::new(
            RIGHT_PANEL_CX,
            270.0,
            &theirs_name,
            fit_font_size(&theirs_name, panel_width, 34.0, 20.0),
            &p.light_gray,
        )
        .anchor(Anchor::Middle),
    );
    doc.text(
        Text::new(
            RIGHT_PANEL_CX,
            PANEL_METRIC_Y,
            &metrics.theirs,
            fit_font_size(&metrics.theirs, panel_width, 140.0, 48.0),
            &p.warning,
        )
        .anchor(Anchor::Middle),
    );
    doc.text(
        Text::new(RIGHT_PANEL_CX, 470.0, "THE OLD WAY", 28.0, &p.light_gray)
            .anchor(Anchor::Middle)
            .weight(700),
    );

    let subtext_size = fit_font_size(&config.subtext, width - 2.0 * HEADLINE_X, 34.0, 22.0);
    doc.text(
        Text::new(width / 2.0, 585.0, &config.subtext, subtext_size, &p.accent)
            .anchor(Anchor::Middle)
            .weight(700),
    );
}
