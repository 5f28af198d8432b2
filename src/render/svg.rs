//! Minimal SVG writer used by the layouts. Everything is absolute-positioned.

use crate::brand::Canvas;
use std::fmt::Write;

/// Rough advance width of one uppercase glyph in a black-weight sans, as a fraction of font size.
const GLYPH_WIDTH_RATIO: f32 = 0.62;

pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

/// Largest font size in `[min, max]` at which `text` fits into `max_width`.
pub(crate) fn fit_font_size(text: &str, max_width: f32, max: f32, min: f32) -> f32 {
    let chars = text.chars().count().max(1) as f32;
    (max_width / (chars * GLYPH_WIDTH_RATIO)).clamp(min, max)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Anchor {
    Start,
    Middle,
    End,
}

impl Anchor {
    fn as_str(&self) -> &'static str {
        match self {
            Anchor::Start => "start",
            Anchor::Middle => "middle",
            Anchor::End => "end",
        }
    }
}

pub(crate) struct Text<'a> {
    pub x: f32,
    pub y: f32,
    pub content: &'a str,
    pub size: f32,
    pub fill: &'a str,
    pub anchor: Anchor,
    pub weight: u16,
}

impl<'a> Text<'a> {
    pub fn new(x: f32, y: f32, content: &'a str, size: f32, fill: &'a str) -> Self {
        Self {
            x,
            y,
            content,
            size,
            fill,
            anchor: Anchor::Start,
            weight: 900,
        }
    }

    pub fn anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn weight(mut self, weight: u16) -> Self {
        self.weight = weight;
        self
    }
}

pub(crate) struct SvgDoc {
    buf: String,
    font_family: String,
}

// `write!` into a String cannot fail, so its results are ignored below.
impl SvgDoc {
    pub fn new(canvas: Canvas, font_family: &str) -> Self {
        let mut buf = String::with_capacity(4096);
        let _ = write!(
            buf,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = canvas.width,
            h = canvas.height,
        );
        Self {
            buf,
            font_family: escape(font_family),
        }
    }

    pub fn rect(&mut self, x: f32, y: f32, w: f32, h: f32, fill: &str, opacity: f32) {
        let _ = write!(
            self.buf,
            r#"<rect x="{x:.1}" y="{y:.1}" width="{w:.1}" height="{h:.1}" fill="{fill}" fill-opacity="{opacity:.2}"/>"#,
        );
    }

    pub fn rounded_rect(&mut self, x: f32, y: f32, w: f32, h: f32, radius: f32, fill: &str) {
        let _ = write!(
            self.buf,
            r#"<rect x="{x:.1}" y="{y:.1}" width="{w:.1}" height="{h:.1}" rx="{radius:.1}" ry="{radius:.1}" fill="{fill}"/>"#,
        );
    }

    pub fn circle(&mut self, cx: f32, cy: f32, r: f32, fill: &str) {
        let _ = write!(
            self.buf,
            r#"<circle cx="{cx:.1}" cy="{cy:.1}" r="{r:.1}" fill="{fill}"/>"#,
        );
    }

    pub fn ring(&mut self, cx: f32, cy: f32, r: f32, stroke: &str, width: f32, opacity: f32) {
        let _ = write!(
            self.buf,
            r#"<circle cx="{cx:.1}" cy="{cy:.1}" r="{r:.1}" fill="none" stroke="{stroke}" stroke-width="{width:.1}" stroke-opacity="{opacity:.2}"/>"#,
        );
    }

    pub fn line(
        &mut self,
        (x1, y1): (f32, f32),
        (x2, y2): (f32, f32),
        stroke: &str,
        width: f32,
        opacity: f32,
        dash: Option<&str>,
    ) {
        let dash = dash
            .map(|d| format!(r#" stroke-dasharray="{}""#, d))
            .unwrap_or_default();
        let _ = write!(
            self.buf,
            r#"<line x1="{x1:.1}" y1="{y1:.1}" x2="{x2:.1}" y2="{y2:.1}" stroke="{stroke}" stroke-width="{width:.1}" stroke-opacity="{opacity:.2}" stroke-linecap="round"{dash}/>"#,
        );
    }

    pub fn path(&mut self, d: &str, fill: &str, stroke: Option<(&str, f32)>) {
        let stroke = stroke
            .map(|(color, width)| format!(r#" stroke="{}" stroke-width="{:.1}""#, color, width))
            .unwrap_or_default();
        let _ = write!(self.buf, r#"<path d="{d}" fill="{fill}"{stroke}/>"#);
    }

    pub fn text(&mut self, text: Text<'_>) {
        if text.content.trim().is_empty() {
            return;
        }
        let _ = write!(
            self.buf,
            r#"<text x="{x:.1}" y="{y:.1}" font-family="{family}" font-size="{size:.1}" font-weight="{weight}" fill="{fill}" text-anchor="{anchor}">{content}</text>"#,
            x = text.x,
            y = text.y,
            family = self.font_family,
            size = text.size,
            weight = text.weight,
            fill = text.fill,
            anchor = text.anchor.as_str(),
            content = escape(text.content),
        );
    }

    pub fn finish(mut self) -> String {
        self.buf.push_str("</svg>");
        self.buf
    }
}
