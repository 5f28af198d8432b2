//! Canvas size, palette and typography shared by every pipeline stage.
//!
//! A single [`BrandConfig`] is built at startup and handed to the renderer,
//! background generator and compositor behind an `Arc`, so the preview and
//! full-generation paths always agree on dimensions.

use std::env;

pub const CANVAS_WIDTH: u32 = 1280;
pub const CANVAS_HEIGHT: u32 = 720;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    pub const STANDARD: Canvas = Canvas {
        width: CANVAS_WIDTH,
        height: CANVAS_HEIGHT,
    };

    pub fn matches(&self, width: u32, height: u32) -> bool {
        self.width == width && self.height == height
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Canvas::STANDARD
    }
}

/// Brand colors as `#rrggbb` strings, which is what the SVG templates consume.
#[derive(Debug, Clone)]
pub struct Palette {
    pub brand: String,
    pub brand_dark: String,
    pub accent: String,
    pub warning: String,
    pub white: String,
    pub light_gray: String,
    pub ink: String,
    pub neutral_panel: String,
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            brand: "#10b981".to_string(),
            brand_dark: "#065f46".to_string(),
            accent: "#6ee7b7".to_string(),
            warning: "#ef4444".to_string(),
            white: "#ffffff".to_string(),
            light_gray: "#e5e7eb".to_string(),
            ink: "#07120e".to_string(),
            neutral_panel: "#1f2937".to_string(),
        }
    }
}

impl Palette {
    /// Parses one of the palette entries into an RGB triple for raster work.
    /// Malformed entries decode as black.
    pub fn rgb(hex: &str) -> [u8; 3] {
        let digits = hex.trim_start_matches('#');
        if digits.len() != 6 || !digits.is_ascii() {
            return [0, 0, 0];
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).unwrap_or(0);
        [channel(0), channel(2), channel(4)]
    }
}

#[derive(Debug, Clone)]
pub struct BrandConfig {
    pub canvas: Canvas,
    pub palette: Palette,
    /// CSS-style family list; the renderer always asks for weight 900.
    pub font_family: String,
    pub brand_name: String,
    /// Single glyph drawn inside the trust shield.
    pub brand_letter: String,
    pub brand_url: String,
    pub comparison_tagline: String,
    pub brand_bar_height: u32,
}

impl Default for BrandConfig {
    fn default() -> Self {
        BrandConfig {
            canvas: Canvas::STANDARD,
            palette: Palette::default(),
            font_family: "Inter, 'Arial Black', Helvetica, Arial, sans-serif".to_string(),
            brand_name: "Quotely".to_string(),
            brand_letter: "Q".to_string(),
            brand_url: "quotely.io".to_string(),
            comparison_tagline: "Side-by-side comparison".to_string(),
            brand_bar_height: 80,
        }
    }
}

impl BrandConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let mut brand = Self::default();
        if let Ok(name) = env::var("THUMBGEN_BRAND_NAME") {
            brand = brand.with_brand_name(name);
        }
        if let Ok(url) = env::var("THUMBGEN_BRAND_URL") {
            brand.brand_url = url;
        }
        brand
    }

    /// Also resets the shield letter to the first character of the new name.
    pub fn with_brand_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if let Some(first) = name.chars().find(|c| c.is_alphanumeric()) {
            self.brand_letter = first.to_uppercase().to_string();
        }
        self.brand_name = name;
        self
    }

    pub fn with_brand_url(mut self, url: impl Into<String>) -> Self {
        self.brand_url = url.into();
        self
    }

    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = family.into();
        self
    }

    /// Top edge of the footer bar.
    pub fn content_height(&self) -> u32 {
        self.canvas.height - self.brand_bar_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_canvas_is_720p() {
        assert_eq!(Canvas::STANDARD, Canvas { width: 1280, height: 720 });
        assert_eq!(BrandConfig::default().canvas, Canvas::STANDARD);
    }

    #[test]
    fn palette_hex_parsing() {
        assert_eq!(Palette::rgb("#10b981"), [0x10, 0xb9, 0x81]);
        assert_eq!(Palette::rgb("nope"), [0, 0, 0]);
        // Six bytes but not six hex digits.
        assert_eq!(Palette::rgb("#ééé"), [0, 0, 0]);
        assert_eq!(Palette::rgb("#1€12"), [0, 0, 0]);
    }

    #[test]
    fn brand_name_updates_letter() {
        let brand = BrandConfig::new().with_brand_name("acme quotes");
        assert_eq!(brand.brand_letter, "A");
        assert_eq!(brand.content_height(), 640);
    }
}
