//! SVG templates and their rasterization.
//!
//! Layouts produce an SVG string sized to the brand canvas; [`TemplateRenderer`]
//! turns that string into a transparent RGBA overlay with resvg. Font loading is
//! the expensive part, so the database is built once and shared.

pub mod comparison;
pub(crate) mod layouts;
pub(crate) mod svg;

pub use comparison::{Direction, MetricComparison};

use crate::{
    brand::{BrandConfig, Canvas},
    error::{Result, ThumbnailError},
    models::ThumbnailConfig,
};
use image::RgbaImage;
use resvg::{tiny_skia, usvg};
use std::{path::Path, sync::Arc};

/// Families tried, in order, when binding the generic `sans-serif` name.
const PREFERRED_SANS: [&str; 5] = ["Inter", "Arial Black", "Arial", "Helvetica", "DejaVu Sans"];

/// Loads system fonts plus anything under `font_dir`.
///
/// `sans-serif` is pointed at the first preferred family that is actually
/// installed, falling back to whatever face was found first, so text never
/// silently disappears on minimal hosts.
pub fn load_fonts(font_dir: Option<&Path>) -> usvg::fontdb::Database {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();
    if let Some(dir) = font_dir {
        db.load_fonts_dir(dir);
        log::info!("Loaded extra fonts from {}", dir.display());
    }

    let has_family = |db: &usvg::fontdb::Database, name: &str| {
        db.faces()
            .any(|face| face.families.iter().any(|(family, _)| family == name))
    };

    let fallback = PREFERRED_SANS
        .iter()
        .find(|name| has_family(&db, **name))
        .map(|name| name.to_string())
        .or_else(|| {
            db.faces()
                .next()
                .and_then(|face| face.families.first().map(|(family, _)| family.clone()))
        });

    match fallback {
        Some(family) => {
            log::debug!("Using '{}' as sans-serif fallback ({} faces)", family, db.len());
            db.set_sans_serif_family(family);
        }
        None => log::warn!("No fonts available; overlay text will not render"),
    }
    db
}

/// Renders a [`ThumbnailConfig`] into a transparent overlay the size of the canvas.
#[derive(Clone)]
pub struct TemplateRenderer {
    brand: Arc<BrandConfig>,
    fontdb: Arc<usvg::fontdb::Database>,
}

impl TemplateRenderer {
    pub fn new(brand: Arc<BrandConfig>) -> Self {
        Self::with_fonts(brand, load_fonts(None))
    }

    pub fn with_font_dir(brand: Arc<BrandConfig>, font_dir: Option<&Path>) -> Self {
        Self::with_fonts(brand, load_fonts(font_dir))
    }

    pub fn with_fonts(brand: Arc<BrandConfig>, fontdb: usvg::fontdb::Database) -> Self {
        Self {
            brand,
            fontdb: Arc::new(fontdb),
        }
    }

    pub fn canvas(&self) -> Canvas {
        self.brand.canvas
    }

    pub fn brand(&self) -> &BrandConfig {
        &self.brand
    }

    /// The SVG document for `config`, before rasterization.
    pub fn build_svg(&self, config: &ThumbnailConfig) -> String {
        layouts::compose_svg(config, &self.brand)
    }

    pub fn render(&self, config: &ThumbnailConfig) -> Result<RgbaImage> {
        let svg = self.build_svg(config);
        self.rasterize(&svg)
    }

    fn rasterize(&self, svg: &str) -> Result<RgbaImage> {
        let options = usvg::Options {
            fontdb: Arc::clone(&self.fontdb),
            ..Default::default()
        };
        let tree = usvg::Tree::from_str(svg, &options)
            .map_err(|e| ThumbnailError::RenderError(format!("invalid template SVG: {}", e)))?;

        let Canvas { width, height } = self.canvas();
        let mut pixmap = tiny_skia::Pixmap::new(width, height).ok_or_else(|| {
            ThumbnailError::RenderError(format!("cannot allocate {}x{} pixmap", width, height))
        })?;
        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

        // tiny-skia stores premultiplied alpha; image expects straight alpha.
        let mut raw = Vec::with_capacity((width * height * 4) as usize);
        for pixel in pixmap.pixels() {
            let color = pixel.demultiply();
            raw.extend_from_slice(&[color.red(), color.green(), color.blue(), color.alpha()]);
        }
        RgbaImage::from_raw(width, height, raw)
            .ok_or_else(|| ThumbnailError::RenderError("pixmap size mismatch".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Template;

    fn renderer() -> TemplateRenderer {
        TemplateRenderer::new(Arc::new(BrandConfig::default()))
    }

    fn sample(template: Template) -> ThumbnailConfig {
        ThumbnailConfig::new(template, "QUOTE FASTER\nWIN MORE")
            .with_subtext("Every carrier, one form")
            .with_metric("60%", "FASTER")
    }

    #[test]
    fn every_template_renders_at_canvas_size() {
        let renderer = renderer();
        for template in Template::ALL {
            let overlay = renderer.render(&sample(template)).unwrap();
            assert_eq!(overlay.dimensions(), (1280, 720), "{}", template);
        }
    }

    #[test]
    fn overlay_is_partly_transparent() {
        let overlay = renderer().render(&sample(Template::Feature)).unwrap();
        let transparent = overlay.pixels().filter(|p| p.0[3] == 0).count();
        let opaque = overlay.pixels().filter(|p| p.0[3] == 255).count();
        assert!(transparent > 0);
        assert!(opaque > 0);
    }

    #[test]
    fn rendering_is_deterministic() {
        let renderer = renderer();
        let config = sample(Template::Comparison);
        assert_eq!(renderer.build_svg(&config), renderer.build_svg(&config));
        let a = renderer.render(&config).unwrap();
        let b = renderer.render(&config).unwrap();
        assert_eq!(a.as_raw(), b.as_raw());
    }
}
