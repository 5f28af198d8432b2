use crate::{
    brand::Canvas,
    error::{Result, ThumbnailError},
};
use image::{buffer::ConvertBuffer, imageops, ImageFormat, RgbImage, RgbaImage};
use std::io::Cursor;

/// Blends the rendered overlay onto a background of the same canvas size.
#[derive(Debug, Clone, Copy)]
pub struct Compositor {
    canvas: Canvas,
}

impl Compositor {
    pub fn new(canvas: Canvas) -> Self {
        Self { canvas }
    }

    pub fn composite(&self, background: &RgbaImage, overlay: &RgbaImage) -> Result<RgbaImage> {
        for (layer, buffer) in [("background", background), ("overlay", overlay)] {
            let (width, height) = buffer.dimensions();
            if !self.canvas.matches(width, height) {
                log::error!(
                    "Compositing invariant violated: {} is {}x{}, canvas is {}x{}",
                    layer,
                    width,
                    height,
                    self.canvas.width,
                    self.canvas.height
                );
                return Err(ThumbnailError::CompositionError(format!(
                    "{} is {}x{}, expected {}x{}",
                    layer, width, height, self.canvas.width, self.canvas.height
                )));
            }
        }

        let mut out = background.clone();
        imageops::overlay(&mut out, overlay, 0, 0);
        Ok(out)
    }
}

/// Encodes as an opaque RGB PNG; alpha is dropped after compositing.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let rgb: RgbImage = image.convert();
    let mut out = Cursor::new(Vec::with_capacity(512 * 1024));
    rgb.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(width: u32, height: u32, color: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba(color))
    }

    #[test]
    fn overlay_alpha_blends_onto_background() {
        let compositor = Compositor::new(Canvas::STANDARD);
        let background = solid(1280, 720, [0, 0, 255, 255]);
        let mut overlay = solid(1280, 720, [0, 0, 0, 0]);
        overlay.put_pixel(10, 10, Rgba([255, 0, 0, 255]));

        let out = compositor.composite(&background, &overlay).unwrap();
        assert_eq!(out.get_pixel(10, 10).0, [255, 0, 0, 255]);
        assert_eq!(out.get_pixel(11, 10).0, [0, 0, 255, 255]);
    }

    #[test]
    fn rejects_mismatched_layers() {
        let compositor = Compositor::new(Canvas::STANDARD);
        let background = solid(1024, 1024, [0, 0, 0, 255]);
        let overlay = solid(1280, 720, [0, 0, 0, 0]);
        assert!(matches!(
            compositor.composite(&background, &overlay),
            Err(ThumbnailError::CompositionError(_))
        ));
        assert!(matches!(
            compositor.composite(&overlay, &background),
            Err(ThumbnailError::CompositionError(_))
        ));
    }

    #[test]
    fn png_round_trips_dimensions() {
        let png = encode_png(&solid(1280, 720, [16, 185, 129, 255])).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (1280, 720));
        assert_eq!(decoded.color(), image::ColorType::Rgb8);
    }
}
