//! Pure Rust rasterizer built on `image` and `rusttype`.
//!
//! | Step | Crate / function |
//! |---|---|
//! | Center crop | `image::DynamicImage::crop_imm` to the canvas aspect ratio |
//! | Scale | `image::DynamicImage::resize_exact` with `Lanczos3` |
//! | Caption band | per-pixel alpha blend |
//! | Quote text | `rusttype::Font::layout` + `PositionedGlyph::draw` |

use super::backend::{RasterError, Rasterizer};
use super::layout::{
    band_layout, centered_x, cover_crop, text_area_width, wrap_words,
};
use super::params::{Background, CanvasSize, CaptionStyle, PostPreview};
use image::imageops::FilterType;
use image::{Rgba, RgbaImage};
use rusttype::{Font, Scale, point};
use std::path::Path;

/// Width of an average glyph relative to the font size, used to size the
/// band when no font is loaded.
const ESTIMATED_GLYPH_WIDTH: f32 = 0.5;

/// Rasterizer that draws onto an in-memory RGBA canvas.
#[derive(Default)]
pub struct CanvasRasterizer {
    font: Option<Font<'static>>,
}

impl CanvasRasterizer {
    /// Rasterizer without a font: the caption band is drawn, the text is not.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_font(font: Font<'static>) -> Self {
        Self { font: Some(font) }
    }

    pub fn from_font_file(path: &Path) -> Result<Self, RasterError> {
        let bytes = std::fs::read(path)?;
        let font = Font::try_from_vec(bytes).ok_or_else(|| {
            RasterError::Font(format!("{} is not a usable TrueType font", path.display()))
        })?;
        Ok(Self::with_font(font))
    }

    fn measure(&self, style: &CaptionStyle, text: &str) -> f32 {
        match &self.font {
            Some(font) => text_width(font, Scale::uniform(style.font_size), text),
            None => text.chars().count() as f32 * style.font_size * ESTIMATED_GLYPH_WIDTH,
        }
    }
}

impl Rasterizer for CanvasRasterizer {
    fn rasterize(&self, preview: &PostPreview) -> Result<RgbaImage, RasterError> {
        let mut canvas = paint_background(&preview.background, preview.canvas)?;

        let style = &preview.style;
        let lines = wrap_words(&preview.quote, text_area_width(canvas.width()), |s| {
            self.measure(style, s)
        });
        if lines.is_empty() {
            return Ok(canvas);
        }

        let band = band_layout(canvas.height(), lines.len(), style.line_height());
        shade_rows(&mut canvas, band.top, style.band_color, style.band_opacity);

        if let Some(font) = &self.font {
            let scale = Scale::uniform(style.font_size);
            let v_metrics = font.v_metrics(scale);
            let glyph_height = v_metrics.ascent - v_metrics.descent;
            let leading = (band.line_height - glyph_height) / 2.0;
            for (i, line) in lines.iter().enumerate() {
                let x = centered_x(canvas.width(), text_width(font, scale, line));
                let top = band.text_top + i as f32 * band.line_height;
                let baseline = top + leading + v_metrics.ascent;
                draw_line(&mut canvas, font, scale, x, baseline, style.text_color, line);
            }
        }
        Ok(canvas)
    }
}

fn paint_background(background: &Background, size: CanvasSize) -> Result<RgbaImage, RasterError> {
    match background {
        Background::Solid([r, g, b]) => Ok(RgbaImage::from_pixel(
            size.width,
            size.height,
            Rgba([*r, *g, *b, 255]),
        )),
        Background::Image(img) => {
            if img.width() == 0 || img.height() == 0 {
                return Err(RasterError::RenderFailed(
                    "background image has no pixels".to_string(),
                ));
            }
            let crop = cover_crop((img.width(), img.height()), (size.width, size.height));
            let region = img.crop_imm(crop.x, crop.y, crop.width, crop.height);
            Ok(region
                .resize_exact(size.width, size.height, FilterType::Lanczos3)
                .to_rgba8())
        }
    }
}

fn blend_channel(dst: u8, src: u8, alpha: f32) -> u8 {
    (dst as f32 * (1.0 - alpha) + src as f32 * alpha).round() as u8
}

/// Blend `color` over every row from `top` to the bottom edge.
fn shade_rows(canvas: &mut RgbaImage, top: u32, color: [u8; 3], opacity: f32) {
    if opacity <= 0.0 {
        return;
    }
    let width = canvas.width();
    for y in top..canvas.height() {
        for x in 0..width {
            let px = canvas.get_pixel_mut(x, y);
            for c in 0..3 {
                px.0[c] = blend_channel(px.0[c], color[c], opacity);
            }
            px.0[3] = 255;
        }
    }
}

/// Advance width of `text` including kerning.
fn text_width(font: &Font<'static>, scale: Scale, text: &str) -> f32 {
    font.layout(text, scale, point(0.0, 0.0))
        .last()
        .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
        .unwrap_or(0.0)
}

fn draw_line(
    canvas: &mut RgbaImage,
    font: &Font<'static>,
    scale: Scale,
    x: f32,
    baseline: f32,
    color: [u8; 3],
    text: &str,
) {
    let (width, height) = canvas.dimensions();
    for glyph in font.layout(text, scale, point(x, baseline)) {
        let Some(bb) = glyph.pixel_bounding_box() else {
            continue;
        };
        glyph.draw(|gx, gy, coverage| {
            let px = gx as i32 + bb.min.x;
            let py = gy as i32 + bb.min.y;
            if px < 0 || py < 0 || px as u32 >= width || py as u32 >= height {
                return;
            }
            if coverage <= 0.0 {
                return;
            }
            let dst = canvas.get_pixel_mut(px as u32, py as u32);
            for c in 0..3 {
                dst.0[c] = blend_channel(dst.0[c], color[c], coverage.min(1.0));
            }
            dst.0[3] = 255;
        });
    }
}
