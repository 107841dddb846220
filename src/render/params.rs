//! What to draw, independent of how it is drawn.
//!
//! A [`PostPreview`] is the fully resolved description of one exported post:
//! decoded background, quote text, canvas size and caption style. The
//! exporter builds it, a [`Rasterizer`](super::Rasterizer) turns it into
//! pixels.

use crate::config::{ExportConfig, parse_hex_color};
use image::DynamicImage;

/// Output canvas size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1080,
        }
    }
}

/// Appearance of the quote overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptionStyle {
    /// Font size in pixels.
    pub font_size: f32,
    pub text_color: [u8; 3],
    pub band_color: [u8; 3],
    /// 0.0 (invisible) to 1.0 (opaque).
    pub band_opacity: f32,
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            font_size: 64.0,
            text_color: [255, 255, 255],
            band_color: [0, 0, 0],
            band_opacity: 0.45,
        }
    }
}

impl CaptionStyle {
    /// Line advance used for wrapping and band sizing.
    pub fn line_height(&self) -> f32 {
        self.font_size * 1.25
    }
}

impl From<&ExportConfig> for CanvasSize {
    fn from(config: &ExportConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
        }
    }
}

impl From<&ExportConfig> for CaptionStyle {
    /// Colors are validated when the config is loaded; anything unparsable
    /// here falls back to the default.
    fn from(config: &ExportConfig) -> Self {
        let defaults = Self::default();
        Self {
            font_size: config.font_size,
            text_color: parse_hex_color(&config.text_color).unwrap_or(defaults.text_color),
            band_color: parse_hex_color(&config.band_color).unwrap_or(defaults.band_color),
            band_opacity: config.band_opacity.clamp(0.0, 1.0),
        }
    }
}

/// Background layer of a post.
#[derive(Debug, Clone)]
pub enum Background {
    /// Decoded picture, center-cropped to the canvas shape and scaled onto it.
    Image(DynamicImage),
    /// Flat color, used when no image was selected.
    Solid([u8; 3]),
}

impl Background {
    pub fn describe(&self) -> String {
        match self {
            Background::Image(img) => format!("image {}x{}", img.width(), img.height()),
            Background::Solid([r, g, b]) => format!("solid #{r:02x}{g:02x}{b:02x}"),
        }
    }
}

/// Everything needed to rasterize a post.
#[derive(Debug, Clone)]
pub struct PostPreview {
    pub background: Background,
    pub quote: String,
    pub canvas: CanvasSize,
    pub style: CaptionStyle,
}
