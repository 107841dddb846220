//! Rasterizer trait and shared error type.
//!
//! The production implementation is
//! [`CanvasRasterizer`](super::canvas::CanvasRasterizer). The exporter only
//! sees the trait, so tests can swap in the recording mock below.

use super::params::PostPreview;
use image::RgbaImage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RasterError {
    #[error("Font error: {0}")]
    Font(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Rendering failed: {0}")]
    RenderFailed(String),
}

/// Turns a resolved [`PostPreview`] into pixels.
pub trait Rasterizer: Send + Sync {
    fn rasterize(&self, preview: &PostPreview) -> Result<RgbaImage, RasterError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::render::params::{Background, CanvasSize, CaptionStyle};
    use std::sync::Mutex;

    /// Mock rasterizer that records what it was asked to draw.
    #[derive(Default)]
    pub struct MockRasterizer {
        pub calls: Mutex<Vec<RecordedRaster>>,
        pub fail_with: Option<String>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct RecordedRaster {
        pub background: String,
        pub quote: String,
        pub width: u32,
        pub height: u32,
    }

    impl MockRasterizer {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing(message: &str) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_with: Some(message.to_string()),
            }
        }

        pub fn get_calls(&self) -> Vec<RecordedRaster> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Rasterizer for MockRasterizer {
        fn rasterize(&self, preview: &PostPreview) -> Result<RgbaImage, RasterError> {
            self.calls.lock().unwrap().push(RecordedRaster {
                background: preview.background.describe(),
                quote: preview.quote.clone(),
                width: preview.canvas.width,
                height: preview.canvas.height,
            });
            if let Some(message) = &self.fail_with {
                return Err(RasterError::RenderFailed(message.clone()));
            }
            Ok(RgbaImage::new(preview.canvas.width, preview.canvas.height))
        }
    }

    fn preview(quote: &str) -> PostPreview {
        PostPreview {
            background: Background::Solid([1, 2, 3]),
            quote: quote.to_string(),
            canvas: CanvasSize {
                width: 20,
                height: 10,
            },
            style: CaptionStyle::default(),
        }
    }

    #[test]
    fn mock_records_rasterize() {
        let raster = MockRasterizer::new();
        let img = raster.rasterize(&preview("Hello")).unwrap();
        assert_eq!(img.dimensions(), (20, 10));

        let calls = raster.get_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0],
            RecordedRaster {
                background: "solid #010203".to_string(),
                quote: "Hello".to_string(),
                width: 20,
                height: 10,
            }
        );
    }

    #[test]
    fn failing_mock_still_records() {
        let raster = MockRasterizer::failing("boom");
        assert!(raster.rasterize(&preview("x")).is_err());
        assert_eq!(raster.get_calls().len(), 1);
    }
}
