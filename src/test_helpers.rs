//! Shared test utilities for the shubhkaman test suite.
//!
//! Provides synthetic image payloads, a temp assets directory populated with
//! the five template files, and canned generator doubles for controller tests.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let assets = setup_assets();
//! let png = png_bytes(32, 32);
//! let text = StaticText::ok("Rise and shine!");
//! ```

use async_trait::async_trait;
use image::{ImageEncoder, RgbImage};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

use crate::catalog::ALL_TEMPLATES;
use crate::generators::{GenerationError, ImageGenerator, PhraseRequest, TextGenerator};
use crate::handle::{ImageHandle, ImageKind};

// =========================================================================
// Synthetic payloads
// =========================================================================

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
}

/// Encode a gradient as JPEG.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = gradient(width, height);
    let mut out = Vec::new();
    image::codecs::jpeg::JpegEncoder::new(&mut out)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
    out
}

/// Encode a gradient as PNG.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = gradient(width, height);
    let mut out = Vec::new();
    image::codecs::png::PngEncoder::new(&mut out)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
    out
}

/// A PNG handle with distinct content per `seed`.
pub fn png_handle(seed: u32) -> ImageHandle {
    ImageHandle::new(ImageKind::Png, png_bytes(8 + seed, 8))
}

// =========================================================================
// Fixture setup
// =========================================================================

/// Temp directory holding every catalog template as a small JPEG.
pub fn setup_assets() -> TempDir {
    let tmp = TempDir::new().unwrap();
    for (i, template) in ALL_TEMPLATES.iter().enumerate() {
        let bytes = jpeg_bytes(64 + i as u32 * 8, 48);
        std::fs::write(template.path_in(tmp.path()), bytes).unwrap();
    }
    tmp
}

// =========================================================================
// Generator doubles
// =========================================================================

/// Text generator that replays queued results and counts calls.
#[derive(Default)]
pub struct StaticText {
    results: Mutex<VecDeque<Result<String, GenerationError>>>,
    pub calls: AtomicUsize,
    pub requests: Mutex<Vec<PhraseRequest>>,
}

impl StaticText {
    pub fn ok(phrase: &str) -> Self {
        Self::replay(vec![Ok(phrase.to_string())])
    }

    pub fn failing(reason: &str) -> Self {
        Self::replay(vec![Err(GenerationError::Upstream {
            status: 500,
            reason: reason.to_string(),
        })])
    }

    pub fn replay(results: Vec<Result<String, GenerationError>>) -> Self {
        Self {
            results: Mutex::new(results.into()),
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for StaticText {
    async fn generate_phrase(&self, request: &PhraseRequest) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GenerationError::EmptyResponse))
    }
}

/// Image generator that replays queued results and counts calls.
#[derive(Default)]
pub struct StaticImages {
    results: Mutex<VecDeque<Result<ImageHandle, GenerationError>>>,
    pub calls: AtomicUsize,
}

impl StaticImages {
    pub fn replay(results: Vec<Result<ImageHandle, GenerationError>>) -> Self {
        Self {
            results: Mutex::new(results.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageGenerator for StaticImages {
    async fn generate_image(&self, _prompt: &str) -> Result<ImageHandle, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GenerationError::EmptyResponse))
    }
}
