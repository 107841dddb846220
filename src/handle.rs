//! In-memory image payloads: uploads and generated backgrounds.
//!
//! A handle owns the encoded bytes (cheaply clonable) and is identified by
//! the SHA-256 of those bytes, so two handles with the same content compare
//! equal no matter where they came from.

use image::error::ImageFormatHint;
use image::{DynamicImage, ImageFormat};
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;

/// Encodings a background may arrive in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageKind {
    Jpeg,
    Png,
    Gif,
    WebP,
    Svg,
}

impl ImageKind {
    pub const ALL: [ImageKind; 5] = [
        ImageKind::Jpeg,
        ImageKind::Png,
        ImageKind::Gif,
        ImageKind::WebP,
        ImageKind::Svg,
    ];

    pub fn mime(self) -> &'static str {
        match self {
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Png => "image/png",
            ImageKind::Gif => "image/gif",
            ImageKind::WebP => "image/webp",
            ImageKind::Svg => "image/svg+xml",
        }
    }

    /// Parse a declared content type. Parameters (`; charset=...`) are ignored.
    pub fn from_mime(content_type: &str) -> Option<Self> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();
        let essence = if essence == "image/jpg" {
            "image/jpeg".to_string()
        } else {
            essence
        };
        Self::ALL.into_iter().find(|k| k.mime() == essence)
    }

    /// Raster decoder for this kind; `None` for vector content.
    pub fn image_format(self) -> Option<ImageFormat> {
        match self {
            ImageKind::Jpeg => Some(ImageFormat::Jpeg),
            ImageKind::Png => Some(ImageFormat::Png),
            ImageKind::Gif => Some(ImageFormat::Gif),
            ImageKind::WebP => Some(ImageFormat::WebP),
            ImageKind::Svg => None,
        }
    }

    fn from_image_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Jpeg => Some(ImageKind::Jpeg),
            ImageFormat::Png => Some(ImageKind::Png),
            ImageFormat::Gif => Some(ImageKind::Gif),
            ImageFormat::WebP => Some(ImageKind::WebP),
            _ => None,
        }
    }

    /// Identify a raster payload from its magic bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        image::guess_format(bytes)
            .ok()
            .and_then(Self::from_image_format)
    }

    pub fn is_vector(self) -> bool {
        self == ImageKind::Svg
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}

/// A displayable image held in memory.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageHandle {
    id: String,
    kind: ImageKind,
    bytes: Arc<[u8]>,
}

impl ImageHandle {
    pub fn new(kind: ImageKind, bytes: impl Into<Arc<[u8]>>) -> Self {
        let bytes = bytes.into();
        let id = format!("{:x}", Sha256::digest(&bytes));
        Self { id, kind, bytes }
    }

    /// Full SHA-256 hex digest of the payload.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// First 12 hex digits of the id, for display.
    pub fn short_id(&self) -> &str {
        &self.id[..12]
    }

    pub fn kind(&self) -> ImageKind {
        self.kind
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Decode to pixels. Fails for vector payloads.
    pub fn decode(&self) -> image::ImageResult<DynamicImage> {
        match self.kind.image_format() {
            Some(format) => image::load_from_memory_with_format(&self.bytes, format),
            None => Err(image::ImageError::Unsupported(
                ImageFormatHint::Name("svg".to_string()).into(),
            )),
        }
    }
}

impl fmt::Debug for ImageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageHandle")
            .field("id", &self.short_id())
            .field("kind", &self.kind)
            .field("len", &self.bytes.len())
            .finish()
    }
}
