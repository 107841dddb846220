//! Post export: resolve a finalized composition, rasterize, write PNG.
//!
//! ```text
//! FinalComposition ──resolve──▶ PostPreview ──Rasterizer──▶ RGBA ──PNG──▶ <theme>-post.png
//! ```
//!
//! Background resolution:
//!
//! | Final image | Background |
//! |---|---|
//! | Placeholder | theme color |
//! | Template | `<assets_dir>/<file>` decoded from disk |
//! | Upload / generated | handle bytes decoded in memory |
//!
//! Vector uploads cannot be rasterized and fail with
//! [`ExportError::UnsupportedBackground`].

use crate::catalog::TemplateImage;
use crate::config::AppConfig;
use crate::handle::{ImageHandle, ImageKind};
use crate::render::{
    Background, CanvasRasterizer, CanvasSize, CaptionStyle, PostPreview, RasterError, Rasterizer,
};
use crate::state::{FinalComposition, PostImage, SelectedImage};
use crate::types::Theme;
use image::{ImageFormat, ImageReader};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Template image not found: {}", path.display())]
    AssetMissing { path: PathBuf },
    #[error("Could not decode background {what}: {source}")]
    Decode {
        what: String,
        #[source]
        source: image::ImageError,
    },
    #[error("Cannot render a {kind} background")]
    UnsupportedBackground { kind: ImageKind },
    #[error("Rendering failed: {0}")]
    Raster(#[from] RasterError),
    #[error("PNG encoding failed: {0}")]
    Encode(#[source] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// File name of the exported post for `theme`.
pub fn export_file_name(theme: Theme) -> String {
    format!("{}-post.png", theme.as_str())
}

/// Turns finalized compositions into PNG files.
#[derive(Clone)]
pub struct PostExporter {
    assets_dir: PathBuf,
    output_dir: PathBuf,
    canvas: CanvasSize,
    style: CaptionStyle,
    rasterizer: Arc<dyn Rasterizer>,
}

impl PostExporter {
    pub fn new(
        assets_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        rasterizer: Arc<dyn Rasterizer>,
    ) -> Self {
        Self {
            assets_dir: assets_dir.into(),
            output_dir: output_dir.into(),
            canvas: CanvasSize::default(),
            style: CaptionStyle::default(),
            rasterizer,
        }
    }

    /// Build from config, loading the caption font if one is configured.
    pub fn from_config(config: &AppConfig) -> Result<Self, ExportError> {
        let rasterizer = match &config.export.font_path {
            Some(path) => CanvasRasterizer::from_font_file(path)?,
            None => {
                warn!("no export.font_path configured; quotes will be exported without text");
                CanvasRasterizer::new()
            }
        };
        Ok(
            Self::new(&config.assets_dir, &config.export.output_dir, Arc::new(rasterizer))
                .with_canvas(CanvasSize::from(&config.export))
                .with_style(CaptionStyle::from(&config.export)),
        )
    }

    pub fn with_canvas(mut self, canvas: CanvasSize) -> Self {
        self.canvas = canvas;
        self
    }

    pub fn with_style(mut self, style: CaptionStyle) -> Self {
        self.style = style;
        self
    }

    /// Override the output directory, e.g. from `--out`.
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Where the post for `theme` will be written.
    pub fn output_path(&self, theme: Theme) -> PathBuf {
        self.output_dir.join(export_file_name(theme))
    }

    /// Resolve the background and caption into a drawable preview.
    pub fn preview(
        &self,
        theme: Theme,
        composition: &FinalComposition,
    ) -> Result<PostPreview, ExportError> {
        let background = match &composition.image {
            PostImage::Placeholder => Background::Solid(theme.placeholder_color()),
            PostImage::Selected(SelectedImage::Template(template)) => {
                Background::Image(self.load_template(template)?)
            }
            PostImage::Selected(SelectedImage::Uploaded(handle))
            | PostImage::Selected(SelectedImage::Generated(handle)) => {
                Background::Image(decode_handle(handle)?)
            }
        };
        Ok(PostPreview {
            background,
            quote: composition.quote.clone(),
            canvas: self.canvas,
            style: self.style,
        })
    }

    /// Rasterize `composition` and write `<theme>-post.png`.
    pub fn export(
        &self,
        theme: Theme,
        composition: &FinalComposition,
    ) -> Result<PathBuf, ExportError> {
        let preview = self.preview(theme, composition)?;
        debug!(
            background = %preview.background.describe(),
            quote_chars = preview.quote.chars().count(),
            "rasterizing post"
        );
        let pixels = self.rasterizer.rasterize(&preview)?;

        std::fs::create_dir_all(&self.output_dir)?;
        let path = self.output_path(theme);
        pixels
            .save_with_format(&path, ImageFormat::Png)
            .map_err(|e| match e {
                image::ImageError::IoError(io) => ExportError::Io(io),
                other => ExportError::Encode(other),
            })?;
        Ok(path)
    }

    fn load_template(&self, template: &TemplateImage) -> Result<image::DynamicImage, ExportError> {
        let path = template.path_in(&self.assets_dir);
        if !path.is_file() {
            return Err(ExportError::AssetMissing { path });
        }
        let decode_err = |source| ExportError::Decode {
            what: template.file_name.to_string(),
            source,
        };
        ImageReader::open(&path)?
            .with_guessed_format()?
            .decode()
            .map_err(decode_err)
    }
}

fn decode_handle(handle: &ImageHandle) -> Result<image::DynamicImage, ExportError> {
    if handle.kind().is_vector() {
        return Err(ExportError::UnsupportedBackground { kind: handle.kind() });
    }
    handle.decode().map_err(|source| ExportError::Decode {
        what: handle.short_id().to_string(),
        source,
    })
}
