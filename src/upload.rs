//! Upload validation.
//!
//! A user-chosen file is checked against a content-type allow-list and a size
//! ceiling before it can become a background. Accepted files are decoded into
//! an [`ImageHandle`]; nothing is sent over the network.
//!
//! | Check | Rule |
//! |---|---|
//! | Type | `image/jpeg`, `image/png`, `image/gif`, `image/webp`, `image/svg+xml` |
//! | Size | at most `upload.max_bytes` (5 MiB by default), inclusive |
//! | Content | raster types must decode; SVG must be UTF-8 with an `<svg` element |

use crate::config::{DEFAULT_MAX_UPLOAD_BYTES, UploadConfig};
use crate::handle::{ImageHandle, ImageKind};
use image::ImageFormat;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Unsupported file type '{content_type}'. Please choose a JPEG, PNG, GIF, WEBP or SVG image.")]
    UnsupportedType { content_type: String },
    #[error("File is too large ({size} bytes). The maximum upload size is {limit} bytes.")]
    TooLarge { size: u64, limit: u64 },
    #[error("File could not be read as an image: {reason}")]
    Undecodable { reason: String },
    #[error("Could not read {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A file picked by the user: name, declared type, and contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Declared content type for a path, judged by extension like a file picker does.
pub fn content_type_for(path: &Path) -> &'static str {
    let is_svg = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("svg"));
    if is_svg {
        return ImageKind::Svg.mime();
    }
    ImageFormat::from_path(path)
        .map(|f| f.to_mime_type())
        .unwrap_or("application/octet-stream")
}

/// Type and size rules applied to every upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadPolicy {
    pub max_bytes: u64,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl From<&UploadConfig> for UploadPolicy {
    fn from(config: &UploadConfig) -> Self {
        Self {
            max_bytes: config.max_bytes,
        }
    }
}

impl UploadPolicy {
    /// Type and size checks only. Does not look at the contents.
    pub fn check(&self, file: &UploadFile) -> Result<ImageKind, ValidationError> {
        let kind = ImageKind::from_mime(&file.content_type).ok_or_else(|| {
            ValidationError::UnsupportedType {
                content_type: file.content_type.clone(),
            }
        })?;
        if file.size() > self.max_bytes {
            return Err(ValidationError::TooLarge {
                size: file.size(),
                limit: self.max_bytes,
            });
        }
        Ok(kind)
    }

    /// Read a local file, declaring its type from the extension.
    ///
    /// Type and size are checked before any contents are read, and at most
    /// `max_bytes + 1` bytes are ever buffered.
    pub fn read(&self, path: &Path) -> Result<UploadFile, ValidationError> {
        let unreadable = |source: std::io::Error| ValidationError::Unreadable {
            path: path.to_path_buf(),
            source,
        };
        let content_type = content_type_for(path);
        if ImageKind::from_mime(content_type).is_none() {
            return Err(ValidationError::UnsupportedType {
                content_type: content_type.to_string(),
            });
        }

        let file = File::open(path).map_err(unreadable)?;
        let size = file.metadata().map_err(unreadable)?.len();
        if size > self.max_bytes {
            return Err(ValidationError::TooLarge {
                size,
                limit: self.max_bytes,
            });
        }

        // The file may grow between the metadata call and the read.
        let mut bytes = Vec::with_capacity(size as usize);
        file.take(self.max_bytes.saturating_add(1))
            .read_to_end(&mut bytes)
            .map_err(unreadable)?;
        if bytes.len() as u64 > self.max_bytes {
            return Err(ValidationError::TooLarge {
                size: bytes.len() as u64,
                limit: self.max_bytes,
            });
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(UploadFile::new(name, content_type, bytes))
    }

    /// Full validation: checks, then decode into a displayable handle.
    pub fn accept(&self, file: UploadFile) -> Result<ImageHandle, ValidationError> {
        let kind = self.check(&file)?;
        match kind.image_format() {
            Some(format) => {
                image::load_from_memory_with_format(&file.bytes, format).map_err(|e| {
                    ValidationError::Undecodable {
                        reason: e.to_string(),
                    }
                })?;
            }
            None => {
                let text = std::str::from_utf8(&file.bytes).map_err(|_| {
                    ValidationError::Undecodable {
                        reason: "SVG is not valid UTF-8".to_string(),
                    }
                })?;
                if !text.contains("<svg") {
                    return Err(ValidationError::Undecodable {
                        reason: "no <svg> element found".to_string(),
                    });
                }
            }
        }
        Ok(ImageHandle::new(kind, file.bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{jpeg_bytes, png_bytes};

    const MIB: usize = 1024 * 1024;

    fn policy() -> UploadPolicy {
        UploadPolicy::default()
    }

    #[test]
    fn rejects_types_outside_allow_list() {
        for content_type in ["image/bmp", "image/tiff", "application/pdf", "text/plain", ""] {
            let file = UploadFile::new("f", content_type, vec![0; 16]);
            let err = policy().check(&file).unwrap_err();
            assert!(
                matches!(err, ValidationError::UnsupportedType { .. }),
                "{content_type} should be rejected"
            );
        }
    }

    #[test]
    fn accepts_every_allowed_type() {
        for kind in ImageKind::ALL {
            let file = UploadFile::new("f", kind.mime(), vec![0; 16]);
            assert_eq!(policy().check(&file).unwrap(), kind);
        }
    }

    #[test]
    fn exactly_five_mib_is_accepted() {
        let file = UploadFile::new("big.png", "image/png", vec![0; 5 * MIB]);
        assert_eq!(policy().check(&file).unwrap(), ImageKind::Png);
    }

    #[test]
    fn one_byte_over_five_mib_is_rejected() {
        let file = UploadFile::new("big.png", "image/png", vec![0; 5 * MIB + 1]);
        let err = policy().check(&file).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::TooLarge {
                size,
                limit: 5_242_880,
            } if size == 5_242_881
        ));
        assert!(err.to_string().contains("maximum upload size"));
    }

    #[test]
    fn type_checked_before_size() {
        let file = UploadFile::new("huge.bmp", "image/bmp", vec![0; 5 * MIB + 1]);
        assert!(matches!(
            policy().check(&file),
            Err(ValidationError::UnsupportedType { .. })
        ));
    }

    #[test]
    fn accept_decodes_raster() {
        let file = UploadFile::new("photo.jpg", "image/jpeg", jpeg_bytes(40, 30));
        let handle = policy().accept(file).unwrap();
        assert_eq!(handle.kind(), ImageKind::Jpeg);
        assert_eq!(handle.decode().unwrap().width(), 40);
    }

    #[test]
    fn accept_rejects_garbage_with_image_type() {
        let file = UploadFile::new("fake.png", "image/png", b"definitely not a png".to_vec());
        assert!(matches!(
            policy().accept(file),
            Err(ValidationError::Undecodable { .. })
        ));
    }

    #[test]
    fn accept_rejects_mismatched_declared_type() {
        // PNG bytes declared as JPEG fail to decode as JPEG
        let file = UploadFile::new("x.jpg", "image/jpeg", png_bytes(4, 4));
        assert!(policy().accept(file).is_err());
    }

    #[test]
    fn accept_svg_markup() {
        let svg = br#"<?xml version="1.0"?><svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"/>"#;
        let file = UploadFile::new("logo.svg", "image/svg+xml", svg.to_vec());
        let handle = policy().accept(file).unwrap();
        assert_eq!(handle.kind(), ImageKind::Svg);
    }

    #[test]
    fn accept_rejects_svg_without_root() {
        let file = UploadFile::new("x.svg", "image/svg+xml", b"<html></html>".to_vec());
        assert!(policy().accept(file).is_err());
    }

    #[test]
    fn custom_limit_from_config() {
        let policy = UploadPolicy::from(&UploadConfig { max_bytes: 10 });
        let file = UploadFile::new("a.png", "image/png", vec![0; 11]);
        assert!(matches!(
            policy.check(&file),
            Err(ValidationError::TooLarge { limit: 10, .. })
        ));
    }

    #[test]
    fn content_type_from_extension() {
        assert_eq!(content_type_for(Path::new("a.JPG")), "image/jpeg");
        assert_eq!(content_type_for(Path::new("a.webp")), "image/webp");
        assert_eq!(content_type_for(Path::new("a.svg")), "image/svg+xml");
        assert_eq!(content_type_for(Path::new("a.bmp")), "image/bmp");
        assert_eq!(
            content_type_for(Path::new("notes")),
            "application/octet-stream"
        );
    }

    #[test]
    fn read_loads_file_with_declared_type() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("card.png");
        std::fs::write(&path, png_bytes(6, 6)).unwrap();

        let file = policy().read(&path).unwrap();
        assert_eq!(file.name, "card.png");
        assert_eq!(file.content_type, "image/png");
        assert!(policy().accept(file).is_ok());
    }

    #[test]
    fn read_missing_file() {
        let err = policy().read(Path::new("/nonexistent/card.png")).unwrap_err();
        assert!(matches!(err, ValidationError::Unreadable { .. }));
    }

    #[test]
    fn read_rejects_oversized_file_without_buffering_it() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("huge.png");
        let file = File::create(&path).unwrap();
        file.set_len(64 * MIB as u64).unwrap();

        let err = policy().read(&path).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::TooLarge {
                size,
                limit: 5_242_880,
            } if size == 64 * MIB as u64
        ));
    }

    #[test]
    fn read_accepts_exactly_the_limit() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("edge.gif");
        File::create(&path).unwrap().set_len(100).unwrap();

        let small = UploadPolicy { max_bytes: 100 };
        assert_eq!(small.read(&path).unwrap().size(), 100);
        File::options().write(true).open(&path).unwrap().set_len(101).unwrap();
        assert!(matches!(
            small.read(&path),
            Err(ValidationError::TooLarge { size: 101, limit: 100 })
        ));
    }

    #[test]
    fn read_rejects_unsupported_extension_before_opening() {
        let err = policy().read(Path::new("/nonexistent/notes.txt")).unwrap_err();
        assert!(matches!(err, ValidationError::UnsupportedType { .. }));
    }
}
