//! Bundled template backgrounds, one ordered list per theme.
//!
//! Five images ship with the card generator. Morning and congratulations
//! offer them in file order; night offers the same five in reverse, so the
//! darker frames come first.
//!
//! ```text
//! morning          sun1 sun2 sun3 sun4 sun5
//! night            sun5 sun4 sun3 sun2 sun1
//! congratulations  sun1 sun2 sun3 sun4 sun5
//! ```
//!
//! Entries are references only. The pixels live under the configured
//! `assets_dir` and are read when a post is exported.

use crate::types::Theme;
use std::path::{Path, PathBuf};

/// A bundled background image, identified by its file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TemplateImage {
    pub file_name: &'static str,
}

impl TemplateImage {
    const fn new(file_name: &'static str) -> Self {
        Self { file_name }
    }

    /// Location of the image inside an assets directory.
    pub fn path_in(&self, assets_dir: &Path) -> PathBuf {
        assets_dir.join(self.file_name)
    }
}

const SUN1: TemplateImage = TemplateImage::new("sun1.jpg");
const SUN2: TemplateImage = TemplateImage::new("sun2.jpg");
const SUN3: TemplateImage = TemplateImage::new("sun3.jpg");
const SUN4: TemplateImage = TemplateImage::new("sun4.jpg");
const SUN5: TemplateImage = TemplateImage::new("sun5.jpg");

const FORWARD: [TemplateImage; 5] = [SUN1, SUN2, SUN3, SUN4, SUN5];
const REVERSE: [TemplateImage; 5] = [SUN5, SUN4, SUN3, SUN2, SUN1];

/// Every distinct template file, in file order.
pub const ALL_TEMPLATES: &[TemplateImage] = &FORWARD;

/// The ordered template list offered for a theme.
pub fn templates_for(theme: Theme) -> &'static [TemplateImage] {
    match theme {
        Theme::Morning | Theme::Congratulations => &FORWARD,
        Theme::Night => &REVERSE,
    }
}

/// The template at `index` (0-based) in a theme's list, if any.
pub fn template_at(theme: Theme, index: usize) -> Option<TemplateImage> {
    templates_for(theme).get(index).copied()
}

/// Whether `image` is offered for `theme`.
pub fn offers(theme: Theme, image: &TemplateImage) -> bool {
    templates_for(theme).contains(image)
}
