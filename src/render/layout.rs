//! Pure layout calculations for the exported post.
//!
//! Nothing here touches pixels or fonts. Text measurement is passed in as a
//! closure so the wrapping logic can be tested with a fixed-width measure.

/// A rectangle in source-image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// The largest centered region of `source` with the aspect ratio of `target`.
///
/// Cropping this region and scaling it to `target` covers the target with no
/// letterboxing. The region never exceeds the source, so no intermediate
/// image is larger than the source or the target, whatever the source shape.
pub fn cover_crop(source: (u32, u32), target: (u32, u32)) -> CropRect {
    let (src_w, src_h) = (source.0 as u64, source.1 as u64);
    let (tgt_w, tgt_h) = (target.0.max(1) as u64, target.1.max(1) as u64);

    if src_w * tgt_h > src_h * tgt_w {
        // Source is wider: keep full height, trim the sides.
        let width = ((src_h * tgt_w + tgt_h / 2) / tgt_h).clamp(1, src_w.max(1));
        CropRect {
            x: ((src_w - width.min(src_w)) / 2) as u32,
            y: 0,
            width: width as u32,
            height: src_h as u32,
        }
    } else {
        // Source is taller (or the same shape): keep full width, trim top and bottom.
        let height = ((src_w * tgt_h + tgt_w / 2) / tgt_w).clamp(1, src_h.max(1));
        CropRect {
            x: 0,
            y: ((src_h - height.min(src_h)) / 2) as u32,
            width: src_w as u32,
            height: height as u32,
        }
    }
}

/// Greedy word wrap.
///
/// Words are never split; a word wider than `max_width` gets a line of its
/// own. Runs of whitespace collapse to a single space.
pub fn wrap_words<F>(text: &str, max_width: f32, measure: F) -> Vec<String>
where
    F: Fn(&str) -> f32,
{
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let candidate = format!("{current} {word}");
        if measure(&candidate) <= max_width {
            current = candidate;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Vertical geometry of the caption band at the bottom of the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandLayout {
    /// First pixel row covered by the band.
    pub top: u32,
    pub height: u32,
    /// Baseline-independent top of the first text line.
    pub text_top: f32,
    pub line_height: f32,
}

/// Size the band to fit `line_count` lines, padded by half a line on each
/// side, and never taller than the canvas.
pub fn band_layout(canvas_height: u32, line_count: usize, line_height: f32) -> BandLayout {
    let padding = line_height / 2.0;
    let wanted = (line_count as f32 * line_height + 2.0 * padding).ceil() as u32;
    let height = wanted.min(canvas_height);
    let top = canvas_height - height;
    BandLayout {
        top,
        height,
        text_top: top as f32 + padding,
        line_height,
    }
}

/// Left edge that centers a line of `line_width` on a canvas of `canvas_width`.
pub fn centered_x(canvas_width: u32, line_width: f32) -> f32 {
    ((canvas_width as f32 - line_width) / 2.0).max(0.0)
}

/// Horizontal room for text, leaving a margin of 5% per side.
pub fn text_area_width(canvas_width: u32) -> f32 {
    canvas_width as f32 * 0.9
}
