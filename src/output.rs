//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Every entity leads with its identity (theme label, template position,
//! file name) and shows details as indented context lines, so the output
//! reads as an inventory of what the user picked.
//!
//! # Output Format
//!
//! ## Catalog
//!
//! ```text
//! Night
//! 001 Template 1
//!     Source: sun5.jpg
//! 002 Template 2
//!     Source: sun4.jpg
//! ```
//!
//! ## Upload check
//!
//! ```text
//! portrait.jpg
//!     Accepted: image/jpeg, 48213 bytes
//!     Id: 3f9a1c0d7b22
//! ```
//!
//! ## Compose
//!
//! ```text
//! Theme: Night
//! Background: Template images
//!     Selected: template sun3.jpg
//! Quote: Write by own
//!     Text: Sweet dreams
//! Image generator: idle
//! Text generator: idle
//!
//! Post
//!     Image: template sun3.jpg
//!     Quote: Sweet dreams
//! Saved → ./night-post.png
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::catalog::templates_for;
use crate::handle::ImageHandle;
use crate::state::{
    CompositionState, FinalComposition, GenerationStatus, Notice, NoticeKind,
};
use crate::types::Theme;
use crate::upload::ValidationError;
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_text(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max).collect();
        format!("{head}...")
    }
}

fn status_line(name: &str, status: &GenerationStatus) -> String {
    let state = if status.is_in_flight() {
        "in flight".to_string()
    } else {
        match status.last_error() {
            Some(err) => format!("failed: {err}"),
            None => "idle".to_string(),
        }
    };
    format!("{name}: {state}")
}

// ============================================================================
// Catalog
// ============================================================================

/// Template list per theme, positions 1-based as shown to the user.
pub fn format_catalog(themes: &[Theme]) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, theme) in themes.iter().enumerate() {
        if i > 0 {
            lines.push(String::new());
        }
        lines.push(theme.label().to_string());
        for (pos, template) in templates_for(*theme).iter().enumerate() {
            lines.push(format!("{} Template {}", format_index(pos + 1), pos + 1));
            lines.push(format!("{}Source: {}", indent(1), template.file_name));
        }
    }
    lines
}

pub fn print_catalog(themes: &[Theme]) {
    for line in format_catalog(themes) {
        println!("{}", line);
    }
}

// ============================================================================
// Upload check
// ============================================================================

pub fn format_upload_report(
    name: &str,
    result: &Result<ImageHandle, ValidationError>,
) -> Vec<String> {
    let mut lines = vec![name.to_string()];
    match result {
        Ok(handle) => {
            lines.push(format!(
                "{}Accepted: {}, {} bytes",
                indent(1),
                handle.kind(),
                handle.len()
            ));
            lines.push(format!("{}Id: {}", indent(1), handle.short_id()));
        }
        Err(e) => lines.push(format!("{}Rejected: {}", indent(1), e)),
    }
    lines
}

pub fn print_upload_report(name: &str, result: &Result<ImageHandle, ValidationError>) {
    for line in format_upload_report(name, result) {
        println!("{}", line);
    }
}

// ============================================================================
// Session state
// ============================================================================

/// Current selections, as the form would show them.
pub fn format_state(state: &CompositionState) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format!("Theme: {}", state.theme().label()));

    lines.push(format!("Background: {}", state.image_source().label()));
    match state.selected_image() {
        Some(image) => lines.push(format!("{}Selected: {}", indent(1), image)),
        None => lines.push(format!("{}Selected: none", indent(1))),
    }
    let generated = state.generated_images();
    if !generated.is_empty() {
        lines.push(format!("{}Generated: {} image(s)", indent(1), generated.len()));
    }

    lines.push(format!("Quote: {}", state.text_source().label()));
    if state.quote().is_empty() {
        lines.push(format!("{}Text: (empty)", indent(1)));
    } else {
        lines.push(format!("{}Text: {}", indent(1), truncate_text(state.quote(), 80)));
    }

    lines.push(status_line("Image generator", state.image_status()));
    lines.push(status_line("Text generator", state.text_status()));
    lines
}

pub fn print_state(state: &CompositionState) {
    for line in format_state(state) {
        println!("{}", line);
    }
}

// ============================================================================
// Post and download
// ============================================================================

pub fn format_post(post: &FinalComposition) -> Vec<String> {
    let quote = if post.quote.is_empty() {
        "(empty)".to_string()
    } else {
        truncate_text(&post.quote, 80)
    };
    vec![
        "Post".to_string(),
        format!("{}Image: {}", indent(1), post.image),
        format!("{}Quote: {}", indent(1), quote),
    ]
}

pub fn print_post(post: &FinalComposition) {
    for line in format_post(post) {
        println!("{}", line);
    }
}

pub fn format_notice(notice: &Notice) -> String {
    let kind = match notice.kind {
        NoticeKind::Validation => "Upload rejected",
        NoticeKind::Generation => "Generation failed",
        NoticeKind::Export => "Export failed",
    };
    format!("{kind}: {}", notice.message)
}

/// Result of "Download": the saved path, or why nothing was saved.
pub fn format_download(saved: Option<&Path>, notice: Option<&Notice>) -> Vec<String> {
    match (saved, notice) {
        (Some(path), _) => vec![format!("Saved → {}", path.display())],
        (None, Some(notice)) => vec![format_notice(notice)],
        (None, None) => vec!["Nothing to download".to_string()],
    }
}

pub fn print_download(saved: Option<&Path>, notice: Option<&Notice>) {
    for line in format_download(saved, notice) {
        println!("{}", line);
    }
}
