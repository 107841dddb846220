//! The composition state: every selection the user has made so far.
//!
//! One owned record with private fields, read through getters and changed
//! only through the named transitions below. No transition fails; invalid
//! input is ignored and reported through the return value.
//!
//! ## Invariants
//!
//! - Exactly one theme, image source mode and text source mode at a time.
//! - In template mode a selected image always belongs to the current theme's
//!   catalog. A theme change clears the selection.
//! - A generator that is in flight refuses to start again.
//! - The final composition is a snapshot: later edits do not touch it.

use crate::catalog::{TemplateImage, template_at};
use crate::handle::ImageHandle;
use crate::types::{ImageSourceMode, TextSourceMode, Theme};
use std::fmt;

/// Label shown in place of a background when nothing was selected.
pub const PLACEHOLDER_LABEL: &str = "AI Generated Image Placeholder";

/// The background currently chosen, and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectedImage {
    Template(TemplateImage),
    Uploaded(ImageHandle),
    Generated(ImageHandle),
}

impl SelectedImage {
    pub fn handle(&self) -> Option<&ImageHandle> {
        match self {
            SelectedImage::Template(_) => None,
            SelectedImage::Uploaded(h) | SelectedImage::Generated(h) => Some(h),
        }
    }
}

impl fmt::Display for SelectedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectedImage::Template(t) => write!(f, "template {}", t.file_name),
            SelectedImage::Uploaded(h) => write!(f, "upload {} ({})", h.short_id(), h.kind()),
            SelectedImage::Generated(h) => write!(f, "generated {} ({})", h.short_id(), h.kind()),
        }
    }
}

/// Busy flag plus the message of the most recent failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationStatus {
    in_flight: bool,
    last_error: Option<String>,
}

impl GenerationStatus {
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Mark busy. Returns `false` (and changes nothing) if already busy.
    fn begin(&mut self) -> bool {
        if self.in_flight {
            return false;
        }
        self.in_flight = true;
        true
    }

    fn succeed(&mut self) {
        self.in_flight = false;
        self.last_error = None;
    }

    fn fail(&mut self, message: String) {
        self.in_flight = false;
        self.last_error = Some(message);
    }
}

/// Background of a finalized post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostImage {
    Selected(SelectedImage),
    Placeholder,
}

impl fmt::Display for PostImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostImage::Selected(image) => image.fmt(f),
            PostImage::Placeholder => f.write_str(PLACEHOLDER_LABEL),
        }
    }
}

/// Frozen `{image, quote}` pair produced by "Generate Post".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalComposition {
    pub image: PostImage,
    pub quote: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Validation,
    Generation,
    Export,
}

/// A message the user should see, e.g. a rejected upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct CompositionState {
    theme: Theme,
    image_source: ImageSourceMode,
    text_source: TextSourceMode,
    selected: Option<SelectedImage>,
    uploaded: Option<ImageHandle>,
    generated: Vec<ImageHandle>,
    image_prompt: String,
    text_prompt: String,
    quote: String,
    image_status: GenerationStatus,
    text_status: GenerationStatus,
    final_composition: Option<FinalComposition>,
    notice: Option<Notice>,
}

impl CompositionState {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn image_source(&self) -> ImageSourceMode {
        self.image_source
    }

    pub fn text_source(&self) -> TextSourceMode {
        self.text_source
    }

    pub fn selected_image(&self) -> Option<&SelectedImage> {
        self.selected.as_ref()
    }

    pub fn uploaded_image(&self) -> Option<&ImageHandle> {
        self.uploaded.as_ref()
    }

    /// Handles from the most recent successful image request.
    pub fn generated_images(&self) -> &[ImageHandle] {
        &self.generated
    }

    pub fn image_prompt(&self) -> &str {
        &self.image_prompt
    }

    pub fn text_prompt(&self) -> &str {
        &self.text_prompt
    }

    pub fn quote(&self) -> &str {
        &self.quote
    }

    pub fn image_status(&self) -> &GenerationStatus {
        &self.image_status
    }

    pub fn text_status(&self) -> &GenerationStatus {
        &self.text_status
    }

    pub fn final_composition(&self) -> Option<&FinalComposition> {
        self.final_composition.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    // ------------------------------------------------------------------
    // Selections
    // ------------------------------------------------------------------

    /// Switch theme. Any selected image is cleared, whatever its source.
    pub fn set_theme(&mut self, theme: Theme) {
        if self.theme == theme {
            return;
        }
        self.theme = theme;
        self.selected = None;
    }

    /// Switch image source, re-pointing the selection at the new mode's record.
    pub fn set_image_source(&mut self, mode: ImageSourceMode) {
        if self.image_source == mode {
            return;
        }
        self.image_source = mode;
        self.selected = match mode {
            ImageSourceMode::Template => None,
            ImageSourceMode::Upload => self.uploaded.clone().map(SelectedImage::Uploaded),
            ImageSourceMode::AiGenerate => {
                self.generated.first().cloned().map(SelectedImage::Generated)
            }
        };
    }

    /// Pick the catalog entry at `index` (0-based) for the current theme.
    ///
    /// Ignored unless in template mode and the index is in range. Returns
    /// whether the selection changed hands to the template.
    pub fn select_template(&mut self, index: usize) -> bool {
        if self.image_source != ImageSourceMode::Template {
            return false;
        }
        match template_at(self.theme, index) {
            Some(template) => {
                self.selected = Some(SelectedImage::Template(template));
                true
            }
            None => false,
        }
    }

    /// Record an accepted upload and make it the background.
    ///
    /// The upload control only exists in upload mode, so this also switches
    /// to it.
    pub fn accept_upload(&mut self, handle: ImageHandle) {
        self.image_source = ImageSourceMode::Upload;
        self.uploaded = Some(handle.clone());
        self.selected = Some(SelectedImage::Uploaded(handle));
    }

    pub fn set_image_prompt(&mut self, prompt: impl Into<String>) {
        self.image_prompt = prompt.into();
    }

    pub fn set_text_source(&mut self, mode: TextSourceMode) {
        self.text_source = mode;
    }

    pub fn set_text_prompt(&mut self, prompt: impl Into<String>) {
        self.text_prompt = prompt.into();
    }

    /// The quote stays editable in both text modes.
    pub fn set_quote(&mut self, quote: impl Into<String>) {
        self.quote = quote.into();
    }

    // ------------------------------------------------------------------
    // Generation
    // ------------------------------------------------------------------

    /// Mark the image generator busy. `false` if it already was.
    pub fn start_image_generation(&mut self) -> bool {
        self.image_status.begin()
    }

    /// Replace the generated set and select its first handle.
    pub fn complete_image_generation(&mut self, handles: Vec<ImageHandle>) {
        self.image_status.succeed();
        self.clear_generation_notice();
        self.generated = handles;
        if self.image_source == ImageSourceMode::AiGenerate {
            self.selected = self.generated.first().cloned().map(SelectedImage::Generated);
        }
    }

    /// Back to idle with an error; the generated set and selection stay.
    pub fn fail_image_generation(&mut self, message: impl Into<String>) {
        self.image_status.fail(message.into());
    }

    pub fn start_quote_generation(&mut self) -> bool {
        self.text_status.begin()
    }

    pub fn complete_quote_generation(&mut self, phrase: impl Into<String>) {
        self.text_status.succeed();
        self.clear_generation_notice();
        self.quote = phrase.into();
    }

    pub fn fail_quote_generation(&mut self, message: impl Into<String>) {
        self.text_status.fail(message.into());
    }

    // ------------------------------------------------------------------
    // Post
    // ------------------------------------------------------------------

    /// Freeze the current image and quote, replacing any earlier snapshot.
    pub fn finalize(&mut self) -> &FinalComposition {
        let image = match &self.selected {
            Some(selected) => PostImage::Selected(selected.clone()),
            None => PostImage::Placeholder,
        };
        self.final_composition.insert(FinalComposition {
            image,
            quote: self.quote.clone(),
        })
    }

    pub fn set_notice(&mut self, kind: NoticeKind, message: impl Into<String>) {
        self.notice = Some(Notice {
            kind,
            message: message.into(),
        });
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    /// A later success supersedes a "Generation failed" notice; other notices stay.
    fn clear_generation_notice(&mut self) {
        if self
            .notice
            .as_ref()
            .is_some_and(|n| n.kind == NoticeKind::Generation)
        {
            self.notice = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{offers, templates_for};
    use crate::test_helpers::png_handle;

    #[test]
    fn initial_state() {
        let state = CompositionState::new();
        assert_eq!(state.theme(), Theme::Morning);
        assert_eq!(state.image_source(), ImageSourceMode::Template);
        assert_eq!(state.text_source(), TextSourceMode::AiGenerate);
        assert!(state.selected_image().is_none());
        assert!(state.final_composition().is_none());
        assert!(!state.image_status().is_in_flight());
        assert!(!state.text_status().is_in_flight());
    }

    // =========================================================================
    // Theme and template selection
    // =========================================================================

    #[test]
    fn select_template_uses_theme_catalog() {
        let mut state = CompositionState::new();
        state.set_theme(Theme::Night);
        assert!(state.select_template(2));
        assert_eq!(
            state.selected_image(),
            Some(&SelectedImage::Template(templates_for(Theme::Night)[2]))
        );
    }

    #[test]
    fn out_of_range_template_is_ignored() {
        let mut state = CompositionState::new();
        assert!(state.select_template(1));
        let before = state.selected_image().cloned();
        assert!(!state.select_template(5));
        assert_eq!(state.selected_image().cloned(), before);
    }

    #[test]
    fn template_pick_ignored_outside_template_mode() {
        let mut state = CompositionState::new();
        state.set_image_source(ImageSourceMode::AiGenerate);
        assert!(!state.select_template(0));
        assert!(state.selected_image().is_none());
    }

    #[test]
    fn selected_template_is_always_offered_by_current_theme() {
        let mut state = CompositionState::new();
        for theme in [Theme::Night, Theme::Morning, Theme::Congratulations, Theme::Night] {
            state.set_theme(theme);
            for index in 0..6 {
                state.select_template(index);
                if let Some(SelectedImage::Template(template)) = state.selected_image() {
                    assert!(offers(state.theme(), template));
                }
            }
        }
    }

    #[test]
    fn theme_change_clears_template_selection() {
        let mut state = CompositionState::new();
        state.select_template(0);
        state.set_theme(Theme::Congratulations);
        assert!(state.selected_image().is_none());
    }

    #[test]
    fn theme_change_clears_upload_selection_but_keeps_record() {
        let mut state = CompositionState::new();
        state.accept_upload(png_handle(1));
        state.set_theme(Theme::Night);
        assert!(state.selected_image().is_none());
        assert_eq!(state.uploaded_image(), Some(&png_handle(1)));
    }

    #[test]
    fn same_theme_keeps_selection() {
        let mut state = CompositionState::new();
        state.select_template(3);
        state.set_theme(Theme::Morning);
        assert!(state.selected_image().is_some());
    }

    // =========================================================================
    // Image source switching
    // =========================================================================

    #[test]
    fn switching_to_upload_restores_uploaded_record() {
        let mut state = CompositionState::new();
        state.accept_upload(png_handle(7));
        state.set_image_source(ImageSourceMode::Template);
        assert!(state.selected_image().is_none());

        state.set_image_source(ImageSourceMode::Upload);
        assert_eq!(
            state.selected_image(),
            Some(&SelectedImage::Uploaded(png_handle(7)))
        );
    }

    #[test]
    fn switching_to_ai_selects_first_generated() {
        let mut state = CompositionState::new();
        state.set_image_source(ImageSourceMode::AiGenerate);
        assert!(state.start_image_generation());
        state.complete_image_generation(vec![png_handle(1), png_handle(2)]);
        state.set_image_source(ImageSourceMode::Template);
        state.set_image_source(ImageSourceMode::AiGenerate);
        assert_eq!(
            state.selected_image(),
            Some(&SelectedImage::Generated(png_handle(1)))
        );
    }

    #[test]
    fn reselecting_active_mode_is_noop() {
        let mut state = CompositionState::new();
        state.select_template(4);
        state.set_image_source(ImageSourceMode::Template);
        assert!(state.selected_image().is_some());
    }

    #[test]
    fn upload_switches_mode_and_selects() {
        let mut state = CompositionState::new();
        state.accept_upload(png_handle(3));
        assert_eq!(state.image_source(), ImageSourceMode::Upload);
        assert_eq!(
            state.selected_image(),
            Some(&SelectedImage::Uploaded(png_handle(3)))
        );
    }

    // =========================================================================
    // Generation status
    // =========================================================================

    #[test]
    fn in_flight_refuses_second_start() {
        let mut state = CompositionState::new();
        assert!(state.start_image_generation());
        assert!(!state.start_image_generation());
        assert!(state.image_status().is_in_flight());
    }

    #[test]
    fn generated_set_is_replaced_not_appended() {
        let mut state = CompositionState::new();
        state.set_image_source(ImageSourceMode::AiGenerate);
        state.start_image_generation();
        state.complete_image_generation(vec![png_handle(1), png_handle(2)]);
        state.start_image_generation();
        state.complete_image_generation(vec![png_handle(3)]);
        assert_eq!(state.generated_images(), &[png_handle(3)]);
        assert_eq!(
            state.selected_image(),
            Some(&SelectedImage::Generated(png_handle(3)))
        );
    }

    #[test]
    fn failure_keeps_set_and_records_error() {
        let mut state = CompositionState::new();
        state.set_image_source(ImageSourceMode::AiGenerate);
        state.start_image_generation();
        state.complete_image_generation(vec![png_handle(1)]);

        state.start_image_generation();
        state.fail_image_generation("boom");
        assert!(!state.image_status().is_in_flight());
        assert_eq!(state.image_status().last_error(), Some("boom"));
        assert_eq!(state.generated_images(), &[png_handle(1)]);
        assert_eq!(
            state.selected_image(),
            Some(&SelectedImage::Generated(png_handle(1)))
        );
    }

    #[test]
    fn success_clears_previous_error() {
        let mut state = CompositionState::new();
        state.start_quote_generation();
        state.fail_quote_generation("timeout");
        state.start_quote_generation();
        state.complete_quote_generation("Good night");
        assert_eq!(state.text_status().last_error(), None);
        assert_eq!(state.quote(), "Good night");
    }

    #[test]
    fn quote_failure_keeps_quote() {
        let mut state = CompositionState::new();
        state.set_quote("Hand written");
        state.start_quote_generation();
        state.fail_quote_generation("401");
        assert_eq!(state.quote(), "Hand written");
    }

    // =========================================================================
    // Finalize
    // =========================================================================

    #[test]
    fn finalize_without_selection_uses_placeholder() {
        let mut state = CompositionState::new();
        state.set_quote("Hello");
        let fc = state.finalize().clone();
        assert_eq!(
            fc,
            FinalComposition {
                image: PostImage::Placeholder,
                quote: "Hello".to_string(),
            }
        );
        assert_eq!(fc.image.to_string(), PLACEHOLDER_LABEL);
    }

    #[test]
    fn finalize_twice_keeps_only_latest() {
        let mut state = CompositionState::new();
        state.set_quote("first");
        state.finalize();
        state.set_quote("second");
        state.finalize();
        assert_eq!(state.final_composition().unwrap().quote, "second");
    }

    #[test]
    fn snapshot_ignores_later_edits() {
        let mut state = CompositionState::new();
        state.select_template(0);
        state.set_quote("kept");
        state.finalize();
        state.set_quote("changed");
        state.set_theme(Theme::Night);
        let fc = state.final_composition().unwrap();
        assert_eq!(fc.quote, "kept");
        assert!(matches!(fc.image, PostImage::Selected(SelectedImage::Template(_))));
    }

    #[test]
    fn notice_set_and_clear() {
        let mut state = CompositionState::new();
        state.set_notice(NoticeKind::Validation, "too big");
        assert_eq!(state.notice().unwrap().kind, NoticeKind::Validation);
        state.clear_notice();
        assert!(state.notice().is_none());
    }

    #[test]
    fn generation_success_clears_generation_notice() {
        let mut state = CompositionState::new();
        state.start_quote_generation();
        state.fail_quote_generation("503");
        state.set_notice(NoticeKind::Generation, "503");
        state.start_quote_generation();
        state.complete_quote_generation("Good night");
        assert!(state.notice().is_none());

        state.set_image_source(ImageSourceMode::AiGenerate);
        state.set_notice(NoticeKind::Generation, "timeout");
        state.start_image_generation();
        state.complete_image_generation(vec![png_handle(1)]);
        assert!(state.notice().is_none());
    }

    #[test]
    fn generation_success_keeps_other_notices() {
        let mut state = CompositionState::new();
        state.set_notice(NoticeKind::Validation, "too big");
        state.start_quote_generation();
        state.complete_quote_generation("Hello");
        assert_eq!(state.notice().unwrap().kind, NoticeKind::Validation);
    }
}
