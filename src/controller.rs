//! Orchestration: user actions in, state transitions out.
//!
//! The [`Controller`] owns the [`CompositionState`] and the collaborators
//! (generator clients, upload policy, exporter). Synchronous actions mutate
//! the state directly. Generator calls are split in three so that text and
//! image requests can run at the same time without sharing `&mut self`:
//!
//! ```text
//! begin_image_generation() ─▶ Option<ImageJob> ─run().await─▶ Result ─▶ finish_image_generation()
//! begin_quote_generation() ─▶ Option<QuoteJob> ─run().await─▶ Result ─▶ finish_quote_generation()
//! ```
//!
//! `begin_*` returns `None` when the action is ignored (blank prompt or the
//! generator already in flight). Between `begin_*` and `finish_*` the
//! generator stays in flight; a job that is never finished keeps it there.

use crate::export::PostExporter;
use crate::generators::{
    GenerationError, ImageGenerator, PhraseRequest, TextGenerator, generate_batch,
};
use crate::handle::ImageHandle;
use crate::state::{CompositionState, FinalComposition, NoticeKind};
use crate::types::{ImageSourceMode, TextSourceMode, Theme};
use crate::upload::{UploadFile, UploadPolicy, ValidationError};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// A started image request, detached from the controller.
pub struct ImageJob {
    generator: Arc<dyn ImageGenerator>,
    prompt: String,
    count: usize,
}

impl ImageJob {
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub async fn run(self) -> Result<Vec<ImageHandle>, GenerationError> {
        generate_batch(self.generator.as_ref(), &self.prompt, self.count).await
    }
}

/// A started quote request, detached from the controller.
pub struct QuoteJob {
    generator: Arc<dyn TextGenerator>,
    request: PhraseRequest,
}

impl QuoteJob {
    pub fn request(&self) -> &PhraseRequest {
        &self.request
    }

    pub async fn run(self) -> Result<String, GenerationError> {
        self.generator.generate_phrase(&self.request).await
    }
}

pub struct Controller {
    state: CompositionState,
    text: Arc<dyn TextGenerator>,
    images: Arc<dyn ImageGenerator>,
    exporter: PostExporter,
    uploads: UploadPolicy,
    image_count: usize,
}

impl Controller {
    pub fn new(
        text: Arc<dyn TextGenerator>,
        images: Arc<dyn ImageGenerator>,
        exporter: PostExporter,
    ) -> Self {
        Self {
            state: CompositionState::new(),
            text,
            images,
            exporter,
            uploads: UploadPolicy::default(),
            image_count: 1,
        }
    }

    pub fn with_upload_policy(mut self, policy: UploadPolicy) -> Self {
        self.uploads = policy;
        self
    }

    /// Candidates per image request; at least one.
    pub fn with_image_count(mut self, count: usize) -> Self {
        self.image_count = count.max(1);
        self
    }

    pub fn state(&self) -> &CompositionState {
        &self.state
    }

    // ------------------------------------------------------------------
    // Selections
    // ------------------------------------------------------------------

    pub fn select_theme(&mut self, theme: Theme) {
        debug!(%theme, "theme selected");
        self.state.set_theme(theme);
    }

    pub fn set_image_source(&mut self, mode: ImageSourceMode) {
        debug!(%mode, "image source selected");
        self.state.set_image_source(mode);
    }

    /// Click on catalog entry `index` (0-based). Returns whether it was taken.
    pub fn pick_template(&mut self, index: usize) -> bool {
        let picked = self.state.select_template(index);
        if !picked {
            warn!(
                index,
                theme = %self.state.theme(),
                mode = %self.state.image_source(),
                "template pick ignored"
            );
        }
        picked
    }

    /// Validate `file` and, if accepted, make it the background.
    ///
    /// A rejection leaves the selection untouched and raises a notice.
    pub fn upload(&mut self, file: UploadFile) -> Result<(), ValidationError> {
        let name = file.name.clone();
        match self.uploads.accept(file) {
            Ok(handle) => {
                info!(file = %name, id = handle.short_id(), kind = %handle.kind(), "upload accepted");
                self.state.accept_upload(handle);
                self.state.clear_notice();
                Ok(())
            }
            Err(e) => {
                warn!(file = %name, error = %e, "upload rejected");
                self.state.set_notice(NoticeKind::Validation, e.to_string());
                Err(e)
            }
        }
    }

    pub fn set_image_prompt(&mut self, prompt: impl Into<String>) {
        self.state.set_image_prompt(prompt);
    }

    pub fn set_text_source(&mut self, mode: TextSourceMode) {
        debug!(%mode, "text source selected");
        self.state.set_text_source(mode);
    }

    pub fn set_text_prompt(&mut self, prompt: impl Into<String>) {
        self.state.set_text_prompt(prompt);
    }

    pub fn set_quote(&mut self, quote: impl Into<String>) {
        self.state.set_quote(quote);
    }

    // ------------------------------------------------------------------
    // Image generation
    // ------------------------------------------------------------------

    /// Start an image request, or `None` if the click is ignored.
    pub fn begin_image_generation(&mut self) -> Option<ImageJob> {
        let prompt = self.state.image_prompt().trim().to_string();
        if prompt.is_empty() {
            warn!("image prompt is empty; nothing to generate");
            return None;
        }
        if !self.state.start_image_generation() {
            warn!("image generation already in flight");
            return None;
        }
        debug!(prompt = %prompt, count = self.image_count, "image generation started");
        Some(ImageJob {
            generator: Arc::clone(&self.images),
            prompt,
            count: self.image_count,
        })
    }

    pub fn finish_image_generation(&mut self, result: Result<Vec<ImageHandle>, GenerationError>) {
        match result {
            Ok(handles) => {
                info!(count = handles.len(), "images generated");
                self.state.complete_image_generation(handles);
            }
            Err(e) => {
                warn!(error = %e, "image generation failed");
                self.state.fail_image_generation(e.to_string());
                self.state.set_notice(NoticeKind::Generation, e.to_string());
            }
        }
    }

    /// Begin, run and finish in one go. Returns whether a request was made.
    pub async fn generate_image(&mut self) -> bool {
        let Some(job) = self.begin_image_generation() else {
            return false;
        };
        let result = job.run().await;
        self.finish_image_generation(result);
        true
    }

    // ------------------------------------------------------------------
    // Quote generation
    // ------------------------------------------------------------------

    /// Start a quote request, or `None` if the click is ignored.
    pub fn begin_quote_generation(&mut self) -> Option<QuoteJob> {
        let topic = self.state.text_prompt().trim().to_string();
        if topic.is_empty() {
            warn!("quote prompt is empty; nothing to generate");
            return None;
        }
        if !self.state.start_quote_generation() {
            warn!("quote generation already in flight");
            return None;
        }
        let request = PhraseRequest {
            theme: self.state.theme(),
            topic,
        };
        debug!(theme = %request.theme, topic = %request.topic, "quote generation started");
        Some(QuoteJob {
            generator: Arc::clone(&self.text),
            request,
        })
    }

    pub fn finish_quote_generation(&mut self, result: Result<String, GenerationError>) {
        match result {
            Ok(phrase) => {
                info!(phrase = %phrase, "quote generated");
                self.state.complete_quote_generation(phrase);
            }
            Err(e) => {
                warn!(error = %e, "quote generation failed");
                self.state.fail_quote_generation(e.to_string());
                self.state.set_notice(NoticeKind::Generation, e.to_string());
            }
        }
    }

    pub async fn generate_quote(&mut self) -> bool {
        let Some(job) = self.begin_quote_generation() else {
            return false;
        };
        let result = job.run().await;
        self.finish_quote_generation(result);
        true
    }

    // ------------------------------------------------------------------
    // Post
    // ------------------------------------------------------------------

    /// "Generate Post": snapshot the current image and quote. Never fails.
    pub fn generate_post(&mut self) -> &FinalComposition {
        let composition = self.state.finalize();
        info!(image = %composition.image, quote = %composition.quote, "post generated");
        composition
    }

    /// "Download": export the last generated post.
    ///
    /// `None` if no post was generated yet or the export failed; failures are
    /// logged and raised as a notice.
    pub fn download(&mut self) -> Option<PathBuf> {
        let Some(composition) = self.state.final_composition() else {
            warn!("download requested before any post was generated");
            return None;
        };
        let theme = self.state.theme();
        match self.exporter.export(theme, composition) {
            Ok(path) => {
                info!(path = %path.display(), "post exported");
                Some(path)
            }
            Err(e) => {
                error!(error = %e, "post export failed");
                self.state.set_notice(NoticeKind::Export, e.to_string());
                None
            }
        }
    }
}
