//! # ShubhkamanAI
//!
//! A greeting-card generator. Pick a theme, choose a background (a bundled
//! template, your own upload, or an AI-generated picture), write or generate
//! a short quote, and export the result as `<theme>-post.png`.
//!
//! # Architecture: One State, One Controller
//!
//! All user choices live in a single owned [`state::CompositionState`]. The
//! [`controller::Controller`] is the only thing that changes it, through
//! named transitions. Front ends (the bundled CLI, or anything else) call the
//! controller and re-read the state afterwards:
//!
//! ```text
//! user action ─▶ Controller ─▶ CompositionState ─▶ view re-reads
//!                    │
//!                    ├─▶ UploadPolicy        (validate + decode uploads)
//!                    ├─▶ TextGenerator       (quote, over HTTP)
//!                    ├─▶ ImageGenerator      (backgrounds, over HTTP)
//!                    └─▶ PostExporter ─▶ Rasterizer ─▶ <theme>-post.png
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`types`] | Theme, image source mode, text source mode |
//! | [`catalog`] | The five template backgrounds and their per-theme order |
//! | [`handle`] | Content-addressed in-memory image handles |
//! | [`upload`] | Upload validation: type allow-list, size ceiling, decode |
//! | [`generators`] | Text and image generator traits and their HTTP clients |
//! | [`state`] | The composition state and its transitions |
//! | [`controller`] | Orchestration of user actions, generator jobs and export |
//! | [`render`] | Layout math and rasterization of the final post |
//! | [`export`] | Resolve a finalized post, rasterize, write PNG |
//! | [`config`] | `shubhkaman.toml` loading, merging and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Theme Change Clears the Selection
//!
//! Switching theme drops the selected background, whichever mode it came
//! from. Template lists differ per theme, so a kept template could point
//! outside the new list; clearing uploads and generated images too keeps the
//! rule simple to state. The upload record and generated set are kept, and
//! switching back to their mode selects them again.
//!
//! ## Jobs Instead of Long `&mut self` Borrows
//!
//! Generator calls are split into `begin_*` (mark in flight, return a job),
//! the job's async `run`, and `finish_*` (apply the result). Text and image
//! jobs hold no borrow of the controller, so the CLI can `tokio::join!` them.
//! The in-flight flag is what stops a second click from starting a duplicate
//! request.
//!
//! ## All-or-Nothing Image Batches
//!
//! A request for N backgrounds is N independent HTTP calls joined with
//! `futures::future::try_join_all`. Results keep request order; one failure
//! fails the batch and the previous set stays on screen.
//!
//! ## Credentials From the Environment
//!
//! API keys are never compiled in or written to config. Each generator reads
//! the variable named by `api_key_env` when it sends a request, so a missing
//! key is a per-request error and not a startup failure.
//!
//! ## Pure-Rust Rendering
//!
//! Export uses the `image` crate for decoding, center crop, Lanczos3 scaling and PNG
//! encoding, and `rusttype` for the quote. No system libraries are needed;
//! the font is an optional file named in config.

pub mod catalog;
pub mod config;
pub mod controller;
pub mod export;
pub mod generators;
pub mod handle;
pub mod output;
pub mod render;
pub mod state;
pub mod types;
pub mod upload;

#[cfg(test)]
pub(crate) mod test_helpers;
