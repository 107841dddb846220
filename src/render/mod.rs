//! Post rendering.
//!
//! | Module | Role |
//! |---|---|
//! | [`params`] | what to draw: [`PostPreview`], canvas size, caption style |
//! | [`layout`] | pure geometry: cover crop, word wrap, caption band |
//! | [`backend`] | the [`Rasterizer`] trait and [`RasterError`] |
//! | [`canvas`] | [`CanvasRasterizer`], the `image` + `rusttype` implementation |
//!
//! The exporter resolves a finalized composition into a [`PostPreview`] and
//! hands it to a rasterizer; the rasterizer never reads files or state.

pub mod backend;
pub mod canvas;
pub mod layout;
pub mod params;

pub use backend::{RasterError, Rasterizer};
pub use canvas::CanvasRasterizer;
pub use params::{Background, CanvasSize, CaptionStyle, PostPreview};
