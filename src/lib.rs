//! # Clipforge
//!
//! A frame-level video editing pipeline: trim, filter, retime, caption and
//! re-score a clip, then render the result to a playable file.
//!
//! The core abstraction is the [`Clip`](clip::Clip) — an immutable, lazily
//! evaluated, time-indexed source of frames and optional audio samples.
//! Every transformation wraps a clip in a new clip; nothing precomputes
//! frame buffers, so memory stays at one frame in flight regardless of
//! video length.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use clipforge::{
//!     pipeline::EditPipeline,
//!     plan::{EditPlan, TrimRange},
//!     render::CancelToken,
//! };
//! use std::path::Path;
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let plan = EditPlan {
//!     trim: Some(TrimRange { start: 2.0, end: 8.0 }),
//!     filter: "sepia".parse()?,
//!     speed: 2.0,
//!     ..EditPlan::default()
//! };
//!
//! let pipeline = EditPipeline::with_defaults();
//! pipeline
//!     .run(
//!         Path::new("input.mp4"),
//!         None,
//!         &plan,
//!         Path::new("output.mp4"),
//!         &CancelToken::new(),
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`clip`] - The clip abstraction, media loading, trim and speed
//! - [`filter`] - Pure per-frame pixel transforms
//! - [`overlay`] - Text caption rasterization and alpha compositing
//! - [`audio`] - Audio decoding and soundtrack replacement
//! - [`render`] - Streaming encoder and cancellation
//! - [`pipeline`] - Stage orchestration driven by an [`plan::EditPlan`]

pub mod audio;
pub mod clip;
pub mod config;
pub mod error;
pub mod filter;
pub mod overlay;
pub mod pipeline;
pub mod plan;
pub mod render;

// Re-export commonly used types for convenience
pub use crate::{
    clip::{Clip, Frame},
    config::Config,
    error::{EditError, Result},
    filter::FilterKind,
    overlay::{Anchor, FontFamily, TextOverlaySpec},
    pipeline::EditPipeline,
    plan::{AudioMixSpec, EditPlan, TrimRange},
    render::{CancelToken, EncodedVideo, Renderer},
};
