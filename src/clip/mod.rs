//! # Clip Module
//!
//! The lazily-evaluated, time-indexed clip abstraction and its time
//! transforms (trim, speed), plus media-file loading.

mod clip;
mod frame;
mod media;
mod time;

pub use clip::{Clip, FrameFn};
pub use frame::Frame;
pub use media::MediaInfo;
