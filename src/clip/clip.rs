use std::fmt;
use std::sync::Arc;

use crate::audio::AudioTrack;
use crate::clip::Frame;
use crate::error::{ClipError, Result};

/// Pure frame function: timestamp in `[0, duration)` to a decoded frame.
pub type FrameFn = dyn Fn(f64) -> Result<Frame> + Send + Sync;

/// An immutable, lazily-evaluated, time-indexed source of video frames and
/// optional audio samples.
///
/// A `Clip` never holds decoded frames; `frame_at` produces each frame on
/// demand, so memory stays bounded regardless of duration. Transforms (trim,
/// speed, filters, overlays) wrap the frame function of an existing clip and
/// return a new `Clip`; nothing is ever mutated. Cloning shares the frame
/// function.
#[derive(Clone)]
pub struct Clip {
    duration: f64,
    width: u32,
    height: u32,
    fps: f64,
    frames: Arc<FrameFn>,
    audio: Option<AudioTrack>,
}

impl Clip {
    /// Build a clip from a pure frame function.
    ///
    /// Duration, dimensions and frame rate must all be positive.
    pub fn from_frame_fn<F>(duration: f64, width: u32, height: u32, fps: f64, frames: F) -> Result<Self>
    where
        F: Fn(f64) -> Result<Frame> + Send + Sync + 'static,
    {
        if !(duration > 0.0) || !duration.is_finite() {
            return Err(ClipError::InvalidParameters {
                details: format!("duration must be positive, got {duration}"),
            }
            .into());
        }
        if width == 0 || height == 0 {
            return Err(ClipError::InvalidParameters {
                details: format!("frame size must be positive, got {width}x{height}"),
            }
            .into());
        }
        if !(fps > 0.0) || !fps.is_finite() {
            return Err(ClipError::InvalidParameters {
                details: format!("frame rate must be positive, got {fps}"),
            }
            .into());
        }

        Ok(Self {
            duration,
            width,
            height,
            fps,
            frames: Arc::new(frames),
            audio: None,
        })
    }

    /// Duration in seconds
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Frame width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Frame rate in frames per second
    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Number of frames the renderer will pull from this clip
    pub fn frame_count(&self) -> u64 {
        (self.duration * self.fps).round().max(1.0) as u64
    }

    /// Seconds between consecutive frames
    pub fn frame_interval(&self) -> f64 {
        1.0 / self.fps
    }

    /// The bound audio track, if any
    pub fn audio(&self) -> Option<&AudioTrack> {
        self.audio.as_ref()
    }

    /// Whether an audio track is bound
    pub fn has_audio(&self) -> bool {
        self.audio.is_some()
    }

    /// Decode the frame at time `t` (clip-local seconds).
    ///
    /// `t` is clamped into `[0, duration)` first, so float rounding at stage
    /// boundaries cannot push a lookup out of the defined domain.
    pub fn frame_at(&self, t: f64) -> Result<Frame> {
        let max = self.duration - self.frame_interval() * 0.5;
        let t = t.clamp(0.0, max.max(0.0));
        (self.frames)(t)
    }

    /// A copy of this clip with its audio track replaced (or removed)
    pub fn with_audio(&self, audio: Option<AudioTrack>) -> Self {
        let mut clip = self.clone();
        clip.audio = audio;
        clip
    }

    /// A copy of this clip with a new duration and frame function, keeping
    /// size and frame rate. Used by the time/filter/overlay wrappers.
    pub(crate) fn wrapped<F>(&self, duration: f64, audio: Option<AudioTrack>, frames: F) -> Self
    where
        F: Fn(f64) -> Result<Frame> + Send + Sync + 'static,
    {
        Self {
            duration,
            width: self.width,
            height: self.height,
            fps: self.fps,
            frames: Arc::new(frames),
            audio,
        }
    }
}

impl fmt::Debug for Clip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Clip")
            .field("duration", &self.duration)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("fps", &self.fps)
            .field("has_audio", &self.audio.is_some())
            .finish()
    }
}
