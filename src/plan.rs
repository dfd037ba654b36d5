//! The edit plan: ordered configuration the pipeline consumes.
//!
//! A plan is pure data — produced by the CLI, a TOML file, or library
//! callers — with no behavior beyond validation. The pipeline must not read
//! edit parameters from anywhere else.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ClipError, PlanError, Result};
use crate::filter::FilterKind;
use crate::overlay::TextOverlaySpec;

/// A sub-range of the source timeline, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrimRange {
    pub start: f64,
    pub end: f64,
}

/// Background-audio mixing options
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioMixSpec {
    /// Whether to replace the clip's soundtrack at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Linear gain applied to the replacement track
    #[serde(default = "default_volume")]
    pub volume: f32,
}

fn default_true() -> bool {
    true
}

fn default_volume() -> f32 {
    0.5
}

impl Default for AudioMixSpec {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: default_volume(),
        }
    }
}

/// The full description of one edit request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditPlan {
    /// Keep only this range of the source
    #[serde(default)]
    pub trim: Option<TrimRange>,

    /// Pixel filter applied to every frame
    #[serde(default)]
    pub filter: FilterKind,

    /// Playback speed factor (1.0 = unchanged)
    #[serde(default = "default_speed")]
    pub speed: f64,

    /// Optional text caption
    #[serde(default)]
    pub overlay: Option<TextOverlaySpec>,

    /// Optional background-audio replacement
    #[serde(default)]
    pub audio: Option<AudioMixSpec>,
}

fn default_speed() -> f64 {
    1.0
}

impl Default for EditPlan {
    fn default() -> Self {
        Self {
            trim: None,
            filter: FilterKind::None,
            speed: default_speed(),
            overlay: None,
            audio: None,
        }
    }
}

impl EditPlan {
    /// Load a plan from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| PlanError::FileNotFound { path: path.display().to_string() })?;

        let plan: EditPlan = toml::from_str(&content)
            .map_err(|_| PlanError::ParseFailed { path: path.display().to_string() })?;
        Ok(plan)
    }

    /// Fail-fast validation, run before any media is opened.
    ///
    /// `has_audio_source` reports whether the caller supplied an audio file;
    /// a plan that enables mixing without one is a configuration error, not
    /// a render-time surprise.
    pub fn validate(&self, has_audio_source: bool) -> Result<()> {
        if let Some(range) = &self.trim {
            if !range.start.is_finite() || !range.end.is_finite() || range.start < 0.0 || range.end <= range.start {
                return Err(PlanError::InvalidValue {
                    key: "trim".to_string(),
                    value: format!("[{}, {}]", range.start, range.end),
                }
                .into());
            }
        }

        if !(self.speed > 0.0) || !self.speed.is_finite() {
            return Err(ClipError::InvalidSpeed { factor: self.speed }.into());
        }

        if let Some(overlay) = &self.overlay {
            overlay.validate()?;
        }

        if let Some(audio) = &self.audio {
            if audio.enabled && !has_audio_source {
                return Err(PlanError::MissingAudioSource.into());
            }
            if !(audio.volume >= 0.0) || !audio.volume.is_finite() {
                return Err(PlanError::InvalidValue {
                    key: "audio.volume".to_string(),
                    value: audio.volume.to_string(),
                }
                .into());
            }
        }

        Ok(())
    }
}
