//! Time transforms: sub-range selection and playback-speed remapping.
//!
//! Both produce a new [`Clip`] whose frame function re-parameterizes the
//! inner clip's timeline; neither decodes or materializes frames. Bound
//! audio is remapped with the frames so the track stays aligned.

use crate::clip::Clip;
use crate::error::{ClipError, Result};

impl Clip {
    /// Select `[start, end)` of this clip as a new clip.
    ///
    /// Requires `0 <= start < end <= duration`. The result's timeline starts
    /// at zero: `trim(c, s, e).frame_at(t) == c.frame_at(t + s)`. Audio, if
    /// bound, is trimmed to the same window. The original clip remains
    /// usable.
    pub fn trim(&self, start: f64, end: f64) -> Result<Clip> {
        if !start.is_finite() || !end.is_finite() || start < 0.0 || start >= end || end > self.duration() {
            return Err(ClipError::InvalidRange {
                start,
                end,
                duration: self.duration(),
            }
            .into());
        }

        let audio = self.audio().map(|a| a.trim(start, end));
        let inner = self.clone();
        Ok(self.wrapped(end - start, audio, move |t| inner.frame_at(t + start)))
    }

    /// Change playback speed by `factor`, which must be positive.
    ///
    /// The result has `duration = self.duration / factor` and
    /// `frame_at(t) = self.frame_at(t * factor)`. Bound audio is remapped by
    /// the same factor, keeping frames and samples aligned at the cost of an
    /// audible tempo shift.
    pub fn speed(&self, factor: f64) -> Result<Clip> {
        if !(factor > 0.0) || !factor.is_finite() {
            return Err(ClipError::InvalidSpeed { factor }.into());
        }

        let audio = self.audio().map(|a| a.remapped(factor));
        let inner = self.clone();
        Ok(self.wrapped(self.duration() / factor, audio, move |t| inner.frame_at(t * factor)))
    }
}
