use std::sync::Arc;

/// Decoded audio: interleaved f32 samples plus stream parameters.
#[derive(Debug, Clone)]
pub struct AudioData {
    /// Audio samples (interleaved for stereo, mono for single channel)
    pub samples: Vec<f32>,

    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Number of channels (1 = mono, 2 = stereo)
    pub channels: u16,
}

impl AudioData {
    /// Duration in seconds of the decoded data
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 || self.channels == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / (self.sample_rate as f64 * self.channels as f64)
    }
}

/// A time-indexed view over decoded audio.
///
/// The track is a window (`start`, `duration`) into shared [`AudioData`]
/// with a linear gain and a time-remap factor. All operations return a new
/// track over the same data; `sample_at` is a pure function and reads past
/// the underlying samples are silence.
#[derive(Debug, Clone)]
pub struct AudioTrack {
    data: Arc<AudioData>,
    start: f64,
    duration: f64,
    speed: f64,
    volume: f32,
}

impl AudioTrack {
    /// A track spanning the full decoded data at unit gain
    pub fn new(data: Arc<AudioData>) -> Self {
        let duration = data.duration();
        Self {
            data,
            start: 0.0,
            duration,
            speed: 1.0,
            volume: 1.0,
        }
    }

    /// Convenience constructor for synthesized sample buffers
    pub fn from_samples(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        Self::new(Arc::new(AudioData {
            samples,
            sample_rate,
            channels,
        }))
    }

    /// Track duration in seconds
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Linear gain multiplier applied to every sample
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Sample rate of the underlying data in Hz
    pub fn sample_rate(&self) -> u32 {
        self.data.sample_rate
    }

    /// Channel count of the underlying data
    pub fn channels(&self) -> u16 {
        self.data.channels
    }

    /// Select `[start, end)` of this track's timeline as a new track
    pub fn trim(&self, start: f64, end: f64) -> AudioTrack {
        let mut track = self.clone();
        track.start = self.start + start * self.speed;
        track.duration = (end - start).max(0.0);
        track
    }

    /// Same window start, new duration; a longer duration extends into
    /// silence once the underlying data runs out
    pub fn with_duration(&self, duration: f64) -> AudioTrack {
        let mut track = self.clone();
        track.duration = duration.max(0.0);
        track
    }

    /// Multiply the track's gain by `gain`
    pub fn scaled(&self, gain: f32) -> AudioTrack {
        let mut track = self.clone();
        track.volume = self.volume * gain;
        track
    }

    /// Remap the track's timeline by a positive speed factor, shrinking the
    /// window duration accordingly
    pub fn remapped(&self, factor: f64) -> AudioTrack {
        let mut track = self.clone();
        track.speed = self.speed * factor;
        track.duration = self.duration / factor;
        track
    }

    /// The sample for `channel` at track-local time `t`, with gain applied.
    ///
    /// Returns 0.0 (silence) outside `[0, duration)` and past the end of the
    /// decoded data.
    pub fn sample_at(&self, t: f64, channel: usize) -> f32 {
        if t < 0.0 || t >= self.duration || channel >= self.data.channels as usize {
            return 0.0;
        }

        let src_t = self.start + t * self.speed;
        if src_t < 0.0 {
            return 0.0;
        }

        let frame = (src_t * self.data.sample_rate as f64) as usize;
        let index = frame * self.data.channels as usize + channel;
        self.data.samples.get(index).copied().unwrap_or(0.0) * self.volume
    }

    /// Materialize the track as interleaved samples at the source sample
    /// rate, for handing to the encoder.
    pub fn render_samples(&self) -> Vec<f32> {
        let rate = self.data.sample_rate as f64;
        let channels = self.data.channels as usize;
        let frames = (self.duration * rate).round() as usize;

        let mut out = Vec::with_capacity(frames * channels);
        for i in 0..frames {
            let t = i as f64 / rate;
            for ch in 0..channels {
                out.push(self.sample_at(t, ch));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 1 second ramp at 1000 Hz mono: sample i has value i/1000
    fn ramp_track() -> AudioTrack {
        let samples: Vec<f32> = (0..1000).map(|i| i as f32 / 1000.0).collect();
        AudioTrack::from_samples(samples, 1000, 1)
    }

    #[test]
    fn test_sample_lookup() {
        let track = ramp_track();
        assert!((track.sample_at(0.5, 0) - 0.5).abs() < 1e-3);
        assert_eq!(track.sample_at(-0.1, 0), 0.0);
        assert_eq!(track.sample_at(1.0, 0), 0.0);
        // Nonexistent channel is silent
        assert_eq!(track.sample_at(0.5, 1), 0.0);
    }

    #[test]
    fn test_trim_rebases_timeline() {
        let track = ramp_track().trim(0.25, 0.75);
        assert!((track.duration() - 0.5).abs() < 1e-9);
        assert!((track.sample_at(0.0, 0) - 0.25).abs() < 1e-3);
        assert!((track.sample_at(0.25, 0) - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_extension_is_silence() {
        let track = ramp_track().with_duration(2.0);
        assert!((track.duration() - 2.0).abs() < 1e-9);
        assert!(track.sample_at(0.5, 0) > 0.0);
        assert_eq!(track.sample_at(1.5, 0), 0.0);
    }

    #[test]
    fn test_gain_is_applied_and_composes() {
        let track = ramp_track().scaled(0.5).scaled(0.5);
        assert!((track.sample_at(0.8, 0) - 0.2).abs() < 1e-3);
    }

    #[test]
    fn test_remap_keeps_alignment() {
        let track = ramp_track().remapped(2.0);
        assert!((track.duration() - 0.5).abs() < 1e-9);
        // t=0.25 in the remapped track reads the source at t=0.5
        assert!((track.sample_at(0.25, 0) - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_trim_after_remap() {
        let track = ramp_track().remapped(2.0).trim(0.1, 0.3);
        // Window start in source time: 0.1 * 2.0 = 0.2
        assert!((track.sample_at(0.0, 0) - 0.2).abs() < 1e-3);
        assert!((track.duration() - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_render_samples_length() {
        let track = ramp_track().with_duration(1.5);
        let rendered = track.render_samples();
        assert_eq!(rendered.len(), 1500);
        // The padded tail is silent
        assert_eq!(rendered[1400], 0.0);
        assert!((rendered[500] - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_render_samples_interleaves_channels() {
        let samples = vec![0.1, -0.1, 0.2, -0.2];
        let track = AudioTrack::from_samples(samples, 2, 2);
        let rendered = track.render_samples();
        assert_eq!(rendered.len(), 4);
        assert!((rendered[0] - 0.1).abs() < 1e-6);
        assert!((rendered[1] + 0.1).abs() < 1e-6);
    }
}
