//! # Audio Module
//!
//! Decoding external audio sources and binding them to clips as
//! time-indexed sample tracks.

mod loader;
mod track;

pub use loader::load;
pub use track::{AudioData, AudioTrack};

use std::path::Path;

use tracing::debug;

use crate::clip::Clip;
use crate::error::{AudioError, Result};

/// Replace `clip`'s soundtrack with an external audio source.
///
/// The source is decoded in full, trimmed to `clip.duration()` (sources
/// shorter than the clip are padded with silence), and scaled by `volume`.
/// Any previously bound audio is discarded, not blended.
pub fn mix_audio<P: AsRef<Path>>(clip: &Clip, source: P, volume: f32) -> Result<Clip> {
    if !(volume >= 0.0) || !volume.is_finite() {
        return Err(AudioError::InvalidParameters {
            details: format!("volume must be a non-negative finite gain, got {volume}"),
        }
        .into());
    }

    let data = load(source.as_ref())?;
    debug!(
        "Mixing {}: {:.2}s @ {} Hz x{} onto a {:.2}s clip at volume {:.2}",
        source.as_ref().display(),
        data.duration(),
        data.sample_rate,
        data.channels,
        clip.duration(),
        volume
    );

    let track = AudioTrack::new(std::sync::Arc::new(data))
        .with_duration(clip.duration())
        .scaled(volume);
    Ok(clip.with_audio(Some(track)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::Frame;

    fn silent_clip(duration: f64) -> Clip {
        Clip::from_frame_fn(duration, 4, 4, 30.0, |_| Ok(Frame::new_black(4, 4))).unwrap()
    }

    fn write_test_wav(path: &std::path::Path, seconds: f64) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for _ in 0..(seconds * 8000.0) as usize {
            writer.write_sample(16384i16).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_mix_truncates_long_audio() {
        let dir = tempfile::tempdir().unwrap();
        let wav = dir.path().join("long.wav");
        write_test_wav(&wav, 5.0);

        let clip = silent_clip(2.0);
        let mixed = mix_audio(&clip, &wav, 0.5).unwrap();
        let track = mixed.audio().unwrap();
        assert!((track.duration() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_mix_pads_short_audio_with_silence() {
        let dir = tempfile::tempdir().unwrap();
        let wav = dir.path().join("short.wav");
        write_test_wav(&wav, 1.0);

        let clip = silent_clip(3.0);
        let mixed = mix_audio(&clip, &wav, 1.0).unwrap();
        let track = mixed.audio().unwrap();

        assert!((track.duration() - 3.0).abs() < 1e-9);
        assert!(track.sample_at(0.5, 0).abs() > 0.1);
        // Past the end of the source: silence, not an error
        assert_eq!(track.sample_at(2.5, 0), 0.0);
    }

    #[test]
    fn test_mix_applies_volume() {
        let dir = tempfile::tempdir().unwrap();
        let wav = dir.path().join("tone.wav");
        write_test_wav(&wav, 1.0);

        let clip = silent_clip(1.0);
        let full = mix_audio(&clip, &wav, 1.0).unwrap();
        let half = mix_audio(&clip, &wav, 0.5).unwrap();

        let a = full.audio().unwrap().sample_at(0.25, 0);
        let b = half.audio().unwrap().sample_at(0.25, 0);
        assert!((a * 0.5 - b).abs() < 1e-6);
    }

    #[test]
    fn test_mix_replaces_prior_track() {
        let dir = tempfile::tempdir().unwrap();
        let wav = dir.path().join("tone.wav");
        write_test_wav(&wav, 1.0);

        let clip = silent_clip(1.0)
            .with_audio(Some(AudioTrack::from_samples(vec![0.0; 8000], 8000, 1)));
        let mixed = mix_audio(&clip, &wav, 1.0).unwrap();

        // The silent placeholder track is gone; the tone is audible
        assert!(mixed.audio().unwrap().sample_at(0.25, 0).abs() > 0.1);
    }

    #[test]
    fn test_mix_rejects_negative_volume() {
        let clip = silent_clip(1.0);
        assert!(mix_audio(&clip, "ignored.wav", -0.5).is_err());
    }

    #[test]
    fn test_mix_unreadable_source_fails() {
        let clip = silent_clip(1.0);
        assert!(mix_audio(&clip, "/nonexistent/music.mp3", 0.5).is_err());
    }
}
