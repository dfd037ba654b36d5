use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};

use tracing::{debug, warn};

use crate::audio::AudioTrack;
use crate::error::{Result, EditError};

static SESSION_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Scratch directory for one render, removed when the session is dropped.
///
/// Cleanup runs on every exit path (success, error, cancellation) because it
/// hangs off `Drop`, and each removal is guarded independently so one
/// failure cannot suppress the rest.
pub(crate) struct RenderSession {
    dir: PathBuf,
}

impl RenderSession {
    pub fn create() -> Result<Self> {
        let seq = SESSION_COUNTER.fetch_add(1, Ordering::Relaxed);
        let dir = std::env::temp_dir().join(format!("clipforge-{}-{}", std::process::id(), seq));
        std::fs::create_dir_all(&dir)?;
        debug!("Render session scratch dir: {}", dir.display());
        Ok(Self { dir })
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    #[cfg(test)]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Materialize an audio track as a 16-bit PCM WAV for the muxer.
    pub fn write_wav(&self, track: &AudioTrack) -> Result<PathBuf> {
        let path = self.path("soundtrack.wav");
        let spec = hound::WavSpec {
            channels: track.channels(),
            sample_rate: track.sample_rate(),
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let write_failed = |path: &Path| {
            EditError::Render(crate::error::RenderError::OutputFailed {
                path: path.display().to_string(),
            })
        };

        let mut writer = hound::WavWriter::create(&path, spec).map_err(|_| write_failed(&path))?;
        for sample in track.render_samples() {
            let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            writer.write_sample(value).map_err(|_| write_failed(&path))?;
        }
        writer.finalize().map_err(|_| write_failed(&path))?;

        debug!(
            "Wrote soundtrack: {:.2}s @ {} Hz x{}",
            track.duration(),
            track.sample_rate(),
            track.channels()
        );
        Ok(path)
    }
}

impl Drop for RenderSession {
    fn drop(&mut self) {
        if let Ok(entries) = std::fs::read_dir(&self.dir) {
            for entry in entries.flatten() {
                if let Err(e) = std::fs::remove_file(entry.path()) {
                    warn!("Failed to remove {}: {}", entry.path().display(), e);
                }
            }
        }
        if let Err(e) = std::fs::remove_dir(&self.dir) {
            warn!("Failed to remove session dir {}: {}", self.dir.display(), e);
        }
    }
}
