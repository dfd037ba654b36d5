use std::path::Path;

use tracing::{debug, info};

use crate::audio;
use crate::clip::Clip;
use crate::config::Config;
use crate::error::{PlanError, Result};
use crate::filter::{self, FilterKind};
use crate::overlay;
use crate::plan::EditPlan;
use crate::render::{CancelToken, EncodedVideo, Renderer};

/// Runs one edit request end to end.
///
/// The pipeline threads a clip through trim, filter, speed, overlay and
/// audio stages in that order — each stage returning a new clip, none
/// mutating its input — and hands the final clip to the renderer. All edit
/// parameters come from the [`EditPlan`]; the pipeline holds no state across
/// requests.
pub struct EditPipeline {
    config: Config,
}

impl EditPipeline {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(Config::default())
    }

    /// Execute `plan` against `source` and render the result to `output`.
    ///
    /// The plan and configuration are validated before any media is opened;
    /// a misconfigured request never reaches the decoder.
    pub async fn run(
        &self,
        source: &Path,
        audio_source: Option<&Path>,
        plan: &EditPlan,
        output: &Path,
        cancel: &CancelToken,
    ) -> Result<EncodedVideo> {
        info!("Starting edit: {} -> {}", source.display(), output.display());

        plan.validate(audio_source.is_some())?;
        self.config.validate()?;

        let clip = Clip::open(source)?;
        info!(
            "Loaded source: {:.2}s, {}x{} @ {:.2} fps{}",
            clip.duration(),
            clip.width(),
            clip.height(),
            clip.fps(),
            if clip.has_audio() { ", with audio" } else { "" }
        );

        let clip = self.compose(clip, audio_source, plan)?;
        info!(
            "Composed clip: {:.2}s, {} frames",
            clip.duration(),
            clip.frame_count()
        );

        let renderer = Renderer::new(self.config.encode.clone());
        let encoded = renderer.render(&clip, output, cancel).await?;

        info!(
            "Edit complete: {} ({:.2}s, {} frames)",
            encoded.path.display(),
            encoded.duration,
            encoded.frame_count
        );
        Ok(encoded)
    }

    /// Apply the plan's transformation stages to an already-open clip.
    ///
    /// Exposed separately so callers can compose synthetic clips without
    /// touching the filesystem or the encoder.
    pub fn compose(&self, clip: Clip, audio_source: Option<&Path>, plan: &EditPlan) -> Result<Clip> {
        let mut clip = clip;

        if let Some(range) = &plan.trim {
            debug!("Trim: [{:.2}s, {:.2}s]", range.start, range.end);
            clip = clip.trim(range.start, range.end)?;
        }

        if plan.filter != FilterKind::None {
            debug!("Filter: {}", plan.filter);
            clip = filter::apply(&clip, plan.filter);
        }

        if plan.speed != 1.0 {
            debug!("Speed: {:.2}x", plan.speed);
            clip = clip.speed(plan.speed)?;
        }

        if let Some(spec) = &plan.overlay {
            debug!("Overlay: {:?} at {}", spec.content, spec.anchor);
            clip = overlay::overlay_text(&clip, spec, &self.config.fonts)?;
        }

        if let Some(mix) = &plan.audio {
            if mix.enabled {
                let source = audio_source.ok_or(PlanError::MissingAudioSource)?;
                debug!("Audio mix: {} at volume {:.2}", source.display(), mix.volume);
                clip = audio::mix_audio(&clip, source, mix.volume)?;
            }
        }

        Ok(clip)
    }
}
