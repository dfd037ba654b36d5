use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{ChildStdin, Command, Stdio};

use tokio::task;
use tracing::{debug, info, warn};

use crate::clip::Clip;
use crate::config::EncodeConfig;
use crate::error::{RenderError, Result};
use crate::render::session::RenderSession;
use crate::render::CancelToken;

/// Summary of a completed render
#[derive(Debug, Clone)]
pub struct EncodedVideo {
    pub path: PathBuf,
    pub duration: f64,
    pub frame_count: u64,
    pub file_size: u64,
}

/// Encodes a composed clip into an output container.
///
/// Frames are pulled lazily in strictly increasing time order and streamed
/// as raw RGB24 into an `ffmpeg` child; bound audio is pre-rendered to a
/// scratch WAV and muxed as a second input. Only the encoder parallelizes
/// (`-threads`); frame production stays sequential and ordered, and with one
/// thread the output is deterministic for deterministic clips.
pub struct Renderer {
    encode: EncodeConfig,
}

impl Renderer {
    pub fn new(encode: EncodeConfig) -> Self {
        Self { encode }
    }

    pub fn check_ffmpeg_available() -> bool {
        Command::new("ffmpeg")
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    /// Render `clip` to `output`.
    ///
    /// On any failure or cancellation the partial output file is removed;
    /// an incomplete render is never left looking complete.
    pub async fn render(&self, clip: &Clip, output: &Path, cancel: &CancelToken) -> Result<EncodedVideo> {
        let clip = clip.clone();
        let encode = self.encode.clone();
        let output = output.to_path_buf();
        let cancel = cancel.clone();

        task::spawn_blocking(move || encode_blocking(clip, encode, output, cancel))
            .await
            .map_err(|e| RenderError::EncodingFailed {
                reason: format!("encoder task failed: {e}"),
            })?
    }
}

fn encode_blocking(clip: Clip, encode: EncodeConfig, output: PathBuf, cancel: CancelToken) -> Result<EncodedVideo> {
    if !Renderer::check_ffmpeg_available() {
        return Err(RenderError::EncoderUnavailable.into());
    }

    let session = RenderSession::create()?;
    let wav = match clip.audio() {
        Some(track) => Some(session.write_wav(track)?),
        None => None,
    };

    let args = build_args(&clip, &encode, wav.as_deref(), &output);
    debug!("Spawning encoder: ffmpeg {}", args.join(" "));

    let mut child = Command::new("ffmpeg")
        .args(&args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|_| RenderError::EncoderUnavailable)?;

    let stdin = child.stdin.take().ok_or_else(|| RenderError::EncodingFailed {
        reason: "failed to open encoder stdin".to_string(),
    })?;

    let frame_count = clip.frame_count();
    info!(
        "Encoding {} frames ({}x{} @ {:.2} fps, {:.2}s{})",
        frame_count,
        clip.width(),
        clip.height(),
        clip.fps(),
        clip.duration(),
        if wav.is_some() { ", with audio" } else { "" }
    );

    let streamed = stream_frames(&clip, stdin, &cancel);
    if streamed.is_err() {
        // Stop the encoder before reaping so a stuck pipe cannot stall us
        let _ = child.kill();
    }

    let child_output = child.wait_with_output().map_err(|e| RenderError::EncodingFailed {
        reason: format!("failed to reap encoder: {e}"),
    })?;

    if let Err(e) = streamed {
        discard_output(&output);
        return Err(e);
    }

    if !child_output.status.success() {
        discard_output(&output);
        let stderr = String::from_utf8_lossy(&child_output.stderr);
        return Err(RenderError::EncodingFailed {
            reason: stderr.trim().to_string(),
        }
        .into());
    }

    let file_size = std::fs::metadata(&output)
        .map_err(|_| RenderError::OutputFailed {
            path: output.display().to_string(),
        })?
        .len();

    info!(
        "Render complete: {} ({:.1} MB)",
        output.display(),
        file_size as f64 / 1024.0 / 1024.0
    );

    Ok(EncodedVideo {
        path: output,
        duration: clip.duration(),
        frame_count,
        file_size,
    })
}

/// Pull every frame in order and stream it into the encoder's stdin.
///
/// Checks the cancellation token between pulls. Dropping `stdin` at the end
/// (on success and on error alike) signals EOF to the encoder.
fn stream_frames(clip: &Clip, mut stdin: ChildStdin, cancel: &CancelToken) -> Result<()> {
    let interval = clip.frame_interval();

    for index in 0..clip.frame_count() {
        if cancel.is_cancelled() {
            info!("Render cancelled at frame {}", index);
            return Err(RenderError::Cancelled.into());
        }

        let frame = clip.frame_at(index as f64 * interval)?;
        stdin.write_all(frame.as_raw()).map_err(|e| RenderError::EncodingFailed {
            reason: format!("encoder rejected frame {index}: {e}"),
        })?;
    }

    Ok(())
}

fn build_args(clip: &Clip, encode: &EncodeConfig, wav: Option<&Path>, output: &Path) -> Vec<String> {
    // Quiet stderr (errors only, no progress spam) so the pipe cannot fill
    // up and stall the frame writer while we are not draining it
    let mut args = vec![
        "-y".to_string(),
        "-v".to_string(),
        "error".to_string(),
        "-nostats".to_string(),
        "-f".to_string(),
        "rawvideo".to_string(),
        "-pix_fmt".to_string(),
        "rgb24".to_string(),
        "-s".to_string(),
        format!("{}x{}", clip.width(), clip.height()),
        "-r".to_string(),
        clip.fps().to_string(),
        "-i".to_string(),
        "-".to_string(),
    ];

    if let Some(wav) = wav {
        args.extend(["-i".to_string(), wav.display().to_string()]);
    }

    args.extend([
        "-c:v".to_string(),
        encode.video_codec.clone(),
        "-crf".to_string(),
        encode.crf().to_string(),
        "-pix_fmt".to_string(),
        "yuv420p".to_string(),
        "-movflags".to_string(),
        "+faststart".to_string(),
    ]);

    if wav.is_some() {
        args.extend([
            "-c:a".to_string(),
            encode.audio_codec.clone(),
            "-shortest".to_string(),
        ]);
    }

    args.extend(["-threads".to_string(), encode.threads.to_string()]);
    args.push(output.display().to_string());
    args
}

/// Best-effort removal of a partial output file.
fn discard_output(path: &Path) {
    if path.exists() {
        if let Err(e) = std::fs::remove_file(path) {
            warn!("Failed to remove partial output {}: {}", path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioTrack;
    use crate::clip::Frame;

    fn tiny_clip(duration: f64) -> Clip {
        Clip::from_frame_fn(duration, 16, 16, 10.0, |t| {
            Ok(Frame::new_filled(16, 16, [(t * 80.0) as u8, 64, 128]))
        })
        .unwrap()
    }

    #[test]
    fn test_build_args_video_only() {
        let clip = tiny_clip(1.0);
        let encode = EncodeConfig {
            threads: 2,
            ..EncodeConfig::default()
        };
        let args = build_args(&clip, &encode, None, Path::new("out.mp4"));

        let joined = args.join(" ");
        assert!(joined.contains("-f rawvideo"));
        assert!(joined.contains("-s 16x16"));
        assert!(joined.contains("-c:v libx264"));
        assert!(joined.contains("-threads 2"));
        assert!(!joined.contains("-c:a"));
        assert_eq!(args.last().unwrap(), "out.mp4");
    }

    #[test]
    fn test_build_args_with_audio() {
        let clip = tiny_clip(1.0);
        let encode = EncodeConfig::default();
        let args = build_args(&clip, &encode, Some(Path::new("/tmp/sound.wav")), Path::new("out.mp4"));

        let joined = args.join(" ");
        assert!(joined.contains("-i /tmp/sound.wav"));
        assert!(joined.contains("-c:a aac"));
        assert!(joined.contains("-shortest"));
    }

    #[tokio::test]
    async fn test_render_small_clip() {
        if !Renderer::check_ffmpeg_available() {
            eprintln!("ffmpeg not available, skipping");
            return;
        }

        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.mp4");
        let clip = tiny_clip(0.5);

        let renderer = Renderer::new(EncodeConfig {
            threads: 1,
            ..EncodeConfig::default()
        });
        let encoded = renderer.render(&clip, &output, &CancelToken::new()).await.unwrap();

        assert!(output.exists());
        assert_eq!(encoded.frame_count, 5);
        assert!(encoded.file_size > 0);
    }

    #[tokio::test]
    async fn test_render_with_audio_track() {
        if !Renderer::check_ffmpeg_available() {
            eprintln!("ffmpeg not available, skipping");
            return;
        }

        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.mp4");

        let samples: Vec<f32> = (0..22050).map(|i| (i as f32 * 0.05).sin() * 0.3).collect();
        let clip = tiny_clip(0.5).with_audio(Some(
            AudioTrack::from_samples(samples, 44100, 1).with_duration(0.5),
        ));

        let renderer = Renderer::new(EncodeConfig::default());
        let encoded = renderer.render(&clip, &output, &CancelToken::new()).await.unwrap();
        assert!(encoded.file_size > 0);
    }

    #[tokio::test]
    async fn test_cancelled_render_leaves_no_output() {
        if !Renderer::check_ffmpeg_available() {
            eprintln!("ffmpeg not available, skipping");
            return;
        }

        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.mp4");

        let cancel = CancelToken::new();
        cancel.cancel();

        let renderer = Renderer::new(EncodeConfig::default());
        let err = renderer
            .render(&tiny_clip(1.0), &output, &cancel)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            crate::error::EditError::Render(RenderError::Cancelled)
        ));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_frame_error_discards_partial_output() {
        if !Renderer::check_ffmpeg_available() {
            eprintln!("ffmpeg not available, skipping");
            return;
        }

        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.mp4");

        let failing = Clip::from_frame_fn(1.0, 16, 16, 10.0, |t| {
            if t > 0.4 {
                Err(crate::error::MediaError::FrameDecodeFailed {
                    path: "synthetic".to_string(),
                    timestamp: t,
                }
                .into())
            } else {
                Ok(Frame::new_black(16, 16))
            }
        })
        .unwrap();

        let renderer = Renderer::new(EncodeConfig::default());
        assert!(renderer.render(&failing, &output, &CancelToken::new()).await.is_err());
        assert!(!output.exists());
    }
}
