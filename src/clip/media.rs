//! Opening real media files as clips.
//!
//! Container probing and frame decoding go through the external `ffprobe` /
//! `ffmpeg` executables. Each frame request spawns, reads, and reaps its own
//! short-lived decoder process, so a clip never holds an open handle between
//! pulls and memory stays at one frame in flight.

use std::path::Path;
use std::process::Command;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::audio::{self, AudioTrack};
use crate::clip::{Clip, Frame};
use crate::error::{MediaError, Result};

/// Probed stream metadata for a video container
#[derive(Debug, Clone)]
pub struct MediaInfo {
    pub duration: f64,
    pub fps: f64,
    pub width: u32,
    pub height: u32,
}

/// Duration assigned to a still image opened as a clip (one frame at 30 fps)
const STILL_IMAGE_DURATION: f64 = 1.0 / 30.0;

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv", "webm", "m4v", "mpg", "mpeg"];
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

impl Clip {
    /// Open a media file as a lazily-decoded clip.
    ///
    /// Video containers (mp4/avi/mov/mkv family) are probed with `ffprobe`
    /// and decoded frame-by-frame on demand; the file's own audio stream is
    /// bound when it can be decoded. Still images open as single-frame
    /// clips.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Clip> {
        let path = path.as_ref();
        let ext = extension_of(path);

        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            return open_image(path);
        }

        if !VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            return Err(MediaError::UnsupportedFormat { format: ext }.into());
        }

        let info = probe(path)?;
        debug!(
            "Probed {}: {:.2}s, {}x{} @ {:.2} fps",
            path.display(),
            info.duration,
            info.width,
            info.height,
            info.fps
        );

        let audio = match audio::load(path) {
            Ok(data) => Some(AudioTrack::new(Arc::new(data)).with_duration(info.duration)),
            Err(e) => {
                debug!("No decodable audio stream in {}: {}", path.display(), e);
                None
            }
        };

        let frame_path = path.to_path_buf();
        let (w, h) = (info.width, info.height);
        let clip = Clip::from_frame_fn(info.duration, info.width, info.height, info.fps, move |t| {
            extract_frame(&frame_path, t, w, h)
        })?;
        Ok(clip.with_audio(audio))
    }
}

fn open_image(path: &Path) -> Result<Clip> {
    let decoded = image::open(path).map_err(|_| MediaError::Unreadable {
        path: path.display().to_string(),
    })?;
    let rgb = decoded.to_rgb8();
    let (width, height) = rgb.dimensions();
    let frame = Frame::new(rgb);

    Clip::from_frame_fn(STILL_IMAGE_DURATION, width, height, 30.0, move |_| Ok(frame.clone()))
}

/// Probe a video container for duration, dimensions and frame rate.
pub fn probe(path: &Path) -> Result<MediaInfo> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height,avg_frame_rate:format=duration",
            "-of",
            "csv=p=0",
            &path.display().to_string(),
        ])
        .output()
        .map_err(|_| MediaError::Unreadable {
            path: path.display().to_string(),
        })?;

    if !output.status.success() {
        return Err(MediaError::Unreadable {
            path: path.display().to_string(),
        }
        .into());
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_probe_output(&stdout).ok_or_else(|| {
        MediaError::InvalidMetadata {
            path: path.display().to_string(),
            details: stdout.trim().to_string(),
        }
        .into()
    })
}

/// Parse ffprobe csv output: one `width,height,avg_frame_rate` stream line
/// followed by one `duration` format line.
fn parse_probe_output(stdout: &str) -> Option<MediaInfo> {
    let mut lines = stdout.lines().filter(|l| !l.trim().is_empty());

    let stream_line = lines.next()?;
    let parts: Vec<&str> = stream_line.trim().split(',').collect();
    if parts.len() < 3 {
        return None;
    }

    let width: u32 = parts[0].parse().ok()?;
    let height: u32 = parts[1].parse().ok()?;
    let fps = parse_frame_rate(parts[2])?;

    let duration: f64 = lines.next()?.trim().parse().ok()?;

    if width == 0 || height == 0 || !(duration > 0.0) || !(fps > 0.0) {
        return None;
    }

    Some(MediaInfo {
        duration,
        fps,
        width,
        height,
    })
}

/// Parse an ffprobe rate like "30/1" or "30000/1001"
fn parse_frame_rate(rate: &str) -> Option<f64> {
    let mut parts = rate.trim().split('/');
    let num: f64 = parts.next()?.parse().ok()?;
    let den: f64 = match parts.next() {
        Some(d) => d.parse().ok()?,
        None => 1.0,
    };
    if den == 0.0 || !(num > 0.0) {
        return None;
    }
    Some(num / den)
}

/// Decode the single frame nearest `t` as raw RGB24 via a one-shot ffmpeg
/// child process.
fn extract_frame(path: &Path, t: f64, width: u32, height: u32) -> Result<Frame> {
    let output = Command::new("ffmpeg")
        .args([
            "-v",
            "error",
            "-ss",
            &format!("{t:.6}"),
            "-i",
            &path.display().to_string(),
            "-frames:v",
            "1",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgb24",
            "-",
        ])
        .output()
        .map_err(|_| MediaError::FrameDecodeFailed {
            path: path.display().to_string(),
            timestamp: t,
        })?;

    let expected = (width * height * 3) as usize;
    if !output.status.success() || output.stdout.len() != expected {
        warn!(
            "Frame decode at {:.3}s produced {} of {} expected bytes",
            t,
            output.stdout.len(),
            expected
        );
        return Err(MediaError::FrameDecodeFailed {
            path: path.display().to_string(),
            timestamp: t,
        }
        .into());
    }

    Frame::from_rgb_bytes(width, height, output.stdout).ok_or_else(|| {
        MediaError::FrameDecodeFailed {
            path: path.display().to_string(),
            timestamp: t,
        }
        .into()
    })
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}
