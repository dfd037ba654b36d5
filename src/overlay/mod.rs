//! # Overlay Compositor
//!
//! Renders a text caption as a short-lived RGBA layer and merges it with a
//! base clip via alpha compositing for the caption's active time window.

pub mod font;
mod text;

pub use font::FontFamily;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clip::Clip;
use crate::config::FontConfig;
use crate::error::{OverlayError, Result};

/// Fraction of the base frame width a caption may occupy
const MAX_WIDTH_FRACTION: f64 = 0.8;

/// Margin between the caption and the frame edge, as a fraction of height
const MARGIN_FRACTION: f64 = 0.04;

/// Where the caption layer is pinned inside the base frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Anchor {
    Top,
    Center,
    #[default]
    Bottom,
    Left,
    Right,
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Anchor::Top => "top",
            Anchor::Center => "center",
            Anchor::Bottom => "bottom",
            Anchor::Left => "left",
            Anchor::Right => "right",
        };
        f.write_str(name)
    }
}

impl FromStr for Anchor {
    type Err = OverlayError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "top" => Ok(Anchor::Top),
            "center" => Ok(Anchor::Center),
            "bottom" => Ok(Anchor::Bottom),
            "left" => Ok(Anchor::Left),
            "right" => Ok(Anchor::Right),
            other => Err(OverlayError::UnknownAnchor {
                name: other.to_string(),
            }),
        }
    }
}

/// An RGB color, parsed from and serialized as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RgbColor(pub [u8; 3]);

impl Default for RgbColor {
    fn default() -> Self {
        RgbColor([255, 255, 255])
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0[0], self.0[1], self.0[2])
    }
}

impl FromStr for RgbColor {
    type Err = OverlayError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(OverlayError::InvalidColor {
                value: s.to_string(),
            });
        }

        let parse = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16);
        match (parse(0..2), parse(2..4), parse(4..6)) {
            (Ok(r), Ok(g), Ok(b)) => Ok(RgbColor([r, g, b])),
            _ => Err(OverlayError::InvalidColor {
                value: s.to_string(),
            }),
        }
    }
}

impl Serialize for RgbColor {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for RgbColor {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Configuration for one text caption.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextOverlaySpec {
    /// The caption text
    pub content: String,

    /// Named font choice, resolved against the system font directories
    #[serde(default)]
    pub font: FontFamily,

    /// Font size in pixels (10-100)
    #[serde(default = "default_font_size")]
    pub size_px: u32,

    /// Text color
    #[serde(default)]
    pub color: RgbColor,

    /// Position of the caption inside the frame
    #[serde(default)]
    pub anchor: Anchor,

    /// Active time window in clip-local seconds; `None` means the caption
    /// spans the whole clip
    #[serde(default)]
    pub window: Option<(f64, f64)>,
}

fn default_font_size() -> u32 {
    50
}

impl TextOverlaySpec {
    /// A spec with defaults for everything but the text
    pub fn new<S: Into<String>>(content: S) -> Self {
        Self {
            content: content.into(),
            font: FontFamily::default(),
            size_px: default_font_size(),
            color: RgbColor::default(),
            anchor: Anchor::default(),
            window: None,
        }
    }

    /// Check the spec against the allowed parameter domain.
    pub fn validate(&self) -> Result<()> {
        if self.content.trim().is_empty() {
            return Err(OverlayError::EmptyText.into());
        }

        if !(10..=100).contains(&self.size_px) {
            return Err(OverlayError::InvalidFontSize { size: self.size_px }.into());
        }

        if let Some((start, end)) = self.window {
            if !start.is_finite() || !end.is_finite() || start < 0.0 || end <= start {
                return Err(OverlayError::InvalidWindow { start, end }.into());
            }
        }

        Ok(())
    }

    /// The active window clipped against the host clip's duration.
    fn resolved_window(&self, host_duration: f64) -> (f64, f64) {
        match self.window {
            Some((start, end)) => (start, end.min(host_duration)),
            None => (0.0, host_duration),
        }
    }
}

/// Composite a text caption over `clip`.
///
/// The caption is rasterized once, word-wrapped to at most 80% of the frame
/// width; inside the active window each produced frame gets the layer
/// painted at the anchor position, outside it frames pass through untouched.
pub fn overlay_text(clip: &Clip, spec: &TextOverlaySpec, fonts: &FontConfig) -> Result<Clip> {
    spec.validate()?;

    let font = font::load(spec.font, fonts)?;
    let max_width = ((clip.width() as f64) * MAX_WIDTH_FRACTION).round().max(1.0) as u32;
    let layer = text::rasterize_caption(&font, &spec.content, spec.size_px as f32, spec.color.0, max_width);

    let (start, end) = spec.resolved_window(clip.duration());
    debug!(
        "Caption {:?} ({}x{}) anchored {} for [{:.2}s, {:.2}s)",
        spec.content,
        layer.width(),
        layer.height(),
        spec.anchor,
        start,
        end
    );

    Ok(composite_layer(clip, layer, spec.anchor, start, end))
}

/// Wrap `clip` so the RGBA layer is painted over frames inside `[start, end)`.
pub(crate) fn composite_layer(clip: &Clip, layer: RgbaImage, anchor: Anchor, start: f64, end: f64) -> Clip {
    let (x, y) = layer_origin(anchor, clip.width(), clip.height(), layer.width(), layer.height());
    let layer = Arc::new(layer);
    let inner = clip.clone();
    let audio = clip.audio().cloned();

    clip.wrapped(clip.duration(), audio, move |t| {
        let mut frame = inner.frame_at(t)?;
        if t >= start && t < end {
            frame.composite_rgba_over(&layer, x, y);
        }
        Ok(frame)
    })
}

/// Top-left corner of the layer inside the frame for an anchor position.
fn layer_origin(anchor: Anchor, frame_w: u32, frame_h: u32, layer_w: u32, layer_h: u32) -> (i64, i64) {
    let (fw, fh) = (frame_w as i64, frame_h as i64);
    let (lw, lh) = (layer_w as i64, layer_h as i64);
    let margin = ((frame_h as f64) * MARGIN_FRACTION).round() as i64;

    let center_x = (fw - lw) / 2;
    let center_y = (fh - lh) / 2;

    match anchor {
        Anchor::Top => (center_x, margin),
        Anchor::Center => (center_x, center_y),
        Anchor::Bottom => (center_x, fh - lh - margin),
        Anchor::Left => (margin, center_y),
        Anchor::Right => (fw - lw - margin, center_y),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::Frame;
    use image::Rgba;

    fn base_clip() -> Clip {
        Clip::from_frame_fn(4.0, 20, 10, 30.0, |_| Ok(Frame::new_filled(20, 10, [0, 0, 50]))).unwrap()
    }

    fn red_layer(w: u32, h: u32) -> RgbaImage {
        let mut layer = RgbaImage::new(w, h);
        for px in layer.pixels_mut() {
            *px = Rgba([255, 0, 0, 255]);
        }
        layer
    }

    #[test]
    fn test_parse_anchor_and_color() {
        assert_eq!("Bottom".parse::<Anchor>().unwrap(), Anchor::Bottom);
        assert!(matches!(
            "nowhere".parse::<Anchor>(),
            Err(OverlayError::UnknownAnchor { .. })
        ));

        assert_eq!("#ff8000".parse::<RgbColor>().unwrap(), RgbColor([255, 128, 0]));
        assert_eq!("FFFFFF".parse::<RgbColor>().unwrap(), RgbColor([255, 255, 255]));
        assert!("#ff80".parse::<RgbColor>().is_err());
        assert!("#gggggg".parse::<RgbColor>().is_err());
    }

    #[test]
    fn test_color_display_roundtrip() {
        let color = RgbColor([18, 52, 86]);
        assert_eq!(color.to_string(), "#123456");
        assert_eq!(color.to_string().parse::<RgbColor>().unwrap(), color);
    }

    #[test]
    fn test_spec_validation() {
        assert!(TextOverlaySpec::new("Hello").validate().is_ok());

        let mut spec = TextOverlaySpec::new("   ");
        assert!(matches!(
            spec.validate().unwrap_err(),
            crate::error::EditError::Overlay(OverlayError::EmptyText)
        ));

        spec = TextOverlaySpec::new("Hello");
        spec.size_px = 101;
        assert!(matches!(
            spec.validate().unwrap_err(),
            crate::error::EditError::Overlay(OverlayError::InvalidFontSize { size: 101 })
        ));

        spec = TextOverlaySpec::new("Hello");
        spec.size_px = 9;
        assert!(spec.validate().is_err());

        spec = TextOverlaySpec::new("Hello");
        spec.window = Some((2.0, 1.0));
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_outside_window_frames_are_untouched() {
        let clip = base_clip();
        let overlaid = composite_layer(&clip, red_layer(4, 2), Anchor::Center, 1.0, 2.0);

        assert_eq!(overlaid.frame_at(0.5).unwrap(), clip.frame_at(0.5).unwrap());
        assert_eq!(overlaid.frame_at(3.0).unwrap(), clip.frame_at(3.0).unwrap());
        assert_ne!(overlaid.frame_at(1.5).unwrap(), clip.frame_at(1.5).unwrap());
    }

    #[test]
    fn test_layer_painted_at_center() {
        let clip = base_clip();
        let overlaid = composite_layer(&clip, red_layer(4, 2), Anchor::Center, 0.0, 4.0);

        let frame = overlaid.frame_at(1.0).unwrap();
        assert_eq!(frame.get_pixel(10, 5), [255, 0, 0]);
        assert_eq!(frame.get_pixel(0, 0), [0, 0, 50]);
    }

    #[test]
    fn test_layer_origin_anchors() {
        // 100x50 frame, 20x10 layer, margin = 2
        assert_eq!(layer_origin(Anchor::Top, 100, 50, 20, 10), (40, 2));
        assert_eq!(layer_origin(Anchor::Bottom, 100, 50, 20, 10), (40, 38));
        assert_eq!(layer_origin(Anchor::Center, 100, 50, 20, 10), (40, 20));
        assert_eq!(layer_origin(Anchor::Left, 100, 50, 20, 10), (2, 20));
        assert_eq!(layer_origin(Anchor::Right, 100, 50, 20, 10), (78, 20));
    }

    #[test]
    fn test_window_end_clamps_to_clip_duration() {
        let spec = TextOverlaySpec {
            window: Some((1.0, 99.0)),
            ..TextOverlaySpec::new("Hi")
        };
        assert_eq!(spec.resolved_window(4.0), (1.0, 4.0));

        let full = TextOverlaySpec::new("Hi");
        assert_eq!(full.resolved_window(4.0), (0.0, 4.0));
    }

    #[test]
    fn test_overlay_keeps_audio() {
        use crate::audio::AudioTrack;

        let clip = base_clip().with_audio(Some(AudioTrack::from_samples(vec![0.5; 100], 100, 1)));
        let overlaid = composite_layer(&clip, red_layer(2, 2), Anchor::Bottom, 0.0, 4.0);
        assert!(overlaid.has_audio());
    }
}
