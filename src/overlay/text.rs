use fontdue::layout::{CoordinateSystem, HorizontalAlign, Layout, LayoutSettings, TextStyle, WrapStyle};
use fontdue::Font;
use image::{Rgba, RgbaImage};

/// Rasterize `text` into an RGBA layer, word-wrapped to `max_width` pixels
/// with caption-style centered lines.
///
/// Glyph coverage becomes the alpha channel; everything else stays fully
/// transparent, so the layer composites cleanly over any base frame.
pub(crate) fn rasterize_caption(font: &Font, text: &str, size_px: f32, color: [u8; 3], max_width: u32) -> RgbaImage {
    let mut layout = Layout::new(CoordinateSystem::PositiveYDown);
    layout.reset(&LayoutSettings {
        max_width: Some(max_width as f32),
        horizontal_align: HorizontalAlign::Center,
        wrap_style: WrapStyle::Word,
        ..LayoutSettings::default()
    });
    layout.append(&[font], &TextStyle::new(text, size_px, 0));

    let height = layout.height().ceil().max(1.0) as u32;
    let mut layer = RgbaImage::new(max_width.max(1), height);

    let [r, g, b] = color;
    for glyph in layout.glyphs() {
        if glyph.width == 0 || glyph.height == 0 {
            continue;
        }

        let (metrics, bitmap) = font.rasterize_config(glyph.key);
        let origin_x = glyph.x.round() as i64;
        let origin_y = glyph.y.round() as i64;

        for gy in 0..metrics.height {
            for gx in 0..metrics.width {
                let coverage = bitmap[gy * metrics.width + gx];
                if coverage == 0 {
                    continue;
                }

                let px = origin_x + gx as i64;
                let py = origin_y + gy as i64;
                if px < 0 || px >= layer.width() as i64 || py < 0 || py >= layer.height() as i64 {
                    continue;
                }

                let dst = layer.get_pixel_mut(px as u32, py as u32);
                // Overlapping glyph boxes keep the strongest coverage
                *dst = Rgba([r, g, b, dst[3].max(coverage)]);
            }
        }
    }

    layer
}
