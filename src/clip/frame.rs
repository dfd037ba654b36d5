use image::{ImageBuffer, Rgb, RgbImage, RgbaImage};

/// A single video frame.
///
/// Thin wrapper around an RGB image buffer with the accessors the filter
/// engine and overlay compositor need.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    buffer: RgbImage,
}

impl Frame {
    /// Create a new frame from an RGB image buffer
    pub fn new(buffer: RgbImage) -> Self {
        Self { buffer }
    }

    /// Create a new frame with the given dimensions filled with black
    pub fn new_black(width: u32, height: u32) -> Self {
        let buffer = ImageBuffer::new(width, height);
        Self { buffer }
    }

    /// Create a new frame with the given dimensions filled with the specified color
    pub fn new_filled(width: u32, height: u32, color: [u8; 3]) -> Self {
        let buffer = ImageBuffer::from_fn(width, height, |_, _| Rgb(color));
        Self { buffer }
    }

    /// Get the width of the frame
    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    /// Get the height of the frame
    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    /// Get a pixel at the given coordinates (returns RGB array)
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let pixel = self.buffer.get_pixel(x, y);
        [pixel[0], pixel[1], pixel[2]]
    }

    /// Set a pixel at the given coordinates
    pub fn set_pixel(&mut self, x: u32, y: u32, color: [u8; 3]) {
        self.buffer.put_pixel(x, y, Rgb(color));
    }

    /// Raw interleaved RGB bytes, row-major
    pub fn as_raw(&self) -> &[u8] {
        self.buffer.as_raw()
    }

    /// Mutable raw interleaved RGB bytes, row-major
    pub fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.buffer
    }

    /// Get the underlying image buffer
    pub fn as_image(&self) -> &RgbImage {
        &self.buffer
    }

    /// Create a frame from raw RGB bytes
    pub fn from_rgb_bytes(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        ImageBuffer::from_raw(width, height, data).map(|buffer| Self { buffer })
    }

    /// Save the frame as a PNG file
    pub fn save_png<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), image::ImageError> {
        self.buffer.save(path)
    }

    /// Paint an RGBA layer over this frame with `out = base*(1-a) + layer*a`.
    ///
    /// `(x, y)` is the layer's top-left corner in frame coordinates and may
    /// lie outside the frame; out-of-bounds layer pixels are skipped.
    pub fn composite_rgba_over(&mut self, layer: &RgbaImage, x: i64, y: i64) {
        let fw = self.width() as i64;
        let fh = self.height() as i64;

        for (lx, ly, px) in layer.enumerate_pixels() {
            let alpha = px[3];
            if alpha == 0 {
                continue;
            }

            let fx = x + lx as i64;
            let fy = y + ly as i64;
            if fx < 0 || fx >= fw || fy < 0 || fy >= fh {
                continue;
            }

            let base = self.buffer.get_pixel_mut(fx as u32, fy as u32);
            let a = alpha as u16;
            for c in 0..3 {
                let blended = (base[c] as u16 * (255 - a) + px[c] as u16 * a) / 255;
                base[c] = blended as u8;
            }
        }
    }
}
