//! Core framebuffer for pixel rendering.
//!
//! Provides an aligned RGBA pixel buffer. Every axes and every composed
//! figure draws into one of these.

use crate::color::Rgba;
use crate::error::{Error, Result};

/// Row alignment in bytes (64 bytes for AVX-512).
const SIMD_ALIGNMENT: usize = 64;

/// Aligned RGBA framebuffer.
#[derive(Debug, Clone)]
pub struct Framebuffer {
    /// Width in pixels.
    width: u32,
    /// Height in pixels.
    height: u32,
    /// RGBA pixels in row-major order, 4 bytes per pixel.
    pixels: Vec<u8>,
    /// Stride in bytes (may include padding for alignment).
    stride: usize,
}

impl Framebuffer {
    /// Create a new framebuffer with the given dimensions.
    ///
    /// # Errors
    ///
    /// Returns an error if width or height is zero.
    ///
    /// # Example
    ///
    /// ```
    /// use labelplot::framebuffer::Framebuffer;
    ///
    /// let fb = Framebuffer::new(800, 600).unwrap();
    /// assert_eq!(fb.width(), 800);
    /// assert_eq!(fb.height(), 600);
    /// ```
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }

        let row_bytes = (width as usize) * 4;
        let stride = (row_bytes + SIMD_ALIGNMENT - 1) & !(SIMD_ALIGNMENT - 1);
        let size = stride * (height as usize);

        Ok(Self {
            width,
            height,
            pixels: vec![0; size],
            stride,
        })
    }

    /// Get the width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Get the height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Get the stride (row width in bytes, including any padding).
    #[must_use]
    pub const fn stride(&self) -> usize {
        self.stride
    }

    /// Get a row of pixels as a slice.
    #[must_use]
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        let start = (y as usize) * self.stride;
        let end = start + (self.width as usize) * 4;
        Some(&self.pixels[start..end])
    }

    /// Clear the framebuffer to a solid color.
    pub fn clear(&mut self, color: Rgba) {
        self.fill_rect(0, 0, self.width, self.height, color);
    }

    /// Fill a rectangular region with a solid color.
    ///
    /// Coordinates are clamped to framebuffer bounds.
    pub fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: Rgba) {
        let x1 = x.min(self.width);
        let y1 = y.min(self.height);
        let x2 = x.saturating_add(w).min(self.width);
        let y2 = y.saturating_add(h).min(self.height);

        if x1 >= x2 || y1 >= y2 {
            return;
        }

        let [r, g, b, a] = color.to_array();
        let rect_width = (x2 - x1) as usize;

        for row_y in y1..y2 {
            let row_start = (row_y as usize) * self.stride + (x1 as usize) * 4;
            let row = &mut self.pixels[row_start..row_start + rect_width * 4];

            for chunk in row.chunks_exact_mut(4) {
                chunk[0] = r;
                chunk[1] = g;
                chunk[2] = b;
                chunk[3] = a;
            }
        }
    }

    /// Get the color at a specific pixel coordinate.
    ///
    /// Returns `None` if the coordinates are out of bounds.
    #[must_use]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }

        let idx = self.pixel_index(x, y);
        Some(Rgba::from_array([
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]))
    }

    /// Set the color at a specific pixel coordinate.
    ///
    /// Does nothing if the coordinates are out of bounds.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        if x >= self.width || y >= self.height {
            return;
        }

        let idx = self.pixel_index(x, y);
        let [r, g, b, a] = color.to_array();
        self.pixels[idx] = r;
        self.pixels[idx + 1] = g;
        self.pixels[idx + 2] = b;
        self.pixels[idx + 3] = a;
    }

    /// Blend a color at a specific pixel coordinate using alpha blending.
    ///
    /// Uses the standard "over" compositing operation:
    /// `out = src * src_alpha + dst * dst_alpha * (1 - src_alpha)`
    pub fn blend_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        if x >= self.width || y >= self.height {
            return;
        }

        let idx = self.pixel_index(x, y);
        let src_a = f32::from(color.a) / 255.0;
        let dst_a = f32::from(self.pixels[idx + 3]) / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);

        if out_a > 0.0 {
            let blend = |src: u8, dst: u8| -> u8 {
                let src_f = f32::from(src) / 255.0;
                let dst_f = f32::from(dst) / 255.0;
                let out = (src_f * src_a + dst_f * dst_a * (1.0 - src_a)) / out_a;
                (out * 255.0) as u8
            };

            self.pixels[idx] = blend(color.r, self.pixels[idx]);
            self.pixels[idx + 1] = blend(color.g, self.pixels[idx + 1]);
            self.pixels[idx + 2] = blend(color.b, self.pixels[idx + 2]);
            self.pixels[idx + 3] = (out_a * 255.0) as u8;
        }
    }

    /// Copy another framebuffer into this one with its top-left corner at
    /// `(x, y)`. Pixels falling outside this buffer are dropped.
    pub fn blit(&mut self, src: &Framebuffer, x: u32, y: u32) {
        if x >= self.width || y >= self.height {
            return;
        }

        let copy_w = src.width.min(self.width - x) as usize;
        let copy_h = src.height.min(self.height - y);

        for row_y in 0..copy_h {
            let src_start = (row_y as usize) * src.stride;
            let dst_start = ((y + row_y) as usize) * self.stride + (x as usize) * 4;
            self.pixels[dst_start..dst_start + copy_w * 4]
                .copy_from_slice(&src.pixels[src_start..src_start + copy_w * 4]);
        }
    }

    /// Count pixels inside a region that differ from `background`.
    #[must_use]
    pub fn count_ink(&self, x: u32, y: u32, w: u32, h: u32, background: Rgba) -> usize {
        let mut count = 0;
        for py in y..y.saturating_add(h).min(self.height) {
            for px in x..x.saturating_add(w).min(self.width) {
                if self.get_pixel(px, py) != Some(background) {
                    count += 1;
                }
            }
        }
        count
    }

    #[inline]
    fn pixel_index(&self, x: u32, y: u32) -> usize {
        (y as usize) * self.stride + (x as usize) * 4
    }

    /// Get pixel data as a compact buffer without stride padding.
    ///
    /// PNG expects tightly-packed rows.
    #[must_use]
    pub fn to_compact_pixels(&self) -> Vec<u8> {
        let row_bytes = (self.width as usize) * 4;

        if self.stride == row_bytes {
            return self.pixels[..row_bytes * (self.height as usize)].to_vec();
        }

        let mut compact = Vec::with_capacity(row_bytes * (self.height as usize));
        for y in 0..self.height {
            let start = (y as usize) * self.stride;
            compact.extend_from_slice(&self.pixels[start..start + row_bytes]);
        }
        compact
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_framebuffer() {
        let fb = Framebuffer::new(100, 50).unwrap();
        assert_eq!(fb.width(), 100);
        assert_eq!(fb.height(), 50);
        assert!(fb.stride() >= 400);
    }

    #[test]
    fn test_invalid_dimensions() {
        assert!(Framebuffer::new(0, 100).is_err());
        assert!(Framebuffer::new(100, 0).is_err());
    }

    #[test]
    fn test_clear() {
        let mut fb = Framebuffer::new(10, 10).unwrap();
        fb.clear(Rgba::RED);

        for y in 0..10 {
            for x in 0..10 {
                assert_eq!(fb.get_pixel(x, y), Some(Rgba::RED));
            }
        }
    }

    #[test]
    fn test_fill_rect_clamped() {
        let mut fb = Framebuffer::new(100, 100).unwrap();
        fb.clear(Rgba::WHITE);
        fb.fill_rect(90, 90, 50, 50, Rgba::RED);

        assert_eq!(fb.get_pixel(95, 95), Some(Rgba::RED));
        assert_eq!(fb.get_pixel(85, 85), Some(Rgba::WHITE));
    }

    #[test]
    fn test_blend_pixel() {
        let mut fb = Framebuffer::new(10, 10).unwrap();
        fb.clear(Rgba::WHITE);
        fb.blend_pixel(5, 5, Rgba::new(255, 0, 0, 128));

        let result = fb.get_pixel(5, 5).unwrap();
        assert!(result.r > 200);
        assert!(result.g > 100);
        assert!(result.b > 100);
    }

    #[test]
    fn test_blit_places_source() {
        let mut dst = Framebuffer::new(20, 20).unwrap();
        dst.clear(Rgba::WHITE);
        let mut src = Framebuffer::new(5, 5).unwrap();
        src.clear(Rgba::BLUE);

        dst.blit(&src, 10, 10);

        assert_eq!(dst.get_pixel(10, 10), Some(Rgba::BLUE));
        assert_eq!(dst.get_pixel(14, 14), Some(Rgba::BLUE));
        assert_eq!(dst.get_pixel(15, 15), Some(Rgba::WHITE));
        assert_eq!(dst.get_pixel(9, 9), Some(Rgba::WHITE));
    }

    #[test]
    fn test_blit_clips_at_edge() {
        let mut dst = Framebuffer::new(8, 8).unwrap();
        let mut src = Framebuffer::new(5, 5).unwrap();
        src.clear(Rgba::RED);

        dst.blit(&src, 6, 6);
        assert_eq!(dst.get_pixel(7, 7), Some(Rgba::RED));
        dst.blit(&src, 100, 100);
    }

    #[test]
    fn test_count_ink() {
        let mut fb = Framebuffer::new(10, 10).unwrap();
        fb.clear(Rgba::WHITE);
        fb.fill_rect(2, 2, 2, 3, Rgba::BLACK);

        assert_eq!(fb.count_ink(0, 0, 10, 10, Rgba::WHITE), 6);
        assert_eq!(fb.count_ink(5, 5, 5, 5, Rgba::WHITE), 0);
    }

    #[test]
    fn test_compact_pixels_len() {
        let fb = Framebuffer::new(7, 3).unwrap();
        assert_eq!(fb.to_compact_pixels().len(), 7 * 3 * 4);
    }
}
