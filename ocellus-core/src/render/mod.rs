//! Procedural eye rendering
//!
//! Static textures are warped into elliptical rings, stacked with a pupil
//! disc and a sclera base, and precomputed into animation tables. At run
//! time frames are only selected, cropped and composited.

pub mod cache;
pub mod compose;
pub mod pixel;
pub mod raster;
pub mod ring;
pub mod spinner;
pub mod table;

use crate::error::RenderError;

/// Bytes per RGBA pixel
pub const RGBA: usize = 4;

/// Fully transparent pixel
pub const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

/// Row-major RGBA8 bitmap
///
/// Used for loaded textures, animation frames and composited output alike.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Canvas {
    /// Fully transparent canvas
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, TRANSPARENT)
    }

    /// Canvas with every pixel set to `rgba`
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let count = width as usize * height as usize;
        let mut data = Vec::with_capacity(count * RGBA);
        for _ in 0..count {
            data.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Wrap an existing RGBA buffer
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self, RenderError> {
        if width == 0 || height == 0 || data.len() != width as usize * height as usize * RGBA {
            return Err(RenderError::InvalidCanvas {
                width,
                height,
                len: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * RGBA
    }

    /// Pixel at `(x, y)`; panics when out of bounds
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = self.offset(x, y);
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    #[inline]
    pub fn put_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let i = self.offset(x, y);
        self.data[i..i + RGBA].copy_from_slice(&rgba);
    }

    /// Raw RGBA bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Iterate pixels in row-major order
    pub fn pixels(&self) -> impl Iterator<Item = &[u8]> {
        self.data.chunks_exact(RGBA)
    }

    pub(crate) fn pixels_mut(&mut self) -> impl Iterator<Item = &mut [u8]> {
        self.data.chunks_exact_mut(RGBA)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rgba_checks_length() {
        assert!(Canvas::from_rgba(2, 2, vec![0; 16]).is_ok());
        assert_eq!(
            Canvas::from_rgba(2, 2, vec![0; 15]),
            Err(RenderError::InvalidCanvas {
                width: 2,
                height: 2,
                len: 15
            })
        );
        assert!(Canvas::from_rgba(0, 2, vec![]).is_err());
    }

    #[test]
    fn test_put_and_get_pixel() {
        let mut c = Canvas::new(3, 2);
        c.put_pixel(2, 1, [1, 2, 3, 4]);
        assert_eq!(c.pixel(2, 1), [1, 2, 3, 4]);
        assert_eq!(c.pixel(0, 0), TRANSPARENT);
        assert_eq!(&c.as_bytes()[20..24], &[1, 2, 3, 4]);
    }
}
