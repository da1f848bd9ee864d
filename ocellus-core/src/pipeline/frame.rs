//! Panel-native frame buffers

use crate::render::pixel::rgba_to_rgb565;
use crate::render::Canvas;

/// Packed big-endian RGB565 frame, exactly `width * height * 2` bytes
#[derive(Clone, PartialEq, Eq)]
pub struct DeviceFrame {
    width: u32,
    height: u32,
    data: Box<[u8]>,
}

impl DeviceFrame {
    /// Convert a composited canvas
    pub fn from_canvas(canvas: &Canvas) -> Self {
        Self {
            width: canvas.width(),
            height: canvas.height(),
            data: rgba_to_rgb565(canvas).into_boxed_slice(),
        }
    }

    /// Wrap already-packed RGB565 bytes; `None` when the length is wrong
    pub fn from_rgb565(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        if data.len() != width as usize * height as usize * 2 {
            return None;
        }
        Some(Self {
            width,
            height,
            data: data.into_boxed_slice(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl core::fmt::Debug for DeviceFrame {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "DeviceFrame({}x{})", self.width, self.height)
    }
}
