//! RGB565 conversion for the panels
//!
//! The panels take 16-bit big-endian RGB565: five bits red, six green,
//! five blue. Alpha is discarded, so frames must already be composited
//! onto an opaque background.

use super::Canvas;

/// Pack one colour into a big-endian RGB565 byte pair
#[inline]
pub fn rgb565_bytes(r: u8, g: u8, b: u8) -> [u8; 2] {
    let hi = (r & 0xF8) | (g >> 5);
    let lo = ((g & 0x1C) << 3) | (b >> 3);
    [hi, lo]
}

/// One colour as an RGB565 word
#[inline]
pub fn rgb565_word(r: u8, g: u8, b: u8) -> u16 {
    u16::from_be_bytes(rgb565_bytes(r, g, b))
}

/// Convert a whole canvas, row-major, two bytes per pixel
pub fn rgba_to_rgb565(image: &Canvas) -> Vec<u8> {
    let mut out = Vec::with_capacity(image.width() as usize * image.height() as usize * 2);
    for px in image.pixels() {
        out.extend_from_slice(&rgb565_bytes(px[0], px[1], px[2]));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_white_and_black() {
        assert_eq!(rgb565_word(255, 255, 255), 0xFFFF);
        assert_eq!(rgb565_word(0, 0, 0), 0x0000);
    }

    #[test]
    fn test_primaries() {
        assert_eq!(rgb565_word(255, 0, 0), 0xF800);
        assert_eq!(rgb565_word(0, 255, 0), 0x07E0);
        assert_eq!(rgb565_word(0, 0, 255), 0x001F);
    }

    #[test]
    fn test_canvas_layout() {
        let mut img = Canvas::filled(2, 1, [0, 0, 0, 0]);
        img.put_pixel(1, 0, [255, 255, 255, 17]);
        assert_eq!(rgba_to_rgb565(&img), vec![0x00, 0x00, 0xFF, 0xFF]);
    }
}
