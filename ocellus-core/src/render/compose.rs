//! Layer compositing and frame selection

use super::{Canvas, RGBA, TRANSPARENT};
use crate::error::RenderError;

/// Rounded integer division, halves rounded up
#[inline]
fn div_round(num: u32, den: u32) -> u32 {
    (num + den / 2) / den
}

/// Composite one RGBA pixel over another
///
/// Straight (non-premultiplied) alpha with all intermediate values scaled
/// by 255 so the result is exact for an opaque or a fully transparent top.
#[inline]
pub fn over(top: [u8; 4], bottom: [u8; 4]) -> [u8; 4] {
    let ta = top[3] as u32;
    let ba = bottom[3] as u32;
    // Output alpha scaled by 255
    let wt = ta * 255;
    let wb = ba * (255 - ta);
    let alpha = wt + wb;
    if alpha == 0 {
        return TRANSPARENT;
    }
    let mut out = [0u8; 4];
    for i in 0..3 {
        out[i] = div_round(top[i] as u32 * wt + bottom[i] as u32 * wb, alpha) as u8;
    }
    out[3] = div_round(alpha, 255) as u8;
    out
}

/// `top` over `bottom`, pixel by pixel
pub fn combine(top: &Canvas, bottom: &Canvas) -> Result<Canvas, RenderError> {
    if top.dimensions() != bottom.dimensions() {
        return Err(RenderError::SizeMismatch {
            top: top.dimensions(),
            bottom: bottom.dimensions(),
        });
    }
    let mut data = Vec::with_capacity(top.as_bytes().len());
    for (t, b) in top.pixels().zip(bottom.pixels()) {
        data.extend_from_slice(&over(
            [t[0], t[1], t[2], t[3]],
            [b[0], b[1], b[2], b[3]],
        ));
    }
    Canvas::from_rgba(top.width(), top.height(), data)
}

/// Half-size window centred `(dx, dy)` away from the image centre
///
/// Offsets that would push the window past an edge are clamped so the
/// window stays fully inside the image.
pub fn crop_centered(image: &Canvas, dx: i32, dy: i32) -> Canvas {
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 {
        return image.clone();
    }
    let cw = (w / 2).max(1);
    let ch = (h / 2).max(1);

    let origin = |extent: u32, window: u32, offset: i32| -> u32 {
        let start = (extent / 2) as i64 + offset as i64 - (window / 2) as i64;
        start.clamp(0, (extent - window) as i64) as u32
    };
    let x0 = origin(w, cw, dx);
    let y0 = origin(h, ch, dy);

    let row_bytes = cw as usize * RGBA;
    let mut data = Vec::with_capacity(row_bytes * ch as usize);
    let src = image.as_bytes();
    for y in y0..y0 + ch {
        let start = (y as usize * w as usize + x0 as usize) * RGBA;
        data.extend_from_slice(&src[start..start + row_bytes]);
    }
    Canvas {
        width: cw,
        height: ch,
        data,
    }
}

/// Pick the frame for parameter `t ∈ [0, 1]`
///
/// `index = floor(t * len)`, with `t = 1.0` mapping to the last frame.
pub fn select_by_parameter<T>(table: &[T], t: f32) -> Result<&T, RenderError> {
    if table.is_empty() {
        return Err(RenderError::EmptyTable);
    }
    if !(0.0..=1.0).contains(&t) {
        return Err(RenderError::ParameterOutOfRange(t));
    }
    let index = ((t * table.len() as f32) as usize).min(table.len() - 1);
    Ok(&table[index])
}

/// Left-right mirror image
pub fn mirror_horizontal(image: &Canvas) -> Canvas {
    let (w, h) = image.dimensions();
    let mut out = Canvas::new(w, h);
    for y in 0..h {
        for x in 0..w {
            out.put_pixel(w - 1 - x, y, image.pixel(x, y));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_combine_size_mismatch() {
        let err = combine(&Canvas::new(2, 2), &Canvas::new(3, 2)).unwrap_err();
        assert_eq!(
            err,
            RenderError::SizeMismatch {
                top: (2, 2),
                bottom: (3, 2)
            }
        );
    }

    #[test]
    fn test_combine_half_alpha() {
        let top = Canvas::filled(1, 1, [255, 0, 0, 128]);
        let bottom = Canvas::filled(1, 1, [0, 0, 255, 255]);
        let out = combine(&top, &bottom).unwrap();
        let p = out.pixel(0, 0);
        assert_eq!(p[3], 255);
        assert_eq!(p[0], 128);
        assert_eq!(p[2], 127);
    }

    #[test]
    fn test_crop_centered_zero_offset() {
        let mut img = Canvas::new(8, 8);
        img.put_pixel(2, 2, [1, 1, 1, 255]);
        img.put_pixel(5, 5, [2, 2, 2, 255]);
        let out = crop_centered(&img, 0, 0);
        assert_eq!(out.dimensions(), (4, 4));
        assert_eq!(out.pixel(0, 0), [1, 1, 1, 255]);
        assert_eq!(out.pixel(3, 3), [2, 2, 2, 255]);
    }

    #[test]
    fn test_crop_centered_clamps_to_bounds() {
        let mut img = Canvas::new(8, 8);
        img.put_pixel(7, 0, [9, 9, 9, 255]);
        let out = crop_centered(&img, 100, -100);
        assert_eq!(out.dimensions(), (4, 4));
        assert_eq!(out.pixel(3, 0), [9, 9, 9, 255]);
    }

    #[test]
    fn test_select_endpoints() {
        let table = [0, 1, 2, 3, 4];
        assert_eq!(*select_by_parameter(&table, 0.0).unwrap(), 0);
        assert_eq!(*select_by_parameter(&table, 1.0).unwrap(), 4);
        assert_eq!(*select_by_parameter(&table, 0.5).unwrap(), 2);
        assert_eq!(*select_by_parameter(&table, 0.99).unwrap(), 4);
    }

    #[test]
    fn test_select_rejects_bad_input() {
        let empty: [u8; 0] = [];
        assert_eq!(
            select_by_parameter(&empty, 0.5),
            Err(RenderError::EmptyTable)
        );
        assert!(select_by_parameter(&[1], -0.1).is_err());
        assert!(select_by_parameter(&[1], 1.5).is_err());
        assert!(select_by_parameter(&[1], f32::NAN).is_err());
    }

    #[test]
    fn test_mirror() {
        let mut img = Canvas::new(3, 1);
        img.put_pixel(0, 0, [1, 0, 0, 255]);
        let out = mirror_horizontal(&img);
        assert_eq!(out.pixel(2, 0), [1, 0, 0, 255]);
        assert_eq!(out.pixel(0, 0), TRANSPARENT);
        assert_eq!(mirror_horizontal(&out), img);
    }

    proptest! {
        #[test]
        fn prop_opaque_top_wins(top in any::<[u8; 3]>(), bottom in any::<[u8; 4]>()) {
            let t = [top[0], top[1], top[2], 255];
            prop_assert_eq!(over(t, bottom), t);
        }

        #[test]
        fn prop_transparent_top_keeps_bottom(top in any::<[u8; 3]>(), bottom in any::<[u8; 3]>(), ba in 1u8..=255) {
            let b = [bottom[0], bottom[1], bottom[2], ba];
            prop_assert_eq!(over([top[0], top[1], top[2], 0], b), b);
        }

        #[test]
        fn prop_alpha_never_decreases(top in any::<[u8; 4]>(), bottom in any::<[u8; 4]>()) {
            let out = over(top, bottom);
            prop_assert!(out[3] >= top[3].max(bottom[3]));
        }

        #[test]
        fn prop_selection_in_bounds(len in 1usize..64, t in 0.0f32..=1.0) {
            let table: Vec<usize> = (0..len).collect();
            let i = *select_by_parameter(&table, t).unwrap();
            prop_assert!(i < len);
        }
    }
}
