//! Disc and eyelid rasterizers

use super::ring::Axes;
use super::{Canvas, TRANSPARENT};

/// Opaque black disc centred on a `size × size` canvas
///
/// A pixel is inside when its distance from the canvas centre is at most
/// `radius`.
pub fn disc(size: u32, radius: f64) -> Canvas {
    let mut out = Canvas::new(size, size);
    let center = (size / 2) as f64;
    let r2 = radius * radius;
    for y in 0..size {
        let dy = y as f64 - center;
        for x in 0..size {
            let dx = x as f64 - center;
            if dx * dx + dy * dy <= r2 {
                out.put_pixel(x, y, [0, 0, 0, 255]);
            }
        }
    }
    out
}

/// Shape parameters for one eyelid frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LidShape {
    /// Opening semi-axes `(rx, ry)`
    pub axes: Axes,
    /// Rotation of the opening in degrees
    pub angle_deg: f64,
    /// Exponent of the vertical narrowing gradient
    pub sharpness: f64,
    /// Lid colour
    pub color: [u8; 3],
}

/// Eyelid mask: transparent opening inside a rotated, tapered ellipse,
/// opaque lid colour everywhere else
///
/// The opening centre sits a twentieth of the canvas below the middle,
/// both offsets in whole pixels.
/// Its vertical radius is scaled per row by
/// `clamp((1 - (y - cy) / size)^sharpness, 0, 1)` so the lid narrows
/// towards the bottom.
pub fn eyelid(size: u32, shape: &LidShape) -> Canvas {
    let [r, g, b] = shape.color;
    let lid = [r, g, b, 255];
    let mut out = Canvas::filled(size, size, lid);

    let s = size as f64;
    let cx = (size / 2) as f64;
    let cy = (size / 2 + size / 20) as f64;
    let (sin, cos) = shape.angle_deg.to_radians().sin_cos();
    let rx = shape.axes.a() as f64;
    let ry = shape.axes.b() as f64;

    for y in 0..size {
        let dy = y as f64 - cy;
        let gradient = (1.0 - dy / s).powf(shape.sharpness).clamp(0.0, 1.0);
        let ry_eff = ry * gradient;
        if rx <= 0.0 || !(ry_eff > 0.0) {
            continue;
        }
        for x in 0..size {
            let dx = x as f64 - cx;
            let u = dx * cos + dy * sin;
            let v = dx * sin - dy * cos;
            if (u * u) / (rx * rx) + (v * v) / (ry_eff * ry_eff) <= 1.0 {
                out.put_pixel(x, y, TRANSPARENT);
            }
        }
    }
    out
}
