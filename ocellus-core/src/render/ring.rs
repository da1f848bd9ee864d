//! Polar texture warping
//!
//! A rectangular texture is wrapped around an elliptical annulus: each
//! texture column becomes an angle and each row a radius between the
//! inner and outer ellipse. Sampling is nearest-pixel forward mapping, so
//! the output is bit-reproducible across platforms.

use core::f64::consts::PI;

use serde::{Deserialize, Serialize};

use super::{Canvas, TRANSPARENT};
use crate::error::RenderError;

/// Ellipse semi-axes `(a, b)` in pixels: horizontal then vertical
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Axes(pub u32, pub u32);

impl Axes {
    #[inline]
    pub fn a(&self) -> u32 {
        self.0
    }

    #[inline]
    pub fn b(&self) -> u32 {
        self.1
    }
}

/// Geometry of one ring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingSpec {
    /// Output canvas edge length
    pub frame_size: u32,
    /// Ellipse the first texture row lands on
    pub inner: Axes,
    /// Ellipse the last texture row lands on
    pub outer: Axes,
}

/// Warp `texture` into a ring described by `spec`
///
/// Later texture rows overwrite earlier ones where they land on the same
/// output pixel. Untouched pixels and any pixel left with zero alpha are
/// fully transparent.
pub fn map_ring(texture: &Canvas, spec: &RingSpec) -> Result<Canvas, RenderError> {
    let size = spec.frame_size;
    if size == 0 {
        return Err(RenderError::InvalidCanvas {
            width: 0,
            height: 0,
            len: 0,
        });
    }

    let (w, h) = texture.dimensions();
    let mut out = Canvas::new(size, size);
    // Integer centre: odd sizes sit on the pixel left of and above the middle
    let center = (size / 2) as f64;
    let max = (size - 1) as f64;

    let (ia, ib) = (spec.inner.a() as f64, spec.inner.b() as f64);
    let (oa, ob) = (spec.outer.a() as f64, spec.outer.b() as f64);

    // Angles are shared by every row
    let trig: Vec<(f64, f64)> = (0..w)
        .map(|c| {
            let theta = 2.0 * PI * c as f64 / w as f64;
            (theta.cos(), theta.sin())
        })
        .collect();

    for r in 0..h {
        let t = if h > 1 {
            r as f64 / (h - 1) as f64
        } else {
            0.0
        };
        let a = ia + t * (oa - ia);
        let b = ib + t * (ob - ib);

        for (c, &(cos, sin)) in trig.iter().enumerate() {
            let x = (center + a * cos).clamp(0.0, max) as u32;
            let y = (center + b * sin).clamp(0.0, max) as u32;
            out.put_pixel(x, y, texture.pixel(c as u32, r));
        }
    }

    for px in out.pixels_mut() {
        if px[3] == 0 {
            px.copy_from_slice(&TRANSPARENT);
        }
    }

    Ok(out)
}
