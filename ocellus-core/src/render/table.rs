//! Animation table building
//!
//! Tables are built once at startup (or loaded from the cache) and are
//! read-only afterwards. Frame `0` of the iris table is the smallest pupil,
//! the last is full dilation; frame `0` of the eyelid table is fully open.

use log::debug;
use serde::{Deserialize, Serialize};

use super::compose::{combine, mirror_horizontal, select_by_parameter};
use super::raster::{disc, eyelid};
use super::ring::{map_ring, Axes, RingSpec};
use super::Canvas;
use crate::config::{EyelidConfig, RenderConfig};
use crate::error::{ConfigError, RenderError};

/// Which parameter a table is keyed by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableKind {
    /// Iris over pupil over sclera, keyed by dilation
    IrisSclera,
    /// Eyelid mask, keyed by closure
    Eyelid,
}

/// Ordered frames for a parameter in `[0, 1]`
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationTable {
    kind: TableKind,
    frames: Vec<Canvas>,
}

impl AnimationTable {
    pub fn new(kind: TableKind, frames: Vec<Canvas>) -> Result<Self, RenderError> {
        if frames.is_empty() {
            return Err(RenderError::EmptyTable);
        }
        Ok(Self { kind, frames })
    }

    pub fn kind(&self) -> TableKind {
        self.kind
    }

    pub fn frames(&self) -> &[Canvas] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frame for parameter `t`
    pub fn select(&self, t: f32) -> Result<&Canvas, RenderError> {
        select_by_parameter(&self.frames, t)
    }

    /// Copy of this table with every frame mirrored left-right
    pub fn mirrored(&self) -> Self {
        Self {
            kind: self.kind,
            frames: self.frames.iter().map(mirror_horizontal).collect(),
        }
    }
}

/// `n` axes linearly interpolated from `start` to `end`
///
/// Each axis is rounded half to even, so `70.5` becomes `70`.
pub fn interpolate_axes(start: Axes, end: Axes, n: usize) -> Result<Vec<Axes>, RenderError> {
    if n < 2 {
        return Err(RenderError::TooFewSteps(n));
    }
    let lerp = |s: u32, e: u32, i: usize| -> u32 {
        let s = s as f64;
        let e = e as f64;
        (s + (e - s) * i as f64 / (n - 1) as f64).round_ties_even() as u32
    };
    Ok((0..n)
        .map(|i| Axes(lerp(start.0, end.0, i), lerp(start.1, end.1, i)))
        .collect())
}

/// Build the iris/sclera table for one eye
///
/// The sclera ring is warped once; each step warps the iris between its
/// interpolated inner ellipse and `iris_outer`, lays it over the pupil
/// disc, then lays the sclera over that.
pub fn build_iris_table(
    iris: &Canvas,
    sclera: &Canvas,
    config: &RenderConfig,
) -> Result<AnimationTable, RenderError> {
    let size = config.canvas_size;
    let sclera_ring = map_ring(
        sclera,
        &RingSpec {
            frame_size: size,
            inner: config.sclera_inner,
            outer: config.sclera_outer,
        },
    )?;
    let pupil = disc(size, config.pupil_radius() as f64);

    let steps = interpolate_axes(config.iris_inner_normal, config.iris_inner_max, config.iris_steps)?;
    let mut frames = Vec::with_capacity(steps.len());
    for (i, inner) in steps.into_iter().enumerate() {
        let ring = map_ring(
            iris,
            &RingSpec {
                frame_size: size,
                inner,
                outer: config.iris_outer,
            },
        )?;
        let iris_over_pupil = combine(&ring, &pupil)?;
        frames.push(combine(&sclera_ring, &iris_over_pupil)?);
        debug!("iris frame {} built (inner {:?})", i, inner);
    }
    AnimationTable::new(TableKind::IrisSclera, frames)
}

/// Errors from building the eyelid table
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EyelidTableError {
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Build the eyelid table, open to closed
pub fn build_eyelid_table(
    config: &EyelidConfig,
    canvas_size: u32,
) -> Result<AnimationTable, EyelidTableError> {
    let steps = interpolate_axes(config.open, config.closed, config.steps)?;
    let mut frames = Vec::with_capacity(steps.len());
    for axes in steps {
        frames.push(eyelid(canvas_size, &config.shape(axes)?));
    }
    Ok(AnimationTable::new(TableKind::Eyelid, frames)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::TRANSPARENT;
    use proptest::prelude::*;

    #[test]
    fn test_interpolate_endpoints() {
        let steps = interpolate_axes(Axes(10, 69), Axes(18, 71), 10).unwrap();
        assert_eq!(steps.len(), 10);
        assert_eq!(steps[0], Axes(10, 69));
        assert_eq!(steps[9], Axes(18, 71));
    }

    #[test]
    fn test_interpolate_halves_round_to_even() {
        let steps = interpolate_axes(Axes(10, 69), Axes(18, 71), 5).unwrap();
        assert_eq!(
            steps,
            vec![
                Axes(10, 69),
                Axes(12, 70),
                Axes(14, 70),
                Axes(16, 70),
                Axes(18, 71)
            ]
        );
    }

    #[test]
    fn test_interpolate_decreasing() {
        let steps = interpolate_axes(Axes(110, 80), Axes(110, 1), 16).unwrap();
        assert_eq!(steps[0], Axes(110, 80));
        assert_eq!(steps[15], Axes(110, 1));
        assert!(steps.iter().all(|a| a.0 == 110));
        assert!(steps.windows(2).all(|w| w[1].1 <= w[0].1));
    }

    #[test]
    fn test_interpolate_too_few() {
        assert_eq!(
            interpolate_axes(Axes(1, 1), Axes(2, 2), 1),
            Err(RenderError::TooFewSteps(1))
        );
        assert!(interpolate_axes(Axes(1, 1), Axes(2, 2), 0).is_err());
    }

    fn small_render_config() -> RenderConfig {
        RenderConfig {
            canvas_size: 64,
            sclera_inner: Axes(14, 14),
            sclera_outer: Axes(30, 30),
            iris_inner_normal: Axes(3, 3),
            iris_inner_max: Axes(6, 6),
            iris_outer: Axes(14, 14),
            iris_steps: 4,
            ..RenderConfig::default()
        }
    }

    #[test]
    fn test_iris_table_layers() {
        let iris = Canvas::filled(32, 8, [0, 0, 255, 255]);
        let sclera = Canvas::filled(64, 8, [255, 255, 255, 255]);
        let table = build_iris_table(&iris, &sclera, &small_render_config()).unwrap();
        assert_eq!(table.kind(), TableKind::IrisSclera);
        assert_eq!(table.len(), 4);

        let frame = table.select(0.0).unwrap();
        assert_eq!(frame.dimensions(), (64, 64));
        // pupil covers the centre, iris colour between the rings, sclera outside
        assert_eq!(frame.pixel(32, 32), [0, 0, 0, 255]);
        assert_eq!(frame.pixel(32 + 12, 32), [0, 0, 255, 255]);
        assert_eq!(frame.pixel(32 + 23, 32), [255, 255, 255, 255]);
        assert_eq!(frame.pixel(0, 0), TRANSPARENT);
    }

    #[test]
    fn test_eyelid_table_open_to_closed() {
        let config = EyelidConfig {
            steps: 4,
            open: Axes(20, 16),
            closed: Axes(20, 0),
            ..EyelidConfig::default()
        };
        let table = build_eyelid_table(&config, 64).unwrap();
        assert_eq!(table.kind(), TableKind::Eyelid);
        let open = table.select(0.0).unwrap();
        let closed = table.select(1.0).unwrap();
        let clear = |c: &Canvas| c.pixels().filter(|p| p[3] == 0).count();
        assert!(clear(open) > 0);
        assert_eq!(clear(closed), 0);
    }

    #[test]
    fn test_eyelid_bad_colour() {
        let config = EyelidConfig {
            color: "black".into(),
            ..EyelidConfig::default()
        };
        assert!(matches!(
            build_eyelid_table(&config, 16),
            Err(EyelidTableError::Config(_))
        ));
    }

    #[test]
    fn test_mirrored_table() {
        let mut frame = Canvas::new(4, 1);
        frame.put_pixel(0, 0, [1, 2, 3, 255]);
        let table = AnimationTable::new(TableKind::Eyelid, vec![frame]).unwrap();
        let m = table.mirrored();
        assert_eq!(m.frames()[0].pixel(3, 0), [1, 2, 3, 255]);
    }

    proptest! {
        #[test]
        fn prop_interpolation_monotone(
            sa in 0u32..500, sb in 0u32..500,
            ea in 0u32..500, eb in 0u32..500,
            n in 2usize..40,
        ) {
            let steps = interpolate_axes(Axes(sa, sb), Axes(ea, eb), n).unwrap();
            prop_assert_eq!(steps.len(), n);
            prop_assert_eq!(steps[0], Axes(sa, sb));
            prop_assert_eq!(steps[n - 1], Axes(ea, eb));
            for w in steps.windows(2) {
                if ea >= sa { prop_assert!(w[1].0 >= w[0].0); } else { prop_assert!(w[1].0 <= w[0].0); }
                if eb >= sb { prop_assert!(w[1].1 >= w[0].1); } else { prop_assert!(w[1].1 <= w[0].1); }
            }
        }
    }
}
