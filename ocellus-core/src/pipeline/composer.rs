//! Frame composition from control state
//!
//! Per update and per eye: pick the iris frame by perspective-adjusted
//! dilation and the lid frame by closure, crop each by its own gaze
//! offset, lay the lid over the iris and pack to RGB565.

use crate::config::GazeConfig;
use crate::error::RenderError;
use crate::render::compose::{combine, crop_centered};
use crate::render::table::AnimationTable;
use crate::render::Canvas;

use super::{DeviceFrame, Eye, EyeState};

/// Iris parameter for a horizontal gaze
///
/// Looking sideways foreshortens the iris: 1 straight ahead, falling to 0
/// once `|gaze_x| * gain` reaches 1.
pub fn pupil_param(gaze_x: f32, gain: f32) -> f32 {
    1.0 - (gaze_x.abs() * gain).min(1.0)
}

/// Crop offsets in pixels for a gaze, a per-axis gain and a fixed trim
fn offset(state: &EyeState, gain: [f32; 2], trim: [i32; 2]) -> (i32, i32) {
    (
        (state.gaze_x * gain[0]).trunc() as i32 + trim[0],
        (state.gaze_y * gain[1]).trunc() as i32 + trim[1],
    )
}

/// Composes both eyes from their prebuilt tables
pub struct FrameComposer {
    iris: [AnimationTable; 2],
    lids: [AnimationTable; 2],
    gaze: GazeConfig,
    trims: [[i32; 2]; 2],
}

impl FrameComposer {
    /// The right eye's lid frames are the left's, mirrored
    pub fn new(
        left_iris: AnimationTable,
        right_iris: AnimationTable,
        lid: AnimationTable,
        gaze: GazeConfig,
    ) -> Self {
        let mirrored = lid.mirrored();
        Self {
            iris: [left_iris, right_iris],
            lids: [lid, mirrored],
            gaze,
            trims: [[0, 0]; 2],
        }
    }

    /// Per-eye lens alignment offsets
    pub fn with_trims(mut self, left: [i32; 2], right: [i32; 2]) -> Self {
        self.trims = [left, right];
        self
    }

    /// Composited RGBA frame for one eye
    pub fn compose(&self, eye: Eye, state: &EyeState) -> Result<Canvas, RenderError> {
        let i = eye.index();
        let pupil = pupil_param(state.gaze_x, self.gaze.perspective_gain);
        let iris = self.iris[i].select(pupil)?;
        let lid = self.lids[i].select(state.eyelid)?;

        let trim = self.trims[i];
        let (lx, ly) = offset(state, self.gaze.lid_gain, trim);
        let (ix, iy) = offset(state, self.gaze.iris_gain, trim);
        let lid_crop = crop_centered(lid, lx, ly);
        let iris_crop = crop_centered(iris, ix, iy);
        combine(&lid_crop, &iris_crop)
    }

    /// Panel-ready frame for one eye
    pub fn render(&self, eye: Eye, state: &EyeState) -> Result<DeviceFrame, RenderError> {
        Ok(DeviceFrame::from_canvas(&self.compose(eye, state)?))
    }
}
