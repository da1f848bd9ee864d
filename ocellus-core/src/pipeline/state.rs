//! Control state shared by both eyes

/// Latest commanded control values
///
/// All fields are clamped to their ranges on construction so frame
/// selection can never be handed an out-of-range parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeState {
    /// Horizontal gaze, -1 (left) to 1 (right)
    pub gaze_x: f32,
    /// Vertical gaze, -1 (up) to 1 (down)
    pub gaze_y: f32,
    /// Lid closure, 0 = fully open, 1 = closed
    pub eyelid: f32,
    /// Detected pupil size, 0 = nothing detected
    pub pupil: f32,
}

impl Default for EyeState {
    fn default() -> Self {
        Self {
            gaze_x: 0.0,
            gaze_y: 0.0,
            eyelid: 0.0,
            pupil: 1.0,
        }
    }
}

fn clamp_or(v: f32, lo: f32, hi: f32, fallback: f32) -> f32 {
    if v.is_nan() {
        fallback
    } else {
        v.clamp(lo, hi)
    }
}

impl EyeState {
    pub fn new(gaze_x: f32, gaze_y: f32, eyelid: f32, pupil: f32) -> Self {
        Self {
            gaze_x: clamp_or(gaze_x, -1.0, 1.0, 0.0),
            gaze_y: clamp_or(gaze_y, -1.0, 1.0, 0.0),
            eyelid: clamp_or(eyelid, 0.0, 1.0, 0.0),
            pupil: clamp_or(pupil, 0.0, 1.0, 1.0),
        }
    }

    /// State from a tracker update
    ///
    /// A zero pupil radius means the tracker lost the eye, which is shown
    /// as a closed lid regardless of the reported lid value.
    pub fn from_control(eyelid_percentage: f32, radius: f32, rel_x: f32, rel_y: f32) -> Self {
        let eyelid = if radius <= 0.0 { 1.0 } else { eyelid_percentage };
        Self::new(rel_x, rel_y, eyelid, radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamping() {
        let s = EyeState::new(2.0, -3.0, 1.5, f32::NAN);
        assert_eq!(s.gaze_x, 1.0);
        assert_eq!(s.gaze_y, -1.0);
        assert_eq!(s.eyelid, 1.0);
        assert_eq!(s.pupil, 1.0);
    }

    #[test]
    fn test_lost_tracking_closes_lid() {
        let s = EyeState::from_control(0.0, 0.0, 0.2, 0.1);
        assert_eq!(s.eyelid, 1.0);
        assert_eq!(s.gaze_x, 0.2);
        let s = EyeState::from_control(0.3, 1.0, 0.0, 0.0);
        assert_eq!(s.eyelid, 0.3);
    }
}
