//! Per-eye frame pipeline
//!
//! ```text
//! commands ──► EyeState (latest wins) ──► FrameComposer ──► FrameQueue ──► display
//!                                          (both eyes)       (per eye)     (fixed cadence)
//! ```
//!
//! Producers never block: a full queue drops its oldest frame so the
//! panel always shows the most recently commanded state.

pub mod composer;
pub mod frame;
pub mod queue;
pub mod state;

pub use composer::{pupil_param, FrameComposer};
pub use frame::DeviceFrame;
pub use queue::{FrameQueue, FRAME_QUEUE_DEPTH};
pub use state::EyeState;

/// One of the two panels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Eye {
    Left,
    Right,
}

impl Eye {
    pub const BOTH: [Eye; 2] = [Eye::Left, Eye::Right];

    pub fn index(self) -> usize {
        match self {
            Eye::Left => 0,
            Eye::Right => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Eye::Left => "left",
            Eye::Right => "right",
        }
    }
}
