//! PWM controller drivers

pub mod breath;
pub mod pca9685;

pub use breath::{BreathError, BreathPattern, BreathRamp};
pub use pca9685::{Pca9685, PwmError};
