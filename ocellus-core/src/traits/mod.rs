//! Hardware abstraction traits
//!
//! These traits define the interface between the runtime tasks and the
//! concrete panel and PWM drivers, so retry and scheduling logic can be
//! exercised against test doubles.

pub mod display;
pub mod pwm;

pub use display::{EyePanel, PanelFault};
pub use pwm::{PwmOutput, PWM_CHANNELS, PWM_MAX};
