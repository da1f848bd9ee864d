//! Display panel drivers

pub mod st7789;

pub use st7789::{DisplayError, PanelState, St7789, St7789Config};
