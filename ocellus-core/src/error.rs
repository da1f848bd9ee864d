//! Configuration-class errors
//!
//! Everything here is fatal at startup: a table that cannot be built or a
//! config that does not validate means there is nothing sensible to show.

use thiserror::Error;

/// Rendering or composition was asked to do something impossible
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    /// Interpolation needs both endpoints
    #[error("step count must be at least 2, got {0}")]
    TooFewSteps(usize),
    /// Layers passed to `combine` differ in size
    #[error("layer size mismatch: {top:?} over {bottom:?}")]
    SizeMismatch { top: (u32, u32), bottom: (u32, u32) },
    /// Selection parameter outside `[0, 1]` or NaN
    #[error("parameter {0} outside [0, 1]")]
    ParameterOutOfRange(f32),
    /// Selection from a table with no frames
    #[error("animation table is empty")]
    EmptyTable,
    /// Zero-sized canvas or a pixel buffer that does not match its dimensions
    #[error("invalid canvas {width}x{height} ({len} bytes)")]
    InvalidCanvas { width: u32, height: u32, len: usize },
}

/// A configuration value failed validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Field has an unusable value
    #[error("{field}: {reason}")]
    Invalid { field: &'static str, reason: String },
    /// The file could not be parsed at all
    #[error("parse error: {0}")]
    Parse(String),
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}
