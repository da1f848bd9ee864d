//! Board-agnostic core logic for the eye runtime
//!
//! This crate contains everything that does not touch hardware:
//!
//! - Procedural eye rendering (ring warping, rasterizers, compositing)
//! - Animation table building and the versioned table cache format
//! - The per-eye frame pipeline (eye state, bounded frame queues, composer)
//! - Configuration type definitions and validation
//! - Panel and PWM driver traits

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod pipeline;
pub mod render;
pub mod traits;

pub use error::{ConfigError, RenderError};
