//! Control Command Protocol
//!
//! This crate defines the commands the runtime accepts from its upstream
//! producer (a tracker, a show controller, or a person at a shell) and
//! their line framing.
//!
//! # Framing
//!
//! One command per line, a topic word followed by a JSON object:
//! ```text
//! eyes {"custom": false, "eyelid_percentage": 0.1, "radius": 1.0, "rel_x": 0.2, "rel_y": 0.0}
//! eyes {"custom": true, "leftimg": "<base64 PNG>", "rightimg": "<base64 PNG>", "n": 5}
//! actuator {"type": "set", "channel": 3, "value": 2048}
//! actuator {"type": "breath", "channel": 0, "step1": 20, "step2": 10, "range": [0, 4095]}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped. Every malformed
//! record is reported as a [`CommandError`]; nothing is silently ignored.

#![deny(unsafe_code)]

pub mod command;
pub mod error;
pub mod line;

pub use command::{ActuatorCommand, Command, CustomImages, EyeCommand, GazeUpdate};
pub use error::CommandError;
pub use line::{parse_line, Topic};
