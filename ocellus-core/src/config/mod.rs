//! Configuration types
//!
//! Board-agnostic configuration structures, deserialized from TOML by the
//! daemon. Every section has a `Default` matching the stock two-panel rig
//! so a config file only needs the values that differ.

pub mod types;

pub use types::*;
