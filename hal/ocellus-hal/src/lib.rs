//! Ocellus Hardware Abstraction Layer
//!
//! This crate defines the bus and pin traits the display and actuator
//! drivers are written against. Platform crates implement them for real
//! hardware; the `mock` feature provides recording doubles for tests.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  ocellus-drivers (ST7789, PCA9685)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  ocellus-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ ocellus-hal-  │       │  mock (tests) │
//! │    linux      │       │               │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`] - Digital output (reset, data/command, backlight)
//! - [`i2c::I2cBus`] - I2C bus operations
//! - [`spi::SpiBus`] - SPI write operations
//! - [`DelayNs`] - Blocking delays (re-exported from `embedded-hal`)

#![cfg_attr(not(any(test, feature = "mock")), no_std)]
#![deny(unsafe_code)]

pub mod gpio;
pub mod i2c;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod spi;

// Re-export key traits at crate root for convenience
pub use embedded_hal::delay::DelayNs;
pub use gpio::OutputPin;
pub use i2c::I2cBus;
pub use spi::SpiBus;
