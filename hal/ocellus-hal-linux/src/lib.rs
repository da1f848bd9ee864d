//! Linux HAL for the eye runtime
//!
//! This crate provides Linux implementations of the shared
//! `ocellus-hal` traits on top of kernel character devices:
//!
//! - SPI through `/dev/spidevB.C` (mode/speed via ioctl, half-duplex writes)
//! - I2C through `/dev/i2c-N` (combined transfers via `I2C_RDWR`)
//! - GPIO outputs through the sysfs interface, allocated by number
//! - Blocking delays via `std::thread::sleep`

pub mod delay;
pub mod error;
pub mod gpio;
pub mod i2c;
pub mod spi;

pub use delay::StdDelay;
pub use error::LinuxHalError;
pub use gpio::{PinBank, SysfsPin};
pub use i2c::LinuxI2c;
pub use spi::Spidev;

// Re-export shared traits from ocellus-hal for convenience
pub use ocellus_hal::{DelayNs, I2cBus, OutputPin, SpiBus};
