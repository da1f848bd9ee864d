//! PCA9685 16-channel 12-bit PWM controller (I2C)
//!
//! Each channel has four registers (`ON_L`, `ON_H`, `OFF_L`, `OFF_H`)
//! starting at `LED0_ON_L + 4 * channel`. The output is high from the ON
//! tick to the OFF tick of each 4096-tick period.
//!
//! # Prescaler
//!
//! The period comes from the 25 MHz internal oscillator:
//! `prescale = round(25 MHz / 4096 / f - 1)`. The register only accepts
//! 3..=255, which bounds the frequency to roughly 24-1526 Hz, and can only
//! be written while the oscillator is asleep.

use embedded_hal::delay::DelayNs;
use log::debug;
use ocellus_core::traits::{PwmOutput, PWM_CHANNELS, PWM_MAX};
use ocellus_hal::I2cBus;

/// Default 7-bit address (all address pins low)
pub const DEFAULT_ADDRESS: u8 = 0x40;

/// Internal oscillator frequency
pub const OSC_HZ: f64 = 25_000_000.0;

/// PCA9685 register addresses
pub mod reg {
    pub const MODE1: u8 = 0x00;
    pub const MODE2: u8 = 0x01;
    pub const LED0_ON_L: u8 = 0x06;
    pub const LED0_ON_H: u8 = 0x07;
    pub const LED0_OFF_L: u8 = 0x08;
    pub const LED0_OFF_H: u8 = 0x09;
    pub const ALL_LED_ON_L: u8 = 0xFA;
    pub const ALL_LED_ON_H: u8 = 0xFB;
    pub const ALL_LED_OFF_L: u8 = 0xFC;
    pub const ALL_LED_OFF_H: u8 = 0xFD;
    pub const PRESCALE: u8 = 0xFE;
}

/// MODE1 / MODE2 bits
pub mod bits {
    /// MODE1: restart enabled
    pub const RESTART: u8 = 0x80;
    /// MODE1: low-power mode, oscillator off
    pub const SLEEP: u8 = 0x10;
    /// MODE1: respond to the all-call address
    pub const ALLCALL: u8 = 0x01;
    /// MODE2: totem-pole outputs
    pub const OUTDRV: u8 = 0x04;
}

/// Oscillator settle time after waking
const SETTLE_MS: u32 = 5;

/// PCA9685 errors
#[derive(Debug, thiserror::Error)]
pub enum PwmError<E> {
    #[error("I2C transfer failed: {0:?}")]
    I2c(E),
    #[error("channel {0} out of range")]
    InvalidChannel(u8),
    #[error("{0} Hz outside the prescaler range")]
    InvalidFrequency(u32),
    #[error("tick {0} exceeds 4095")]
    InvalidValue(u16),
}

/// Prescaler value for `hz`, or `None` when the register cannot hold it
pub fn prescale_for(hz: u32) -> Option<u8> {
    if hz == 0 {
        return None;
    }
    let value = (OSC_HZ / 4096.0 / hz as f64 - 1.0 + 0.5).floor();
    if (3.0..=255.0).contains(&value) {
        Some(value as u8)
    } else {
        None
    }
}

/// PCA9685 on an I2C bus
pub struct Pca9685<I2C, D> {
    i2c: I2C,
    address: u8,
    delay: D,
}

impl<I2C, D> Pca9685<I2C, D>
where
    I2C: I2cBus,
    D: DelayNs,
{
    /// Wrap the bus; no I/O until [`Pca9685::init`]
    pub fn new(i2c: I2C, address: u8, delay: D) -> Self {
        Self {
            i2c,
            address,
            delay,
        }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), PwmError<I2C::Error>> {
        self.i2c
            .write(self.address, &[reg, value])
            .map_err(PwmError::I2c)
    }

    fn read_reg(&mut self, reg: u8) -> Result<u8, PwmError<I2C::Error>> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(self.address, &[reg], &mut buf)
            .map_err(PwmError::I2c)?;
        Ok(buf[0])
    }

    /// All outputs off, totem-pole drive, oscillator awake
    pub fn init(&mut self) -> Result<(), PwmError<I2C::Error>> {
        self.set_all(0, 0)?;
        self.write_reg(reg::MODE2, bits::OUTDRV)?;
        self.write_reg(reg::MODE1, bits::ALLCALL)?;
        self.delay.delay_ms(SETTLE_MS);
        let mode1 = self.read_reg(reg::MODE1)? & !bits::SLEEP;
        self.write_reg(reg::MODE1, mode1)?;
        self.delay.delay_ms(SETTLE_MS);
        debug!("PCA9685 at {:#04x} initialized", self.address);
        Ok(())
    }

    /// Reprogram the PWM frequency
    ///
    /// The oscillator is put to sleep for the prescaler write and woken
    /// with a restart; the mode register never ends up asleep.
    pub fn set_frequency(&mut self, hz: u32) -> Result<(), PwmError<I2C::Error>> {
        let prescale = prescale_for(hz).ok_or(PwmError::InvalidFrequency(hz))?;
        let old = self.read_reg(reg::MODE1)?;
        let awake = old & !bits::SLEEP;
        self.write_reg(reg::MODE1, (old & 0x7F) | bits::SLEEP)?;
        self.write_reg(reg::PRESCALE, prescale)?;
        self.write_reg(reg::MODE1, awake)?;
        self.delay.delay_ms(SETTLE_MS);
        self.write_reg(reg::MODE1, awake | bits::RESTART)?;
        debug!("PCA9685 frequency {} Hz (prescale {})", hz, prescale);
        Ok(())
    }

    /// Program one channel's on/off ticks
    pub fn set_channel(&mut self, channel: u8, on: u16, off: u16) -> Result<(), PwmError<I2C::Error>> {
        if channel >= PWM_CHANNELS {
            return Err(PwmError::InvalidChannel(channel));
        }
        check_tick(on)?;
        check_tick(off)?;
        let base = reg::LED0_ON_L + 4 * channel;
        self.write_reg(base, on as u8)?;
        self.write_reg(base + 1, (on >> 8) as u8)?;
        self.write_reg(base + 2, off as u8)?;
        self.write_reg(base + 3, (off >> 8) as u8)
    }

    /// Program every channel at once
    pub fn set_all(&mut self, on: u16, off: u16) -> Result<(), PwmError<I2C::Error>> {
        check_tick(on)?;
        check_tick(off)?;
        self.write_reg(reg::ALL_LED_ON_L, on as u8)?;
        self.write_reg(reg::ALL_LED_ON_H, (on >> 8) as u8)?;
        self.write_reg(reg::ALL_LED_OFF_L, off as u8)?;
        self.write_reg(reg::ALL_LED_OFF_H, (off >> 8) as u8)
    }

    /// Release the bus
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }
}

fn check_tick<E>(tick: u16) -> Result<(), PwmError<E>> {
    if tick > PWM_MAX {
        Err(PwmError::InvalidValue(tick))
    } else {
        Ok(())
    }
}

impl<I2C, D> PwmOutput for Pca9685<I2C, D>
where
    I2C: I2cBus,
    D: DelayNs,
{
    type Error = PwmError<I2C::Error>;

    fn set_channel(&mut self, channel: u8, on: u16, off: u16) -> Result<(), Self::Error> {
        Pca9685::set_channel(self, channel, on, off)
    }

    fn set_all(&mut self, on: u16, off: u16) -> Result<(), Self::Error> {
        Pca9685::set_all(self, on, off)
    }
}
