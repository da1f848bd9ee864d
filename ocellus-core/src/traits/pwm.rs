//! PWM output trait

/// Channels on the controller
pub const PWM_CHANNELS: u8 = 16;

/// Largest 12-bit duty value
pub const PWM_MAX: u16 = 4095;

/// A multi-channel 12-bit PWM controller
pub trait PwmOutput {
    /// Error type for PWM operations
    type Error: core::fmt::Debug;

    /// Set the on/off tick counts of one channel
    fn set_channel(&mut self, channel: u8, on: u16, off: u16) -> Result<(), Self::Error>;

    /// Set the on/off tick counts of every channel at once
    fn set_all(&mut self, on: u16, off: u16) -> Result<(), Self::Error>;

    /// Duty `value` (0..=4095) starting at tick zero
    fn set_duty(&mut self, channel: u8, value: u16) -> Result<(), Self::Error> {
        self.set_channel(channel, 0, value.min(PWM_MAX))
    }
}
