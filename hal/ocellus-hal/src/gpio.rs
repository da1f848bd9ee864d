//! GPIO pin abstractions
//!
//! Output pins on a Linux host go through the kernel and can fail, so
//! unlike bare-metal pins every operation is fallible.

/// Digital output pin
pub trait OutputPin {
    /// Error type for pin operations
    type Error: core::fmt::Debug;

    /// Set the pin high (logic 1)
    fn set_high(&mut self) -> Result<(), Self::Error>;

    /// Set the pin low (logic 0)
    fn set_low(&mut self) -> Result<(), Self::Error>;

    /// Set the pin to a specific state
    fn set_state(&mut self, high: bool) -> Result<(), Self::Error> {
        if high {
            self.set_high()
        } else {
            self.set_low()
        }
    }

    /// Check if the pin was last driven high
    fn is_set_high(&self) -> bool;
}
