//! I2C bus abstraction
//!
//! The PWM controller only needs plain register writes and a
//! register-select-then-read; bus speed is fixed by the kernel adapter.

/// I2C bus master
pub trait I2cBus {
    /// Error type for I2C operations
    type Error: core::fmt::Debug;

    /// Write `data` to the 7-bit `address`
    ///
    /// For register devices the first byte is the register index.
    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error>;

    /// Write `write_data`, then read `read_buf.len()` bytes with a repeated start
    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), Self::Error>;
}
