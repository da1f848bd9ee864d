//! SPI bus abstractions
//!
//! Provides the write-only SPI master operations the display panels need.

/// SPI bus master
///
/// One instance addresses one chip select. Implementations must not split
/// a single `write` call into transfers interleaved with other devices.
pub trait SpiBus {
    /// Error type for SPI operations
    type Error: core::fmt::Debug;

    /// Write data without reading
    ///
    /// Callers keep `data` within [`SpiBus::max_transfer_size`].
    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Largest buffer a single `write` accepts
    fn max_transfer_size(&self) -> usize {
        4096
    }
}

/// SPI configuration
#[derive(Debug, Clone, Copy)]
pub struct SpiConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
    /// Clock mode
    pub mode: Mode,
}

impl Default for SpiConfig {
    fn default() -> Self {
        Self {
            frequency: 1_000_000, // 1 MHz
            mode: Mode::Mode0,
        }
    }
}

/// SPI clock mode (CPOL/CPHA)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Mode 0: CPOL=0, CPHA=0
    Mode0,
    /// Mode 1: CPOL=0, CPHA=1
    Mode1,
    /// Mode 2: CPOL=1, CPHA=0
    Mode2,
    /// Mode 3: CPOL=1, CPHA=1
    Mode3,
}

impl Mode {
    /// Mode number as used by Linux `SPI_IOC_WR_MODE` (CPHA = bit 0, CPOL = bit 1)
    pub fn bits(self) -> u8 {
        match self {
            Mode::Mode0 => 0,
            Mode::Mode1 => 1,
            Mode::Mode2 => 2,
            Mode::Mode3 => 3,
        }
    }
}
