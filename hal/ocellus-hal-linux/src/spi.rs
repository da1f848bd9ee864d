//! spidev SPI master
//!
//! Writes go through plain `write(2)` on the device node, which spidev
//! turns into one half-duplex transfer at the configured speed. The
//! kernel caps a single transfer at its `bufsiz` module parameter
//! (4096 by default).

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::os::unix::io::AsRawFd;

use log::debug;
use ocellus_hal::spi::{SpiBus, SpiConfig};

use crate::error::LinuxHalError;

const SPI_IOC_MAGIC: u8 = b'k';

nix::ioctl_write_ptr!(spi_wr_mode, SPI_IOC_MAGIC, 1, u8);
nix::ioctl_write_ptr!(spi_wr_bits_per_word, SPI_IOC_MAGIC, 3, u8);
nix::ioctl_write_ptr!(spi_wr_max_speed_hz, SPI_IOC_MAGIC, 4, u32);

/// Default spidev `bufsiz`
pub const SPIDEV_BUFSIZ: usize = 4096;

/// One spidev chip select
pub struct Spidev {
    file: File,
    path: String,
}

impl Spidev {
    /// Open a spidev node and apply mode, word size and clock
    pub fn open(path: &str, config: SpiConfig) -> Result<Self, LinuxHalError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| LinuxHalError::io(path, e))?;
        let fd = file.as_raw_fd();

        let mode = config.mode.bits();
        let bits: u8 = 8;
        let speed = config.frequency;

        // SAFETY: fd is an open spidev node owned by `file`; each ioctl reads
        // a single value of the declared type from a live stack local.
        unsafe {
            spi_wr_mode(fd, &mode).map_err(|source| LinuxHalError::Ioctl {
                what: "SPI_IOC_WR_MODE",
                source,
            })?;
            spi_wr_bits_per_word(fd, &bits).map_err(|source| LinuxHalError::Ioctl {
                what: "SPI_IOC_WR_BITS_PER_WORD",
                source,
            })?;
            spi_wr_max_speed_hz(fd, &speed).map_err(|source| LinuxHalError::Ioctl {
                what: "SPI_IOC_WR_MAX_SPEED_HZ",
                source,
            })?;
        }

        debug!("{}: mode {} at {} Hz", path, mode, speed);
        Ok(Self {
            file,
            path: path.to_string(),
        })
    }
}

impl SpiBus for Spidev {
    type Error = LinuxHalError;

    fn write(&mut self, data: &[u8]) -> Result<(), LinuxHalError> {
        if data.len() > SPIDEV_BUFSIZ {
            return Err(LinuxHalError::TransferTooLarge {
                len: data.len(),
                max: SPIDEV_BUFSIZ,
            });
        }
        self.file
            .write_all(data)
            .map_err(|e| LinuxHalError::io(self.path.as_str(), e))
    }

    fn max_transfer_size(&self) -> usize {
        SPIDEV_BUFSIZ
    }
}
