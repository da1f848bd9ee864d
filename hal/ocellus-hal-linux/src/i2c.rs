//! i2c-dev I2C master using combined `I2C_RDWR` transfers

use std::fs::{File, OpenOptions};
use std::os::unix::io::AsRawFd;

use log::debug;
use ocellus_hal::i2c::I2cBus;

use crate::error::LinuxHalError;

/// `I2C_RDWR` request number from `<linux/i2c-dev.h>`
const I2C_RDWR: libc::c_ulong = 0x0707;
/// Message direction flag: read from slave
const I2C_M_RD: u16 = 0x0001;

#[repr(C)]
struct I2cMsg {
    addr: u16,
    flags: u16,
    len: u16,
    buf: *mut u8,
}

#[repr(C)]
struct I2cRdwrData {
    msgs: *mut I2cMsg,
    nmsgs: u32,
}

nix::ioctl_write_ptr_bad!(i2c_rdwr, I2C_RDWR, I2cRdwrData);

/// An `/dev/i2c-N` adapter
pub struct LinuxI2c {
    file: File,
}

impl LinuxI2c {
    pub fn open(path: &str) -> Result<Self, LinuxHalError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| LinuxHalError::io(path, e))?;
        debug!("{}: opened", path);
        Ok(Self { file })
    }

    fn transfer(&mut self, msgs: &mut [I2cMsg]) -> Result<(), LinuxHalError> {
        let data = I2cRdwrData {
            msgs: msgs.as_mut_ptr(),
            nmsgs: msgs.len() as u32,
        };
        // SAFETY: every message points into a buffer borrowed for the
        // duration of this call and `len` matches that buffer.
        unsafe { i2c_rdwr(self.file.as_raw_fd(), &data) }
            .map(|_| ())
            .map_err(|source| LinuxHalError::Ioctl {
                what: "I2C_RDWR",
                source,
            })
    }
}

impl I2cBus for LinuxI2c {
    type Error = LinuxHalError;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), LinuxHalError> {
        // The kernel does not write through a write-direction buffer.
        let mut msgs = [I2cMsg {
            addr: address as u16,
            flags: 0,
            len: data.len() as u16,
            buf: data.as_ptr() as *mut u8,
        }];
        self.transfer(&mut msgs)
    }

    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), LinuxHalError> {
        let mut msgs = [
            I2cMsg {
                addr: address as u16,
                flags: 0,
                len: write_data.len() as u16,
                buf: write_data.as_ptr() as *mut u8,
            },
            I2cMsg {
                addr: address as u16,
                flags: I2C_M_RD,
                len: read_buf.len() as u16,
                buf: read_buf.as_mut_ptr(),
            },
        ];
        self.transfer(&mut msgs)
    }
}
