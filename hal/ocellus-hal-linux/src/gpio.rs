//! sysfs GPIO outputs allocated by number
//!
//! Pin numbers come from the config file, so pins are taken from a
//! [`PinBank`] at runtime; taking the same number twice is an error.

use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use log::debug;
use ocellus_hal::gpio::OutputPin;

use crate::error::LinuxHalError;

/// Default sysfs GPIO root
pub const SYSFS_GPIO_ROOT: &str = "/sys/class/gpio";

/// udev may take a moment to fix permissions on a freshly exported pin
const EXPORT_RETRIES: u32 = 20;
const EXPORT_RETRY_DELAY: Duration = Duration::from_millis(25);

/// Hands out each GPIO number at most once
pub struct PinBank {
    root: PathBuf,
    taken: HashSet<u32>,
}

impl PinBank {
    pub fn new() -> Self {
        Self::with_root(SYSFS_GPIO_ROOT)
    }

    /// Bank rooted somewhere other than `/sys/class/gpio`
    pub fn with_root(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            taken: HashSet::new(),
        }
    }

    /// Export `pin`, configure it as an output driven low, and return it
    pub fn take(&mut self, pin: u32) -> Result<SysfsPin, LinuxHalError> {
        if self.taken.contains(&pin) {
            return Err(LinuxHalError::PinTaken(pin));
        }
        let pin_dir = self.root.join(format!("gpio{}", pin));
        if !pin_dir.exists() {
            let export = self.root.join("export");
            match fs::write(&export, pin.to_string()) {
                Ok(()) => {}
                // EBUSY: already exported by someone else
                Err(e) if e.raw_os_error() == Some(libc::EBUSY) => {}
                Err(e) => return Err(LinuxHalError::io(export.display().to_string(), e)),
            }
        }

        let direction = pin_dir.join("direction");
        retry_write(&direction, b"low")?;

        let value_path = pin_dir.join("value");
        let value = OpenOptions::new()
            .write(true)
            .open(&value_path)
            .map_err(|e| LinuxHalError::io(value_path.display().to_string(), e))?;

        self.taken.insert(pin);
        debug!("GPIO {} configured as output", pin);
        Ok(SysfsPin {
            pin,
            value,
            high: false,
        })
    }
}

impl Default for PinBank {
    fn default() -> Self {
        Self::new()
    }
}

fn retry_write(path: &Path, contents: &[u8]) -> Result<(), LinuxHalError> {
    let mut last: Option<io::Error> = None;
    for _ in 0..EXPORT_RETRIES {
        match fs::write(path, contents) {
            Ok(()) => return Ok(()),
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied
                || e.kind() == io::ErrorKind::NotFound =>
            {
                last = Some(e);
                thread::sleep(EXPORT_RETRY_DELAY);
            }
            Err(e) => return Err(LinuxHalError::io(path.display().to_string(), e)),
        }
    }
    let err = last.unwrap_or_else(|| io::Error::from(io::ErrorKind::TimedOut));
    Err(LinuxHalError::io(path.display().to_string(), err))
}

/// An exported output pin
pub struct SysfsPin {
    pin: u32,
    value: File,
    high: bool,
}

impl SysfsPin {
    pub fn number(&self) -> u32 {
        self.pin
    }

    fn write_value(&mut self, high: bool) -> Result<(), LinuxHalError> {
        let byte: &[u8] = if high { b"1" } else { b"0" };
        self.value
            .seek(SeekFrom::Start(0))
            .and_then(|_| self.value.write_all(byte))
            .map_err(|e| LinuxHalError::io(format!("gpio{}/value", self.pin), e))?;
        self.high = high;
        Ok(())
    }
}

impl OutputPin for SysfsPin {
    type Error = LinuxHalError;

    fn set_high(&mut self) -> Result<(), LinuxHalError> {
        self.write_value(true)
    }

    fn set_low(&mut self) -> Result<(), LinuxHalError> {
        self.write_value(false)
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_root(pins: &[u32]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("export"), b"").unwrap();
        for pin in pins {
            let p = dir.path().join(format!("gpio{}", pin));
            fs::create_dir(&p).unwrap();
            fs::write(p.join("direction"), b"in").unwrap();
            fs::write(p.join("value"), b"0").unwrap();
        }
        dir
    }

    #[test]
    fn test_take_configures_output() {
        let root = fake_root(&[13]);
        let mut bank = PinBank::with_root(root.path());
        let mut pin = bank.take(13).unwrap();
        assert_eq!(
            fs::read_to_string(root.path().join("gpio13/direction")).unwrap(),
            "low"
        );
        pin.set_high().unwrap();
        assert!(pin.is_set_high());
        assert_eq!(
            fs::read_to_string(root.path().join("gpio13/value")).unwrap(),
            "1"
        );
        pin.set_low().unwrap();
        assert_eq!(
            fs::read_to_string(root.path().join("gpio13/value")).unwrap(),
            "0"
        );
    }

    #[test]
    fn test_pin_taken_twice() {
        let root = fake_root(&[16]);
        let mut bank = PinBank::with_root(root.path());
        let _pin = bank.take(16).unwrap();
        assert!(matches!(bank.take(16), Err(LinuxHalError::PinTaken(16))));
    }
}
