//! Recording test doubles
//!
//! SPI writes and pin transitions land in one shared [`BusLog`] so tests can
//! assert the exact interleaving of data/command selects and payloads. The
//! I2C double emulates a register file per device address.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;

use crate::gpio::OutputPin;
use crate::i2c::I2cBus;
use crate::spi::SpiBus;

/// One observed bus event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusEvent {
    /// A pin was driven
    Pin { name: &'static str, high: bool },
    /// An SPI write
    Spi(Vec<u8>),
    /// An I2C write (address, bytes)
    I2cWrite(u8, Vec<u8>),
    /// A delay in nanoseconds
    Delay(u64),
}

/// Shared, clonable event log
#[derive(Debug, Clone, Default)]
pub struct BusLog(Rc<RefCell<Vec<BusEvent>>>);

impl BusLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: BusEvent) {
        self.0.borrow_mut().push(event);
    }

    /// Snapshot of all events so far
    pub fn events(&self) -> Vec<BusEvent> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    /// Concatenated payload of every SPI write
    pub fn spi_bytes(&self) -> Vec<u8> {
        self.0
            .borrow()
            .iter()
            .filter_map(|e| match e {
                BusEvent::Spi(b) => Some(b.clone()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    /// Only the I2C writes, in order
    pub fn i2c_writes(&self) -> Vec<(u8, Vec<u8>)> {
        self.0
            .borrow()
            .iter()
            .filter_map(|e| match e {
                BusEvent::I2cWrite(a, b) => Some((*a, b.clone())),
                _ => None,
            })
            .collect()
    }

    /// Total delay requested, in milliseconds
    pub fn delay_ms(&self) -> u64 {
        self.0
            .borrow()
            .iter()
            .filter_map(|e| match e {
                BusEvent::Delay(ns) => Some(*ns),
                _ => None,
            })
            .sum::<u64>()
            / 1_000_000
    }
}

/// Error returned by a mock that was told to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError;

/// Recording SPI bus
pub struct MockSpi {
    log: BusLog,
    /// Remaining successful writes before every write fails
    fail_after: Option<usize>,
    max_transfer: usize,
}

impl MockSpi {
    pub fn new(log: BusLog) -> Self {
        Self {
            log,
            fail_after: None,
            max_transfer: 4096,
        }
    }

    /// Succeed `n` more writes, then fail every write
    pub fn fail_after(&mut self, n: usize) {
        self.fail_after = Some(n);
    }

    /// Stop injecting failures
    pub fn heal(&mut self) {
        self.fail_after = None;
    }
}

impl SpiBus for MockSpi {
    type Error = MockError;

    fn write(&mut self, data: &[u8]) -> Result<(), MockError> {
        if let Some(n) = self.fail_after.as_mut() {
            if *n == 0 {
                return Err(MockError);
            }
            *n -= 1;
        }
        assert!(data.len() <= self.max_transfer, "transfer exceeds bus limit");
        self.log.push(BusEvent::Spi(data.to_vec()));
        Ok(())
    }

    fn max_transfer_size(&self) -> usize {
        self.max_transfer
    }
}

/// Recording output pin
pub struct MockPin {
    log: BusLog,
    name: &'static str,
    high: bool,
}

impl MockPin {
    pub fn new(log: BusLog, name: &'static str) -> Self {
        Self {
            log,
            name,
            high: false,
        }
    }
}

impl OutputPin for MockPin {
    type Error = MockError;

    fn set_high(&mut self) -> Result<(), MockError> {
        self.high = true;
        self.log.push(BusEvent::Pin {
            name: self.name,
            high: true,
        });
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), MockError> {
        self.high = false;
        self.log.push(BusEvent::Pin {
            name: self.name,
            high: false,
        });
        Ok(())
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}

/// Delay that records instead of sleeping
pub struct MockDelay {
    log: BusLog,
}

impl MockDelay {
    pub fn new(log: BusLog) -> Self {
        Self { log }
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.log.push(BusEvent::Delay(ns as u64));
    }
}

/// I2C bus emulating a 256-byte register file per device
///
/// Writes store `data[1..]` starting at register `data[0]`; reads return
/// consecutive registers from the written start address.
pub struct MockI2c {
    log: BusLog,
    devices: HashMap<u8, [u8; 256]>,
    fail: bool,
}

impl MockI2c {
    pub fn new(log: BusLog) -> Self {
        Self {
            log,
            devices: HashMap::new(),
            fail: false,
        }
    }

    /// Fail every subsequent transaction
    pub fn set_failing(&mut self, fail: bool) {
        self.fail = fail;
    }

    /// Current value of a register
    pub fn register(&self, address: u8, reg: u8) -> u8 {
        self.devices
            .get(&address)
            .map(|regs| regs[reg as usize])
            .unwrap_or(0)
    }

    /// Preload a register without logging
    pub fn preset(&mut self, address: u8, reg: u8, value: u8) {
        self.devices.entry(address).or_insert([0; 256])[reg as usize] = value;
    }
}

impl I2cBus for MockI2c {
    type Error = MockError;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), MockError> {
        if self.fail {
            return Err(MockError);
        }
        self.log.push(BusEvent::I2cWrite(address, data.to_vec()));
        if let Some((&start, values)) = data.split_first() {
            let regs = self.devices.entry(address).or_insert([0; 256]);
            for (i, v) in values.iter().enumerate() {
                regs[(start as usize + i) & 0xFF] = *v;
            }
        }
        Ok(())
    }

    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), MockError> {
        if self.fail {
            return Err(MockError);
        }
        let start = write_data.first().copied().unwrap_or(0) as usize;
        let regs = self.devices.entry(address).or_insert([0; 256]);
        for (i, slot) in read_buf.iter_mut().enumerate() {
            *slot = regs[(start + i) & 0xFF];
        }
        Ok(())
    }
}
