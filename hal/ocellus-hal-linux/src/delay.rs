//! Thread-sleeping delay

use std::thread;
use std::time::Duration;

use embedded_hal::delay::DelayNs;

/// Blocking delay backed by `thread::sleep`
///
/// Only used during bring-up sequences (panel reset, PWM oscillator
/// settle) where blocking the calling thread for a few ms is acceptable.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(ns as u64));
    }

    fn delay_ms(&mut self, ms: u32) {
        thread::sleep(Duration::from_millis(ms as u64));
    }
}
