//! Breathing ramp generator
//!
//! A breathing pattern ramps a channel's duty from `low` up to `high` in
//! `step_up` increments, then back down in `step_down` increments, forever.
//! The generator is pure: the caller decides the step interval and checks
//! for cancellation between steps.

use ocellus_core::traits::PWM_MAX;

/// Why a pattern was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BreathError {
    #[error("range low {low} above high {high}")]
    InvertedRange { low: u16, high: u16 },
}

/// Validated breathing parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreathPattern {
    step_up: u16,
    step_down: u16,
    low: u16,
    high: u16,
}

impl BreathPattern {
    /// Range ends are clamped to 12 bits; an inverted range is an error
    pub fn new(step_up: u16, step_down: u16, low: u16, high: u16) -> Result<Self, BreathError> {
        let (low, high) = (low.min(PWM_MAX), high.min(PWM_MAX));
        if low > high {
            return Err(BreathError::InvertedRange { low, high });
        }
        Ok(Self {
            step_up,
            step_down,
            low,
            high,
        })
    }

    pub fn low(&self) -> u16 {
        self.low
    }

    pub fn high(&self) -> u16 {
        self.high
    }

    /// A zero rising step never moves; the worker just idles
    pub fn is_idle(&self) -> bool {
        self.step_up == 0
    }
}

/// Iterator over the duty values of a pattern
///
/// Starts at `low`. A zero falling step drops straight back to `low`
/// after reaching `high` (sawtooth). Idle patterns yield nothing.
#[derive(Debug, Clone)]
pub struct BreathRamp {
    pattern: BreathPattern,
    value: u16,
    rising: bool,
}

impl BreathRamp {
    pub fn new(pattern: BreathPattern) -> Self {
        Self {
            pattern,
            value: pattern.low,
            rising: true,
        }
    }

    pub fn pattern(&self) -> &BreathPattern {
        &self.pattern
    }
}

impl Iterator for BreathRamp {
    type Item = u16;

    fn next(&mut self) -> Option<u16> {
        let p = self.pattern;
        if p.is_idle() {
            return None;
        }
        let current = self.value;
        if self.rising {
            let next = current.saturating_add(p.step_up);
            if next >= p.high {
                self.value = p.high;
                self.rising = false;
            } else {
                self.value = next;
            }
        } else if p.step_down == 0 {
            self.value = p.low;
            self.rising = true;
        } else {
            let next = current.saturating_sub(p.step_down);
            if next <= p.low {
                self.value = p.low;
                self.rising = true;
            } else {
                self.value = next;
            }
        }
        Some(current)
    }
}
