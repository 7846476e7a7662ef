//! Raw encoder ticks to bounded domain values.
//!
//! The encoder counter is unbounded, so a player can spin far past either end
//! of a range. Instead of making them spin all the way back, every
//! out-of-range read comes with the tick count that lands exactly on the
//! corrected value; the caller writes it back to the encoder.

use anyhow::{Result, ensure};

use crate::domain::DomainRange;

/// Result of mapping one encoder read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappedGuess {
    /// Always inside the domain.
    pub value: i32,
    /// Tick count to write back to the encoder, when the read was out of range.
    pub reseed: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputMapper {
    domain: DomainRange,
    ticks_per_step: i32,
    step: i32,
}

impl InputMapper {
    /// `ticks_per_step` raw ticks move the value by `step` domain units.
    /// Zero ticks map to `domain.min()`.
    pub fn new(domain: DomainRange, ticks_per_step: i32, step: i32) -> Result<Self> {
        ensure!(domain.span() > 0, "domain {domain} is empty");
        ensure!(ticks_per_step > 0, "ticks per step must be positive");
        ensure!(step > 0, "step must be positive");
        ensure!(
            domain.span() % step == 0,
            "step {step} does not divide domain {domain}"
        );
        Ok(Self {
            domain,
            ticks_per_step,
            step,
        })
    }

    pub fn domain(&self) -> DomainRange {
        self.domain
    }

    /// Domain units per raw tick.
    pub fn scale(&self) -> f64 {
        self.step as f64 / self.ticks_per_step as f64
    }

    /// Map a raw tick count into the domain.
    ///
    /// Partial steps truncate toward zero, so a knob nudged just below zero
    /// still reads `min` without a reseed.
    pub fn read_guess(&self, raw_ticks: i32) -> MappedGuess {
        let min = i64::from(self.domain.min());
        let max = i64::from(self.domain.max());
        let steps = i64::from(raw_ticks / self.ticks_per_step);
        let candidate = min + steps * i64::from(self.step);

        let corrected = if self.domain.is_cyclic() {
            if candidate < max && candidate >= min {
                None
            } else {
                Some(min + (candidate - min).rem_euclid(max - min))
            }
        } else if candidate < min {
            Some(min)
        } else if candidate > max {
            Some(max)
        } else {
            None
        };

        match corrected {
            // Bounded by the domain, which is i32.
            Some(value) => {
                let value = value as i32;
                MappedGuess {
                    value,
                    reseed: Some(self.ticks_for(value)),
                }
            }
            None => MappedGuess {
                value: candidate as i32,
                reseed: None,
            },
        }
    }

    /// Raw tick count that reads back as `value`.
    pub fn ticks_for(&self, value: i32) -> i32 {
        ((value - self.domain.min()) / self.step) * self.ticks_per_step
    }
}
