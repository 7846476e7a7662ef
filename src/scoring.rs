//! Accuracy scoring.
//!
//! Hue lives on a circle, so its distance wraps around; line position and
//! temperature use plain absolute distance normalized by a reference length.
//! The linear scores are not clamped: a guess further off than the reference
//! length scores below zero, and that is reported as-is.

use std::fmt;

use crate::domain::DomainRange;
use crate::target::{LineSegment, Target};

/// Final result of a round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    /// Accuracy in percent. At most 100, possibly negative for linear modes.
    Scored(f64),
    /// The temperature sensor was not trusted for this round.
    SensorUnavailable,
}

impl Outcome {
    pub fn percent(&self) -> Option<f64> {
        match self {
            Outcome::Scored(percent) => Some(*percent),
            Outcome::SensorUnavailable => None,
        }
    }

    /// Gauge needle position: rounded and limited to the dial.
    pub fn gauge_position(&self) -> u8 {
        match self {
            Outcome::Scored(percent) => percent.round().clamp(0.0, 100.0) as u8,
            Outcome::SensorUnavailable => 0,
        }
    }

    pub fn celebrates(&self, threshold: f64) -> bool {
        self.percent().is_some_and(|percent| percent > threshold)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Scored(percent) => write!(f, "{:.1}%", percent),
            Outcome::SensorUnavailable => write!(f, "sensor unavailable"),
        }
    }
}

/// Hue accuracy in percent, 100 for a match and 0 for the antipode.
///
/// `delta` is the forward distance from target to guess. Whichever way
/// round is shorter decides the raw fraction, which lands in `[0.5, 1.0]`
/// and is then stretched to `[0, 1]`. A delta of exactly half the range
/// takes the first branch.
pub fn hue_accuracy(target: i32, guess: i32, range: i32) -> f64 {
    let delta = (guess - target).rem_euclid(range);
    let range_f = f64::from(range);
    let raw = if delta <= range / 2 {
        (range_f - f64::from(delta)) / range_f
    } else {
        f64::from(delta) / range_f
    };
    let rescaled = (raw - 0.5) / 0.5;
    log::debug!(
        "delta: {}, accuracy: {:.3}, converted: {:.3}",
        delta,
        raw,
        rescaled
    );
    rescaled * 100.0
}

/// Midpoint accuracy for a marker `guess_offset` pixels right of the
/// segment start, relative to half the segment length.
pub fn midpoint_accuracy(line: &LineSegment, guess_offset: i32) -> f64 {
    let half_length = line.length() / 2.0;
    let (guess_x, _) = line.point_at(guess_offset);
    let miss = (line.mid_x() - guess_x).abs();
    (half_length - miss) / half_length * 100.0
}

/// Temperature accuracy relative to the width of the guessing range.
pub fn temperature_accuracy(actual: i32, guess: i32, domain: DomainRange) -> f64 {
    let range = f64::from(domain.span());
    let miss = f64::from((actual - guess).abs());
    (range - miss) / range * 100.0
}

/// Score `guess` against `target`. `domain` is the guessing domain of the round.
pub fn score(target: &Target, guess: i32, domain: DomainRange) -> Outcome {
    match target {
        Target::Hue(hue) => Outcome::Scored(hue_accuracy(*hue, guess, domain.span())),
        Target::Midpoint(line) => Outcome::Scored(midpoint_accuracy(line, guess)),
        Target::Temperature(actual) => {
            Outcome::Scored(temperature_accuracy(*actual, guess, domain))
        }
        Target::Unavailable => Outcome::SensorUnavailable,
    }
}
