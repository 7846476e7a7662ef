//! Collaborators the round controller drives.
//!
//! The controller only talks to hardware through these traits. The GPIO,
//! PWM and I2C drivers in this crate implement the ones wired to the board;
//! the lamps, relays and display are external and have console stand-ins.

use anyhow::Result;

use crate::target::Point;

pub trait RotaryEncoder {
    /// Signed raw tick count since the last write.
    fn read(&mut self) -> i32;

    /// Re-seed the tick counter.
    fn write(&mut self, ticks: i32);

    /// Sample the quadrature lines. Called between ticks while idling.
    fn service(&mut self) {}
}

pub trait ConfirmButton {
    /// True once per physical press.
    fn is_confirmed(&mut self) -> bool;

    /// Sample the button line. Called between ticks while idling.
    fn service(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSize {
    Normal,
    Large,
}

pub trait Display {
    fn clear(&mut self);
    fn text(&mut self, origin: Point, size: TextSize, text: &str);
    fn line(&mut self, from: Point, to: Point);
    /// Push the composed frame to the panel.
    fn present(&mut self) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LampState {
    Off,
    On {
        hue: i32,
        saturation: u8,
        brightness: u8,
    },
}

/// Colored lamps, indexed from 1.
pub trait Lamps {
    fn set(&mut self, lamp: u8, state: LampState) -> Result<()>;
}

/// Per-table power switches, indexed from 0.
pub trait Relays {
    fn set(&mut self, relay: u8, on: bool) -> Result<()>;
}

pub trait TemperatureSensor {
    fn read_celsius(&mut self) -> Result<f64>;
}

/// Analog needle showing the last accuracy.
pub trait Gauge {
    /// `percent` is 0..=100; larger values are limited to the dial.
    fn set_position(&mut self, percent: u8) -> Result<()>;
}

/// Colors the knob LED can show by mixing its three channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnobColor {
    Off,
    Red,
    Yellow,
    Green,
    Cyan,
    Blue,
    Magenta,
}

impl KnobColor {
    /// Rainbow sequence used for celebrations and the lightshow.
    pub const RAINBOW: [KnobColor; 6] = [
        KnobColor::Red,
        KnobColor::Yellow,
        KnobColor::Green,
        KnobColor::Cyan,
        KnobColor::Blue,
        KnobColor::Magenta,
    ];

    /// Which of the red, green and blue channels are lit.
    pub fn channels(&self) -> (bool, bool, bool) {
        match self {
            KnobColor::Off => (false, false, false),
            KnobColor::Red => (true, false, false),
            KnobColor::Yellow => (true, true, false),
            KnobColor::Green => (false, true, false),
            KnobColor::Cyan => (false, true, true),
            KnobColor::Blue => (false, false, true),
            KnobColor::Magenta => (true, false, true),
        }
    }
}

pub trait KnobLed {
    fn set(&mut self, color: KnobColor) -> Result<()>;
}

/// Monotonic time source for the polling loop.
pub trait Clock {
    fn now_ms(&self) -> u64;
    fn sleep_ms(&mut self, ms: u64);
}

/// Wall clock backed by `std::time`.
pub struct SystemClock {
    start: std::time::Instant,
}

impl SystemClock {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            start: std::time::Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    fn sleep_ms(&mut self, ms: u64) {
        std::thread::sleep(std::time::Duration::from_millis(ms));
    }
}

/// Everything the controller drives, owned for the lifetime of the loop.
pub struct Peripherals {
    pub encoder: Box<dyn RotaryEncoder>,
    pub button: Box<dyn ConfirmButton>,
    pub display: Box<dyn Display>,
    pub lamps: Box<dyn Lamps>,
    pub relays: Box<dyn Relays>,
    /// `None` when the sensor failed to start.
    pub sensor: Option<Box<dyn TemperatureSensor>>,
    pub gauge: Box<dyn Gauge>,
    pub knob: Box<dyn KnobLed>,
}
