// This file is only compiled during tests

use std::cell::RefCell;
use std::collections::HashMap;

use anyhow::{Result, anyhow};

use crate::peripherals::{
    Clock, ConfirmButton, Display, Gauge, KnobColor, KnobLed, LampState, Lamps, Peripherals,
    Relays, RotaryEncoder, TemperatureSensor, TextSize,
};
use crate::target::Point;

/// Everything a test can poke at or inspect, shared by all mock devices.
#[derive(Default)]
struct Bench {
    encoder_ticks: i32,
    encoder_writes: Vec<i32>,
    pending_presses: u32,
    frame: Vec<String>,
    shown: Vec<String>,
    lamps: HashMap<u8, LampState>,
    relays: HashMap<u8, bool>,
    gauge: Option<u8>,
    knob: Option<KnobColor>,
    celsius: Option<f64>,
    now_ms: u64,
}

thread_local! {
    static BENCH: RefCell<Bench> = RefCell::new(Bench::default());
}

fn with_bench<T>(f: impl FnOnce(&mut Bench) -> T) -> T {
    BENCH.with(|bench| f(&mut bench.borrow_mut()))
}

pub struct MockEncoder;

impl RotaryEncoder for MockEncoder {
    fn read(&mut self) -> i32 {
        with_bench(|b| b.encoder_ticks)
    }

    fn write(&mut self, ticks: i32) {
        with_bench(|b| {
            b.encoder_ticks = ticks;
            b.encoder_writes.push(ticks);
        });
    }
}

pub struct MockButton;

impl ConfirmButton for MockButton {
    fn is_confirmed(&mut self) -> bool {
        with_bench(|b| {
            if b.pending_presses > 0 {
                b.pending_presses -= 1;
                true
            } else {
                false
            }
        })
    }
}

pub struct MockDisplay;

impl Display for MockDisplay {
    fn clear(&mut self) {
        with_bench(|b| b.frame.clear());
    }

    fn text(&mut self, _origin: Point, _size: TextSize, text: &str) {
        with_bench(|b| b.frame.push(text.to_string()));
    }

    fn line(&mut self, from: Point, to: Point) {
        with_bench(|b| b.frame.push(format!("line {from}-{to}")));
    }

    fn present(&mut self) -> Result<()> {
        with_bench(|b| b.shown = b.frame.clone());
        Ok(())
    }
}

pub struct MockLamps;

impl Lamps for MockLamps {
    fn set(&mut self, lamp: u8, state: LampState) -> Result<()> {
        with_bench(|b| b.lamps.insert(lamp, state));
        Ok(())
    }
}

pub struct MockRelays;

impl Relays for MockRelays {
    fn set(&mut self, relay: u8, on: bool) -> Result<()> {
        with_bench(|b| b.relays.insert(relay, on));
        Ok(())
    }
}

pub struct MockSensor;

impl TemperatureSensor for MockSensor {
    fn read_celsius(&mut self) -> Result<f64> {
        with_bench(|b| b.celsius).ok_or_else(|| anyhow!("mock sensor not responding"))
    }
}

pub struct MockGauge;

impl Gauge for MockGauge {
    fn set_position(&mut self, percent: u8) -> Result<()> {
        with_bench(|b| b.gauge = Some(percent));
        Ok(())
    }
}

pub struct MockKnob;

impl KnobLed for MockKnob {
    fn set(&mut self, color: KnobColor) -> Result<()> {
        with_bench(|b| b.knob = Some(color));
        Ok(())
    }
}

/// Time only moves when the controller sleeps.
pub struct MockClock;

impl Clock for MockClock {
    fn now_ms(&self) -> u64 {
        with_bench(|b| b.now_ms)
    }

    fn sleep_ms(&mut self, ms: u64) {
        with_bench(|b| b.now_ms += ms);
    }
}

/// A full set of mock devices. Without `with_sensor` the sensor counts as
/// having failed at startup.
pub fn peripherals(with_sensor: bool) -> Peripherals {
    let sensor: Option<Box<dyn TemperatureSensor>> = if with_sensor {
        Some(Box::new(MockSensor))
    } else {
        None
    };
    Peripherals {
        encoder: Box::new(MockEncoder),
        button: Box::new(MockButton),
        display: Box::new(MockDisplay),
        lamps: Box::new(MockLamps),
        relays: Box::new(MockRelays),
        sensor,
        gauge: Box::new(MockGauge),
        knob: Box::new(MockKnob),
    }
}

// test helpers
pub fn reset_bench() {
    with_bench(|b| *b = Bench::default());
}

pub fn turn_to(ticks: i32) {
    with_bench(|b| b.encoder_ticks = ticks);
}

pub fn encoder_ticks() -> i32 {
    with_bench(|b| b.encoder_ticks)
}

pub fn encoder_writes() -> Vec<i32> {
    with_bench(|b| b.encoder_writes.clone())
}

pub fn press() {
    with_bench(|b| b.pending_presses += 1);
}

pub fn shown() -> Vec<String> {
    with_bench(|b| b.shown.clone())
}

pub fn screen_contains(text: &str) -> bool {
    with_bench(|b| b.shown.iter().any(|line| line.contains(text)))
}

pub fn lamp(id: u8) -> Option<LampState> {
    with_bench(|b| b.lamps.get(&id).copied())
}

pub fn relay(id: u8) -> Option<bool> {
    with_bench(|b| b.relays.get(&id).copied())
}

pub fn gauge() -> Option<u8> {
    with_bench(|b| b.gauge)
}

pub fn knob() -> Option<KnobColor> {
    with_bench(|b| b.knob)
}

pub fn set_sensor_celsius(celsius: Option<f64>) {
    with_bench(|b| b.celsius = celsius);
}
