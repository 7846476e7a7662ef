use std::time::{Duration, Instant};

use anyhow::Result;

// Use rppal in production
#[cfg(not(test))]
use rppal::gpio::{Gpio, InputPin, Level, OutputPin};

#[cfg(test)]
// This is only used in testing, not compiled in release.
use crate::mocks::mock_gpio::{Gpio, InputPin, Level, OutputPin};

use crate::config::{
    BUTTON_DEBOUNCE_MS, GPIO_CONFIRM_BUTTON, GPIO_ENCODER_A, GPIO_ENCODER_B, GPIO_KNOB_BLUE,
    GPIO_KNOB_GREEN, GPIO_KNOB_RED,
};
use crate::peripherals::{ConfirmButton, KnobColor, KnobLed, RotaryEncoder};

/// Tick delta indexed by `(previous_state << 2) | current_state`, where a
/// state is `(A << 1) | B`. Invalid double steps count as zero.
const QUADRATURE_STEPS: [i32; 16] = [0, 1, -1, 0, -1, 0, 0, 1, 1, 0, 0, -1, 0, -1, 1, 0];

/// Polled quadrature decoder for the knob.
///
/// Every A/B edge is one tick, so one detent on a typical knob is four ticks.
/// Edges are only seen when `service` runs; the control loop calls it every
/// millisecond while idling.
pub struct QuadratureEncoder {
    pin_a: InputPin,
    pin_b: InputPin,
    state: u8,
    ticks: i32,
}

impl QuadratureEncoder {
    pub fn new() -> Result<Self> {
        Self::with_pins(GPIO_ENCODER_A, GPIO_ENCODER_B)
    }

    pub fn with_pins(pin_a: u8, pin_b: u8) -> Result<Self> {
        let gpio = Gpio::new()?;

        let pin_a = gpio.get(pin_a)?.into_input_pullup();
        let pin_b = gpio.get(pin_b)?.into_input_pullup();

        let mut encoder = Self {
            pin_a,
            pin_b,
            state: 0,
            ticks: 0,
        };
        encoder.state = encoder.sample();
        Ok(encoder)
    }

    fn sample(&self) -> u8 {
        let a = u8::from(self.pin_a.read() == Level::High);
        let b = u8::from(self.pin_b.read() == Level::High);
        (a << 1) | b
    }
}

impl RotaryEncoder for QuadratureEncoder {
    fn read(&mut self) -> i32 {
        self.service();
        self.ticks
    }

    fn write(&mut self, ticks: i32) {
        self.state = self.sample();
        self.ticks = ticks;
    }

    fn service(&mut self) {
        let current = self.sample();
        if current != self.state {
            let index = usize::from((self.state << 2) | current);
            self.ticks = self.ticks.wrapping_add(QUADRATURE_STEPS[index]);
            self.state = current;
        }
    }
}

/// Push button wired active low with the internal pull-up.
///
/// A level has to hold for the debounce window before it counts; each
/// settled press latches one confirm.
pub struct DebouncedButton {
    pin: InputPin,
    debounce: Duration,
    last_raw: bool,
    last_change: Instant,
    pressed: bool,
    latched: bool,
}

impl DebouncedButton {
    pub fn new() -> Result<Self> {
        Self::with_pin(GPIO_CONFIRM_BUTTON, Duration::from_millis(BUTTON_DEBOUNCE_MS))
    }

    pub fn with_pin(pin: u8, debounce: Duration) -> Result<Self> {
        let gpio = Gpio::new()?;
        let pin = gpio.get(pin)?.into_input_pullup();
        let pressed = pin.read() == Level::Low;

        Ok(Self {
            pin,
            debounce,
            last_raw: pressed,
            last_change: Instant::now(),
            // Held at boot: wait for a release before the first confirm.
            pressed,
            latched: false,
        })
    }
}

impl ConfirmButton for DebouncedButton {
    fn is_confirmed(&mut self) -> bool {
        self.service();
        std::mem::take(&mut self.latched)
    }

    fn service(&mut self) {
        let raw = self.pin.read() == Level::Low;
        let now = Instant::now();

        if raw != self.last_raw {
            self.last_raw = raw;
            self.last_change = now;
            return;
        }

        if raw != self.pressed && now.duration_since(self.last_change) >= self.debounce {
            self.pressed = raw;
            if raw {
                self.latched = true;
            }
        }
    }
}

/// Common-anode RGB LED in the knob: a LOW pin lights its channel.
pub struct RgbKnobLed {
    red: OutputPin,
    green: OutputPin,
    blue: OutputPin,
}

impl RgbKnobLed {
    pub fn new() -> Result<Self> {
        Self::with_pins(GPIO_KNOB_RED, GPIO_KNOB_GREEN, GPIO_KNOB_BLUE)
    }

    pub fn with_pins(red: u8, green: u8, blue: u8) -> Result<Self> {
        let gpio = Gpio::new()?;
        Ok(Self {
            red: gpio.get(red)?.into_output_high(),
            green: gpio.get(green)?.into_output_high(),
            blue: gpio.get(blue)?.into_output_high(),
        })
    }
}

fn drive(pin: &mut OutputPin, lit: bool) {
    if lit {
        pin.set_low();
    } else {
        pin.set_high();
    }
}

impl KnobLed for RgbKnobLed {
    fn set(&mut self, color: KnobColor) -> Result<()> {
        let (red, green, blue) = color.channels();
        drive(&mut self.red, red);
        drive(&mut self.green, green);
        drive(&mut self.blue, blue);
        Ok(())
    }
}
