use anyhow::Result;
use rand::SeedableRng;
use rand::rngs::StdRng;

use perception_kiosk::config::{
    BME280_ADDR, GPIO_CONFIRM_BUTTON, GPIO_ENCODER_A, GPIO_ENCODER_B, GPIO_KNOB_BLUE,
    GPIO_KNOB_GREEN, GPIO_KNOB_RED, SERVO_PWM_PIN,
};
use perception_kiosk::console::{ConsoleDisplay, ConsoleLamps, ConsoleRelays};
use perception_kiosk::gpio_input::{DebouncedButton, QuadratureEncoder, RgbKnobLed};
use perception_kiosk::peripherals::{Peripherals, SystemClock, TemperatureSensor};
use perception_kiosk::pwm::ServoGauge;
use perception_kiosk::temp_sensor::Bme280;
use perception_kiosk::{KioskConfig, RoundController};

// Flow:
//  Table menu  → turn knob to pick the table, push
//  Mode menu   → turn knob to pick the game, push
//  Instructions → table powered, lamp lit, push to start
//  Guessing    → turn knob, push to lock the guess in
//  Result      → accuracy on screen and gauge, push to go back to the table menu
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Starting perception kiosk...");

    // Validated by the controller before the first round.
    let config = KioskConfig::default();

    // The kiosk still runs the other games without a thermometer.
    let sensor: Option<Box<dyn TemperatureSensor>> = match Bme280::new() {
        Ok(sensor) => Some(Box::new(sensor)),
        Err(e) => {
            log::error!("BME280 at address 0x{BME280_ADDR:02X} failed to start: {e:#}");
            None
        }
    };

    let hw = Peripherals {
        encoder: Box::new(QuadratureEncoder::new()?),
        button: Box::new(DebouncedButton::new()?),
        display: Box::new(ConsoleDisplay::new()),
        lamps: Box::new(ConsoleLamps::new()),
        relays: Box::new(ConsoleRelays::new()),
        sensor,
        gauge: Box::new(ServoGauge::new()?),
        knob: Box::new(RgbKnobLed::new()?),
    };

    log::info!("GPIO initialized:");
    log::info!("  Encoder A/B:    GPIO {GPIO_ENCODER_A}/{GPIO_ENCODER_B}");
    log::info!("  Confirm button: GPIO {GPIO_CONFIRM_BUTTON}");
    log::info!("  Knob LED R/G/B: GPIO {GPIO_KNOB_RED}/{GPIO_KNOB_GREEN}/{GPIO_KNOB_BLUE}");
    log::info!("  Gauge servo:    GPIO {SERVO_PWM_PIN}");

    let mut controller = RoundController::new(
        config,
        hw,
        Box::new(SystemClock::new()),
        StdRng::from_entropy(),
    )?;
    controller.run()
}
