use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;

use perception_kiosk::config::TICKS_PER_DETENT;
use perception_kiosk::gpio_input::{DebouncedButton, QuadratureEncoder, RgbKnobLed};
use perception_kiosk::peripherals::{
    ConfirmButton, Gauge, KnobColor, KnobLed, RotaryEncoder, TemperatureSensor,
};
use perception_kiosk::pwm::ServoGauge;
use perception_kiosk::target::celsius_to_fahrenheit;
use perception_kiosk::temp_sensor::Bme280;

const SWEEP_STEP: u8 = 10;
const SENSOR_PERIOD: Duration = Duration::from_secs(1);

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("╔══════════════════════════════════════════════════════╗");
    println!("║     Kiosk Bench Check                                ║");
    println!("╚══════════════════════════════════════════════════════╝\n");

    println!("Instructions:");
    println!("1. Turn the knob one detent at a time in both directions");
    println!("2. Each detent should move the count by {TICKS_PER_DETENT} ticks");
    println!("3. Push the knob to step the gauge needle by {SWEEP_STEP}%");
    println!("4. Compare the temperature column with a room thermometer");
    println!("5. Press Ctrl+C when done\n");

    let mut encoder = QuadratureEncoder::new()?;
    let mut button = DebouncedButton::new()?;
    let mut knob = RgbKnobLed::new()?;
    let mut gauge = ServoGauge::new()?;
    let mut sensor = match Bme280::new() {
        Ok(sensor) => Some(sensor),
        Err(e) => {
            log::error!("BME280 unavailable: {e:#}");
            None
        }
    };

    gauge.set_position(0)?;
    knob.set(KnobColor::Blue)?;

    let mut last_ticks = encoder.read();
    let mut tick_min = last_ticks;
    let mut tick_max = last_ticks;
    let mut sweep: u8 = 0;
    let mut last_sensor_read: Option<Instant> = None;

    println!(
        "{:^8} | {:^8} | {:^17} | {:^6} | {:^12}",
        "Ticks", "Detents", "Seen Range", "Gauge", "Temperature"
    );
    println!("{:-<8}-+-{:-<8}-+-{:-<17}-+-{:-<6}-+-{:-<12}", "", "", "", "", "");

    let mut temperature = String::from("n/a");
    loop {
        encoder.service();
        button.service();

        let mut changed = false;

        let ticks = encoder.read();
        if ticks != last_ticks {
            last_ticks = ticks;
            tick_min = tick_min.min(ticks);
            tick_max = tick_max.max(ticks);
            changed = true;
        }

        if button.is_confirmed() {
            sweep = if sweep >= 100 { 0 } else { sweep + SWEEP_STEP };
            gauge.set_position(sweep)?;
            let color = KnobColor::RAINBOW[usize::from(sweep / SWEEP_STEP) % KnobColor::RAINBOW.len()];
            knob.set(color)?;
            changed = true;
        }

        if last_sensor_read.is_none_or(|at| at.elapsed() >= SENSOR_PERIOD) {
            last_sensor_read = Some(Instant::now());
            if let Some(sensor) = sensor.as_mut() {
                temperature = match sensor.read_celsius() {
                    Ok(celsius) => format!("{:.1} °F", celsius_to_fahrenheit(celsius)),
                    Err(e) => {
                        log::warn!("Sensor read failed: {e:#}");
                        String::from("error")
                    }
                };
                changed = true;
            }
        }

        if changed {
            println!(
                "{:>8} | {:>8.2} | {:>7} to {:>6} | {:>5}% | {:>12}",
                ticks,
                f64::from(ticks) / f64::from(TICKS_PER_DETENT),
                tick_min,
                tick_max,
                sweep,
                temperature
            );
        }

        thread::sleep(Duration::from_millis(1));
    }
}
