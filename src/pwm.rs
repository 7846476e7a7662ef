use anyhow::{Result, bail};

// Use rppal in production
#[cfg(not(test))]
use rppal::pwm::{Channel, Polarity, Pwm};

// Mock PWM for testing
#[cfg(test)]
use crate::mocks::mock_pwm::Pwm;

use crate::config::{
    SERVO_FREQUENCY_HZ, SERVO_MAX_ANGLE, SERVO_MAX_PULSE_US, SERVO_MIN_PULSE_US, SERVO_PWM_PIN,
};
use crate::peripherals::Gauge;

/// Accuracy needle on a hobby servo.
///
/// The dial is printed so that one degree of servo travel is one percent:
/// 0% sits at 0° and 100% at 100°.
pub struct ServoGauge {
    pwm: Pwm,
}

impl ServoGauge {
    /// Create a new gauge on the default PWM pin
    pub fn new() -> Result<Self> {
        Self::with_pin(SERVO_PWM_PIN)
    }

    /// Create a gauge on a custom GPIO pin
    pub fn with_pin(pin: u8) -> Result<Self> {
        #[cfg(not(test))]
        let channel = match pin {
            12 | 18 => Channel::Pwm0,
            13 | 19 => Channel::Pwm1,
            _ => bail!("Invalid PWM pin {pin}. Use 12, 13, 18, or 19"),
        };

        #[cfg(not(test))]
        let pwm = Pwm::with_frequency(
            channel,
            SERVO_FREQUENCY_HZ,
            duty_cycle_for_angle(0.0),
            Polarity::Normal,
            true, // enabled
        )?;

        #[cfg(test)]
        let pwm = {
            if !matches!(pin, 12 | 13 | 18 | 19) {
                bail!("Invalid PWM pin {pin}. Use 12, 13, 18, or 19");
            }
            Pwm::new(pin)?
        };

        log::info!("✓ Accuracy gauge on GPIO {pin}");
        Ok(Self { pwm })
    }

    /// Set servo position in degrees (0 to SERVO_MAX_ANGLE)
    pub fn set_angle(&mut self, angle: f64) -> Result<()> {
        self.pwm.set_duty_cycle(duty_cycle_for_angle(angle))?;
        Ok(())
    }

    /// Disable PWM output
    pub fn disable(&mut self) -> Result<()> {
        self.pwm.disable()?;
        Ok(())
    }
}

/// Duty cycle for a servo angle, clamped to the mechanical range.
///
/// 0° → 1000μs, SERVO_MAX_ANGLE → 2000μs, in a 20ms period at 50Hz.
pub fn duty_cycle_for_angle(angle: f64) -> f64 {
    let clamped_angle = angle.clamp(0.0, SERVO_MAX_ANGLE);
    let pulse_us = SERVO_MIN_PULSE_US
        + (clamped_angle / SERVO_MAX_ANGLE) * (SERVO_MAX_PULSE_US - SERVO_MIN_PULSE_US);
    let period_us = 1_000_000.0 / SERVO_FREQUENCY_HZ;
    pulse_us / period_us
}

impl Gauge for ServoGauge {
    fn set_position(&mut self, percent: u8) -> Result<()> {
        self.set_angle(f64::from(percent.min(100)))
    }
}

impl Drop for ServoGauge {
    fn drop(&mut self) {
        // Ensure PWM is disabled when dropped
        let _ = self.disable();
    }
}
