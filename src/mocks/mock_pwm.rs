// This file is only compiled during tests

use std::cell::RefCell;

use anyhow::Result;

thread_local! {
    static MOCK_PWM_DUTY: RefCell<f64> = const { RefCell::new(0.0) };
    static MOCK_PWM_ENABLED: RefCell<bool> = const { RefCell::new(true) };
}

pub struct Pwm {
    pin: u8,
}

impl Pwm {
    pub fn new(pin: u8) -> Result<Self> {
        MOCK_PWM_ENABLED.with(|enabled| *enabled.borrow_mut() = true);
        Ok(Pwm { pin })
    }

    pub fn set_duty_cycle(&self, duty_cycle: f64) -> Result<()> {
        MOCK_PWM_DUTY.with(|duty| {
            *duty.borrow_mut() = duty_cycle;
        });
        println!(
            "[Mock PWM {}] Duty cycle set to {:.4}",
            self.pin, duty_cycle
        );
        Ok(())
    }

    pub fn disable(&self) -> Result<()> {
        MOCK_PWM_ENABLED.with(|enabled| *enabled.borrow_mut() = false);
        println!("[Mock PWM {}] Disabled", self.pin);
        Ok(())
    }
}

// Test helpers
pub fn get_mock_duty_cycle() -> f64 {
    MOCK_PWM_DUTY.with(|duty| *duty.borrow())
}

pub fn is_mock_pwm_enabled() -> bool {
    MOCK_PWM_ENABLED.with(|enabled| *enabled.borrow())
}
