pub mod mock_gpio;
pub mod mock_peripherals;
pub mod mock_pwm;
