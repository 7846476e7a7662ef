pub mod config;
pub mod console;
pub mod controller;
pub mod domain;
pub mod gpio_input;
pub mod input_mapper;
pub mod peripherals;
pub mod pwm;
pub mod round;
pub mod scoring;
pub mod screens;
pub mod target;
pub mod temp_sensor;

// Re-export commonly used types
pub use config::KioskConfig;
pub use controller::{Phase, RoundController};
pub use domain::{DomainRange, GameMode};
pub use input_mapper::{InputMapper, MappedGuess};
pub use round::{Round, Session};
pub use scoring::Outcome;
pub use target::{LineSegment, Point, Target};

#[cfg(test)]
pub(crate) mod mocks;
