use anyhow::{Result, ensure};

use crate::domain::{DomainRange, GameMode};
use crate::input_mapper::InputMapper;

// ** GPIO CONFIGURATION ** //

/// Rotary encoder quadrature channels (BCM numbering).
pub const GPIO_ENCODER_A: u8 = 17;
pub const GPIO_ENCODER_B: u8 = 27;
/// Push button on the encoder shaft, active low with pull-up.
pub const GPIO_CONFIRM_BUTTON: u8 = 22;
/// Knob RGB LED, common anode: driving a pin LOW lights that channel.
pub const GPIO_KNOB_RED: u8 = 5;
pub const GPIO_KNOB_GREEN: u8 = 6;
pub const GPIO_KNOB_BLUE: u8 = 13;
/// Button level must hold this long before an edge counts.
pub const BUTTON_DEBOUNCE_MS: u64 = 20;

// ** I2C CONFIGURATION ** //

/// BME280 with SDO tied to ground.
pub const BME280_ADDR: u16 = 0x76;

//  ** SERVO CONFIGURATION ** //

/// GPIO PWM channel for the accuracy gauge
/// - GPIO 18 (PWM0) - Most commonly used
pub const SERVO_PWM_PIN: u8 = 18;
/// Standard servo pulse width range (microseconds)
pub const SERVO_MIN_PULSE_US: f64 = 1000.0;
pub const SERVO_MAX_PULSE_US: f64 = 2000.0;
/// Standard servo PWM frequency (Hz)
pub const SERVO_FREQUENCY_HZ: f64 = 50.0;
/// Full mechanical travel of the gauge servo (degrees)
pub const SERVO_MAX_ANGLE: f64 = 180.0;
/// Needle position at the start of every loop (percent).
pub const GAUGE_START_POSITION: u8 = 0;

// ** ENCODER CONFIGURATION ** //

/// Quadrature transitions per mechanical detent.
pub const TICKS_PER_DETENT: i32 = 4;

// ** GAME CONFIGURATION ** //

pub const TABLE_COUNT: u8 = 5;

/// Native hue units of the lamps, cyclic over [0, HUE_RANGE).
pub const HUE_RANGE: i32 = 65350;
/// Hue units per raw encoder tick.
pub const HUE_STEP: i32 = 50;
/// The hue game starts the knob within this many units of the antipode.
pub const HUE_DECOY_SPREAD: i32 = 2000;
pub const LAMP_SATURATION: u8 = 255;
pub const LAMP_BRIGHTNESS: u8 = 255;

/// Temperature guessing range (°F).
pub const TEMP_MIN_F: i32 = 32;
pub const TEMP_MAX_F: i32 = 100;
/// Lamp tint for the temperature preview: cold end to hot end.
pub const TEMP_HUE_COLD: i32 = 45000;
pub const TEMP_HUE_HOT: i32 = 65000;

/// Accuracy (percent) above which the result screen celebrates.
pub const HUE_CELEBRATION_THRESHOLD: f64 = 95.0;
pub const MIDPOINT_CELEBRATION_THRESHOLD: f64 = 90.0;
pub const TEMPERATURE_CELEBRATION_THRESHOLD: f64 = 95.0;

/// Lightshow lamp starting hues, one per lamp.
pub const LIGHTSHOW_START_HUES: [i32; 6] = [0, 11000, 22000, 33000, 44000, 55000];
pub const LIGHTSHOW_HUE_STEP: i32 = 1000;
/// A lamp hue that reaches this value restarts from 0.
pub const LIGHTSHOW_HUE_CEILING: i32 = 65000;

// ** DISPLAY CONFIGURATION ** //

pub const SCREEN_WIDTH: i32 = 128;
pub const SCREEN_HEIGHT: i32 = 64;
/// Midpoint game endpoint bands (pixels, half-open).
pub const LINE_LEFT_X: (i32, i32) = (1, 15);
pub const LINE_RIGHT_X: (i32, i32) = (SCREEN_WIDTH - 15, SCREEN_WIDTH - 1);
pub const LINE_Y: (i32, i32) = (1, SCREEN_HEIGHT - 1);
/// Half height of the midpoint guess marker.
pub const MARKER_HALF_HEIGHT: i32 = 5;

// ** TIMING CONFIGURATION ** //

pub const MENU_REFRESH_MS: u64 = 20;
pub const GUESS_REFRESH_MS: u64 = 100;
pub const RESULT_REFRESH_MS: u64 = 20;
pub const LIGHTSHOW_REFRESH_MS: u64 = 25;
pub const RAINBOW_STEP_MS: u64 = 200;
pub const LIGHTSHOW_STEP_MS: u64 = 150;
/// Spacing between per-table relay and lamp writes.
pub const TABLE_WRITE_SPACING_MS: u64 = 100;
/// Slice length while idling between ticks; encoder and button are sampled once per slice.
pub const INPUT_SERVICE_SLICE_MS: u64 = 1;

/// Per-mode knob mapping and result gating. The domain is supplied by the
/// caller: fixed for hue and temperature, drawn per round for the midpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeSettings {
    pub ticks_per_step: i32,
    pub step: i32,
    pub celebration_threshold: f64,
}

impl ModeSettings {
    pub fn mapper(&self, domain: DomainRange) -> Result<InputMapper> {
        InputMapper::new(domain, self.ticks_per_step, self.step)
    }

    fn validate(&self, mode: GameMode, domain: Option<DomainRange>) -> Result<()> {
        match domain {
            Some(domain) => {
                self.mapper(domain)?;
            }
            None => ensure!(
                self.ticks_per_step > 0 && self.step > 0,
                "{} mapping needs positive ticks per step and step",
                mode.name()
            ),
        }
        ensure!(
            (0.0..=100.0).contains(&self.celebration_threshold),
            "{} celebration threshold {} is outside 0..=100",
            mode.name(),
            self.celebration_threshold
        );
        Ok(())
    }
}

/// Endpoint bands for the midpoint game.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineBands {
    pub left_x: (i32, i32),
    pub right_x: (i32, i32),
    pub y: (i32, i32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct KioskConfig {
    pub table_count: u8,
    pub ticks_per_detent: i32,
    pub hue_domain: DomainRange,
    pub hue: ModeSettings,
    pub hue_decoy_spread: i32,
    pub temperature_domain: DomainRange,
    pub temperature: ModeSettings,
    /// Mapping only: the domain is the width of the line drawn each round.
    pub midpoint: ModeSettings,
    pub line_bands: LineBands,
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            table_count: TABLE_COUNT,
            ticks_per_detent: TICKS_PER_DETENT,
            hue_domain: DomainRange::cyclic(0, HUE_RANGE),
            hue: ModeSettings {
                ticks_per_step: 1,
                step: HUE_STEP,
                celebration_threshold: HUE_CELEBRATION_THRESHOLD,
            },
            hue_decoy_spread: HUE_DECOY_SPREAD,
            temperature_domain: DomainRange::linear(TEMP_MIN_F, TEMP_MAX_F),
            temperature: ModeSettings {
                ticks_per_step: TICKS_PER_DETENT,
                step: 1,
                celebration_threshold: TEMPERATURE_CELEBRATION_THRESHOLD,
            },
            midpoint: ModeSettings {
                ticks_per_step: TICKS_PER_DETENT,
                step: 1,
                celebration_threshold: MIDPOINT_CELEBRATION_THRESHOLD,
            },
            line_bands: LineBands {
                left_x: LINE_LEFT_X,
                right_x: LINE_RIGHT_X,
                y: LINE_Y,
            },
        }
    }
}

impl KioskConfig {
    pub fn settings(&self, mode: GameMode) -> Option<&ModeSettings> {
        match mode {
            GameMode::Hue => Some(&self.hue),
            GameMode::Midpoint => Some(&self.midpoint),
            GameMode::Temperature => Some(&self.temperature),
            GameMode::Lightshow => None,
        }
    }

    /// Fixed guessing domain of `mode`. `None` when it is drawn per round or
    /// the mode is not scored.
    pub fn domain(&self, mode: GameMode) -> Option<DomainRange> {
        match mode {
            GameMode::Hue => Some(self.hue_domain),
            GameMode::Temperature => Some(self.temperature_domain),
            GameMode::Midpoint | GameMode::Lightshow => None,
        }
    }

    /// Check every range and mapping once, before the first round.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.table_count > 0, "table count must be positive");
        ensure!(self.ticks_per_detent > 0, "ticks per detent must be positive");
        for mode in GameMode::ALL {
            if let Some(settings) = self.settings(mode) {
                settings.validate(mode, self.domain(mode))?;
            }
        }
        ensure!(
            !self.temperature_domain.is_cyclic(),
            "temperature domain must be linear"
        );
        ensure!(self.hue_domain.is_cyclic(), "hue domain must be cyclic");
        ensure!(
            self.hue_decoy_spread > 0 && self.hue_decoy_spread < self.hue_domain.span(),
            "hue decoy spread {} must fall inside the hue range",
            self.hue_decoy_spread
        );

        let bands = &self.line_bands;
        for (name, (lo, hi)) in [("left", bands.left_x), ("right", bands.right_x), ("y", bands.y)] {
            ensure!(lo < hi, "{name} line band {lo}..{hi} is empty");
        }
        ensure!(
            bands.left_x.1 <= bands.right_x.0,
            "left line band must lie strictly left of the right band"
        );
        ensure!(
            bands.left_x.0 >= 0 && bands.right_x.1 <= SCREEN_WIDTH,
            "line bands must fit the {SCREEN_WIDTH} pixel wide screen"
        );
        ensure!(
            bands.y.0 >= 0 && bands.y.1 <= SCREEN_HEIGHT,
            "line bands must fit the {SCREEN_HEIGHT} pixel high screen"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(KioskConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_threshold() {
        let mut config = KioskConfig::default();
        config.hue.celebration_threshold = 120.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_step_not_dividing_hue_range() {
        let mut config = KioskConfig::default();
        config.hue.step = 51;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_overlapping_line_bands() {
        let mut config = KioskConfig::default();
        config.line_bands.left_x = (1, 120);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_line_bands_off_screen() {
        let mut config = KioskConfig::default();
        config.line_bands.right_x = (113, SCREEN_WIDTH + 10);
        assert!(config.validate().is_err());

        let mut config = KioskConfig::default();
        config.line_bands.y = (1, SCREEN_HEIGHT + 1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_line_bands_hug_screen_edges() {
        let bands = KioskConfig::default().line_bands;
        assert_eq!(bands.right_x, (113, 127));
        assert_eq!(bands.y, (1, 63));
    }

    #[test]
    fn test_midpoint_has_no_fixed_domain() {
        let config = KioskConfig::default();
        assert_eq!(config.domain(GameMode::Midpoint), None);
        assert_eq!(config.domain(GameMode::Hue), Some(DomainRange::cyclic(0, HUE_RANGE)));

        // The mapping itself is still checked.
        let mut config = KioskConfig::default();
        config.midpoint.step = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_lightshow_has_no_settings() {
        let config = KioskConfig::default();
        assert!(config.settings(GameMode::Lightshow).is_none());
        assert_eq!(config.settings(GameMode::Hue), Some(&config.hue));
    }
}
