//! Screen layouts for a 128x64 panel. Each function draws one full frame.

use anyhow::Result;

use crate::config::MARKER_HALF_HEIGHT;
use crate::domain::GameMode;
use crate::peripherals::{Display, TextSize};
use crate::scoring::Outcome;
use crate::target::{LineSegment, Point};

fn normal(display: &mut dyn Display, x: i32, y: i32, text: &str) {
    display.text(Point::new(x, y), TextSize::Normal, text);
}

fn large(display: &mut dyn Display, x: i32, y: i32, text: &str) {
    display.text(Point::new(x, y), TextSize::Large, text);
}

pub fn table_menu(display: &mut dyn Display, table: u8) -> Result<()> {
    display.clear();
    normal(display, 11, 0, "TURN RIGHT KNOB TO");
    normal(display, 12, 13, "SELECT YOUR TABLE.");
    normal(display, 36, 32, &format!("Table #{table}"));
    normal(display, 5, 52, "PUSH BUTTON TO BEGIN.");
    display.present()
}

pub fn mode_menu(display: &mut dyn Display, mode: GameMode) -> Result<()> {
    display.clear();
    normal(display, 11, 0, "TURN RIGHT KNOB TO");
    normal(display, 15, 13, "SELECT GAME MODE.");
    let x = match mode {
        GameMode::Hue | GameMode::Lightshow => 33,
        GameMode::Midpoint => 23,
        GameMode::Temperature => 14,
    };
    normal(display, x, 32, mode.name());
    normal(display, 5, 52, "PUSH BUTTON TO BEGIN.");
    display.present()
}

/// Rules for `mode`. `sensor_ok` only matters for the temperature game.
pub fn instructions(display: &mut dyn Display, mode: GameMode, sensor_ok: bool) -> Result<()> {
    display.clear();
    match mode {
        GameMode::Hue => {
            normal(display, 14, 0, "REPLICATE CURRENT");
            normal(display, 14, 10, "HUE BULB COLOR BY");
            normal(display, 9, 20, "TURNING RIGHT KNOB.");
            normal(display, 0, 40, "PUSH BUTTON TO BEGIN.");
        }
        GameMode::Midpoint => {
            normal(display, 8, 0, "GUESS LINE MIDPOINT");
            normal(display, 14, 10, "USING RIGHT KNOB.");
            normal(display, 0, 20, "PUSH BUTTON TO BEGIN.");
            normal(display, 6, 40, "PUSH AGAIN TO GUESS.");
        }
        GameMode::Temperature if !sensor_ok => {
            normal(display, 0, 0, "GUESS ROOM TEMP (°F)");
            normal(display, 20, 20, "SENSOR OFFLINE.");
            normal(display, 0, 40, "PUSH BUTTON TO SKIP.");
        }
        GameMode::Temperature => {
            normal(display, 0, 0, "GUESS ROOM TEMP (°F)");
            normal(display, 14, 10, "USING RIGHT KNOB.");
            normal(display, 0, 20, "PUSH BUTTON TO BEGIN.");
            normal(display, 6, 40, "PUSH AGAIN TO GUESS.");
        }
        GameMode::Lightshow => {
            large(display, 5, 0, "WHOA DUDE!");
            normal(display, 20, 40, "PUSH THE BUTTON");
            normal(display, 9, 50, "TO END THE MADNESS.");
        }
    }
    display.present()
}

pub fn hue_guess(display: &mut dyn Display, hue: i32) -> Result<()> {
    display.clear();
    normal(display, 34, 0, "CURRENT HUE:");
    normal(display, 50, 30, &hue.to_string());
    display.present()
}

/// The target line with a vertical marker `offset` pixels along it.
pub fn midpoint_guess(display: &mut dyn Display, line: &LineSegment, offset: i32) -> Result<()> {
    display.clear();
    display.line(line.start(), line.end());
    let (x, y) = line.point_at(offset);
    let (x, y) = (x.round() as i32, y.round() as i32);
    display.line(
        Point::new(x, y - MARKER_HALF_HEIGHT),
        Point::new(x, y + MARKER_HALF_HEIGHT),
    );
    display.present()
}

pub fn temperature_guess(display: &mut dyn Display, degrees: i32) -> Result<()> {
    display.clear();
    normal(display, 32, 0, "Feels like");
    large(display, 36, 26, &format!("{degrees} °F"));
    normal(display, 9, 54, "PUSH KNOB TO GUESS.");
    display.present()
}

pub fn accuracy(display: &mut dyn Display, outcome: Outcome) -> Result<()> {
    display.clear();
    match outcome {
        Outcome::Scored(percent) => {
            large(display, 13, 0, "ACCURACY:");
            large(display, 36, 26, &format!("{percent:.1}%"));
        }
        Outcome::SensorUnavailable => {
            large(display, 13, 0, "NO SCORE");
            normal(display, 20, 30, "SENSOR OFFLINE");
        }
    }
    normal(display, 14, 54, "PUSH BUTTON TO END");
    display.present()
}
