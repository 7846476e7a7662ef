//! Log-backed stand-ins for the collaborators this board does not drive
//! directly: the OLED panel, the networked lamps and the table relays.
//!
//! Each one logs only when its visible state changes, so a polling loop that
//! redraws the same frame every tick stays quiet.

use std::collections::HashMap;

use anyhow::Result;

use crate::peripherals::{Display, LampState, Lamps, Relays, TextSize};
use crate::target::Point;

#[derive(Default)]
pub struct ConsoleDisplay {
    frame: Vec<String>,
    shown: Vec<String>,
}

impl ConsoleDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last frame that was presented, one entry per primitive.
    pub fn shown(&self) -> &[String] {
        &self.shown
    }
}

impl Display for ConsoleDisplay {
    fn clear(&mut self) {
        self.frame.clear();
    }

    fn text(&mut self, _origin: Point, size: TextSize, text: &str) {
        match size {
            TextSize::Normal => self.frame.push(text.to_string()),
            TextSize::Large => self.frame.push(format!("[large] {text}")),
        }
    }

    fn line(&mut self, from: Point, to: Point) {
        self.frame.push(format!("line {from}-{to}"));
    }

    fn present(&mut self) -> Result<()> {
        if self.frame != self.shown {
            self.shown = self.frame.clone();
            log::info!("[display] {}", self.shown.join(" | "));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct ConsoleLamps {
    states: HashMap<u8, LampState>,
}

impl ConsoleLamps {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Lamps for ConsoleLamps {
    fn set(&mut self, lamp: u8, state: LampState) -> Result<()> {
        if self.states.insert(lamp, state) != Some(state) {
            match state {
                LampState::Off => log::info!("[lamp {lamp}] off"),
                LampState::On { hue, .. } => log::debug!("[lamp {lamp}] hue {hue}"),
            }
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct ConsoleRelays {
    states: HashMap<u8, bool>,
}

impl ConsoleRelays {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Relays for ConsoleRelays {
    fn set(&mut self, relay: u8, on: bool) -> Result<()> {
        if self.states.insert(relay, on) != Some(on) {
            log::info!("[relay {relay}] {}", if on { "on" } else { "off" });
        }
        Ok(())
    }
}
