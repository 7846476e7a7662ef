//! The kiosk's control loop.
//!
//! A single-threaded state machine. Each `tick` does the work of the current
//! phase and returns how long to wait before the next one; `idle` spends that
//! wait sampling the knob and button so no edges are lost. Every tick looks at
//! the confirm button before anything else, so one press always moves the
//! machine exactly one phase forward.
//!
//! Lamp, relay, gauge, knob and display failures are logged and the loop keeps
//! going. Only a configuration that cannot be used stops construction.

use anyhow::Result;
use rand::Rng;

use crate::config::{
    GAUGE_START_POSITION, GUESS_REFRESH_MS, INPUT_SERVICE_SLICE_MS, KioskConfig, LAMP_BRIGHTNESS,
    LAMP_SATURATION, LIGHTSHOW_HUE_CEILING, LIGHTSHOW_HUE_STEP, LIGHTSHOW_REFRESH_MS,
    LIGHTSHOW_START_HUES, LIGHTSHOW_STEP_MS, MENU_REFRESH_MS, RAINBOW_STEP_MS, RESULT_REFRESH_MS,
    TABLE_WRITE_SPACING_MS, TEMP_HUE_COLD, TEMP_HUE_HOT,
};
use crate::domain::{DomainRange, GameMode};
use crate::input_mapper::InputMapper;
use crate::peripherals::{Clock, KnobColor, LampState, Peripherals};
use crate::round::{Round, Session};
use crate::screens;
use crate::scoring::Outcome;
use crate::target::{Target, TargetGenerator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    SelectTable,
    SelectMode,
    /// Instructions are up and the table is prepared.
    AwaitStart,
    Guessing,
    /// Result on screen and gauge until the next press.
    Scored,
    Lightshow,
}

/// Steps through a fixed-length sequence at a fixed pace.
#[derive(Debug, Default)]
struct Animation {
    step: usize,
    step_started_ms: u64,
}

impl Animation {
    fn restart(&mut self, now_ms: u64) {
        self.step = 0;
        self.step_started_ms = now_ms;
    }

    fn advance(&mut self, now_ms: u64, step_ms: u64, len: usize) -> usize {
        if now_ms.saturating_sub(self.step_started_ms) >= step_ms {
            self.step = (self.step + 1) % len;
            self.step_started_ms = now_ms;
        }
        self.step
    }
}

fn lit(hue: i32) -> LampState {
    LampState::On {
        hue,
        saturation: LAMP_SATURATION,
        brightness: LAMP_BRIGHTNESS,
    }
}

/// Lamp tint for a temperature guess: cold blue at the bottom of the range
/// through to red at the top.
pub fn temperature_tint(degrees: i32, domain: DomainRange) -> i32 {
    let span = f64::from(domain.span());
    let fraction = f64::from(degrees - domain.min()) / span;
    (f64::from(TEMP_HUE_COLD) + fraction * f64::from(TEMP_HUE_HOT - TEMP_HUE_COLD)).round() as i32
}

fn report(what: &str, result: Result<()>) {
    if let Err(e) = result {
        log::warn!("{what} failed: {e:#}");
    }
}

pub struct RoundController<R: Rng> {
    config: KioskConfig,
    hw: Peripherals,
    clock: Box<dyn Clock>,
    targets: TargetGenerator<R>,
    table_menu: InputMapper,
    mode_menu: InputMapper,
    session: Session,
    phase: Phase,
    animation: Animation,
    lightshow_hues: [i32; LIGHTSHOW_START_HUES.len()],
}

impl<R: Rng> RoundController<R> {
    pub fn new(config: KioskConfig, hw: Peripherals, clock: Box<dyn Clock>, rng: R) -> Result<Self> {
        config.validate()?;
        let table_menu = InputMapper::new(
            DomainRange::cyclic(0, i32::from(config.table_count)),
            config.ticks_per_detent,
            1,
        )?;
        let mode_menu = InputMapper::new(
            DomainRange::cyclic(0, GameMode::ALL.len() as i32),
            config.ticks_per_detent,
            1,
        )?;

        let mut controller = Self {
            config,
            hw,
            clock,
            targets: TargetGenerator::new(rng),
            table_menu,
            mode_menu,
            session: Session::default(),
            phase: Phase::SelectTable,
            animation: Animation::default(),
            lightshow_hues: LIGHTSHOW_START_HUES,
        };
        controller.enter(Phase::SelectTable);
        Ok(controller)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Run forever.
    pub fn run(&mut self) -> ! {
        log::info!("Kiosk ready: {} tables", self.config.table_count);
        loop {
            let pause = self.tick();
            self.idle(pause);
        }
    }

    /// One pass of the current phase. Returns the pause before the next.
    pub fn tick(&mut self) -> u64 {
        match self.phase {
            Phase::SelectTable => self.tick_select_table(),
            Phase::SelectMode => self.tick_select_mode(),
            Phase::AwaitStart => self.tick_await_start(),
            Phase::Guessing => self.tick_guessing(),
            Phase::Scored => self.tick_scored(),
            Phase::Lightshow => self.tick_lightshow(),
        }
    }

    /// Wait `ms`, sampling the knob and button once per slice.
    pub fn idle(&mut self, ms: u64) {
        let deadline = self.clock.now_ms().saturating_add(ms);
        loop {
            self.hw.encoder.service();
            self.hw.button.service();
            let now = self.clock.now_ms();
            if now >= deadline {
                break;
            }
            self.clock.sleep_ms(INPUT_SERVICE_SLICE_MS.min(deadline - now));
        }
    }

    fn enter(&mut self, phase: Phase) {
        log::info!("{:?} -> {:?}", self.phase, phase);
        self.phase = phase;

        match phase {
            Phase::SelectTable => {
                self.session.round = None;
                self.set_gauge(GAUGE_START_POSITION);
                let ticks = self.table_menu.ticks_for(i32::from(self.session.table));
                self.hw.encoder.write(ticks);
                self.set_knob(KnobColor::Blue);
            }
            Phase::SelectMode => {
                let ticks = self.mode_menu.ticks_for(self.session.mode.index() as i32);
                self.hw.encoder.write(ticks);
            }
            Phase::AwaitStart => self.start_round(),
            Phase::Guessing => {
                self.set_knob(KnobColor::Green);
                self.read_guess();
            }
            Phase::Scored => self.finish_round(),
            Phase::Lightshow => self.start_lightshow(),
        }
    }

    // region: MENUS
    fn tick_select_table(&mut self) -> u64 {
        if self.hw.button.is_confirmed() {
            log::info!("Table {} selected", self.session.table);
            self.enter(Phase::SelectMode);
            return MENU_REFRESH_MS;
        }

        let mapped = self.table_menu.read_guess(self.hw.encoder.read());
        if let Some(ticks) = mapped.reseed {
            self.hw.encoder.write(ticks);
        }
        self.session.table = u8::try_from(mapped.value).unwrap_or_default();
        report(
            "Display",
            screens::table_menu(self.hw.display.as_mut(), self.session.table),
        );
        MENU_REFRESH_MS
    }

    fn tick_select_mode(&mut self) -> u64 {
        if self.hw.button.is_confirmed() {
            log::info!("Mode {} selected", self.session.mode);
            self.enter(Phase::AwaitStart);
            return MENU_REFRESH_MS;
        }

        let mapped = self.mode_menu.read_guess(self.hw.encoder.read());
        if let Some(ticks) = mapped.reseed {
            self.hw.encoder.write(ticks);
        }
        if let Some(mode) = usize::try_from(mapped.value).ok().and_then(GameMode::from_index) {
            self.session.mode = mode;
        }
        report(
            "Display",
            screens::mode_menu(self.hw.display.as_mut(), self.session.mode),
        );
        MENU_REFRESH_MS
    }
    // endregion: MENUS

    // region: ROUND
    fn start_round(&mut self) {
        let Session { table, mode, .. } = self.session;
        self.hw.encoder.write(0);

        if !mode.is_scored() {
            self.enter(Phase::Lightshow);
            return;
        }

        let round = match Round::start(
            mode,
            table,
            &self.config,
            &mut self.targets,
            self.hw.sensor.as_deref_mut(),
        ) {
            Ok(round) => round,
            Err(e) => {
                log::error!("Could not start {mode} round on table {table}: {e:#}");
                self.enter(Phase::SelectTable);
                return;
            }
        };

        // The hue lamp shows the colour to remember; other modes get a random one.
        let lamp_hue = match *round.target() {
            Target::Hue(hue) => {
                let range = self.config.hue_domain.span();
                let decoy = self.targets.decoy_hue(hue, range, self.config.hue_decoy_spread);
                self.hw.encoder.write(round.mapper().ticks_for(decoy));
                hue
            }
            _ => self.targets.hue(self.config.hue_domain.span()),
        };
        let sensor_ok = *round.target() != Target::Unavailable;
        self.session.round = Some(round);

        self.prepare_tables(lamp_hue);
        self.set_knob(KnobColor::Cyan);
        report(
            "Display",
            screens::instructions(self.hw.display.as_mut(), mode, sensor_ok),
        );
    }

    /// Power the selected table and light its lamp; everything else goes dark.
    fn prepare_tables(&mut self, hue: i32) {
        let selected = self.session.table;
        for table in 0..self.config.table_count {
            let chosen = table == selected;
            report("Relay", self.hw.relays.set(table, chosen));
            let lamp = if chosen { lit(hue) } else { LampState::Off };
            report("Lamp", self.hw.lamps.set(table + 1, lamp));
            self.idle(TABLE_WRITE_SPACING_MS);
        }
    }

    fn tick_await_start(&mut self) -> u64 {
        let Some(round) = self.session.round.as_ref() else {
            self.enter(Phase::SelectTable);
            return MENU_REFRESH_MS;
        };
        let (mode, sensor_ok) = (round.mode(), *round.target() != Target::Unavailable);

        if self.hw.button.is_confirmed() {
            // Nothing to guess against: go straight to the flagged result.
            self.enter(if sensor_ok { Phase::Guessing } else { Phase::Scored });
            return MENU_REFRESH_MS;
        }
        report(
            "Display",
            screens::instructions(self.hw.display.as_mut(), mode, sensor_ok),
        );
        MENU_REFRESH_MS
    }

    /// Pull the knob into the round's guess, reseeding the encoder if the
    /// value had to be wrapped or clamped.
    fn read_guess(&mut self) -> Option<(Target, DomainRange, i32)> {
        let raw = self.hw.encoder.read();
        let round = self.session.round.as_mut()?;
        let mapped = round.update_guess(raw);
        let read = (*round.target(), round.mapper().domain(), mapped.value);
        if let Some(ticks) = mapped.reseed {
            self.hw.encoder.write(ticks);
        }
        Some(read)
    }

    fn tick_guessing(&mut self) -> u64 {
        if self.hw.button.is_confirmed() {
            self.enter(Phase::Scored);
            return GUESS_REFRESH_MS;
        }

        let Some((target, domain, guess)) = self.read_guess() else {
            self.enter(Phase::SelectTable);
            return MENU_REFRESH_MS;
        };

        let lamp = self.session.table + 1;
        let drawn = match target {
            Target::Hue(_) => {
                report("Lamp", self.hw.lamps.set(lamp, lit(guess)));
                screens::hue_guess(self.hw.display.as_mut(), guess)
            }
            Target::Midpoint(line) => screens::midpoint_guess(self.hw.display.as_mut(), &line, guess),
            Target::Temperature(_) => {
                report("Lamp", self.hw.lamps.set(lamp, lit(temperature_tint(guess, domain))));
                screens::temperature_guess(self.hw.display.as_mut(), guess)
            }
            Target::Unavailable => Ok(()),
        };
        report("Display", drawn);
        GUESS_REFRESH_MS
    }

    fn finish_round(&mut self) {
        let Some(round) = self.session.round.as_mut() else {
            self.enter(Phase::SelectTable);
            return;
        };
        let outcome = round.finalize();
        match outcome {
            Outcome::Scored(_) => log::info!(
                "Table {} {}: guess {} against {:?} scored {outcome}",
                round.table(),
                round.mode(),
                round.guess(),
                round.target()
            ),
            Outcome::SensorUnavailable => log::warn!(
                "Table {} {}: no score, temperature sensor offline",
                round.table(),
                round.mode()
            ),
        }

        self.set_gauge(outcome.gauge_position());
        report("Display", screens::accuracy(self.hw.display.as_mut(), outcome));
        self.animation.restart(self.clock.now_ms());
        let color = if self.celebrating() {
            KnobColor::RAINBOW[0]
        } else if outcome == Outcome::SensorUnavailable {
            KnobColor::Red
        } else {
            KnobColor::Yellow
        };
        self.set_knob(color);
    }

    fn celebrating(&self) -> bool {
        let Some(round) = self.session.round.as_ref() else {
            return false;
        };
        match (round.outcome(), self.config.settings(round.mode())) {
            (Some(outcome), Some(settings)) => outcome.celebrates(settings.celebration_threshold),
            _ => false,
        }
    }

    fn tick_scored(&mut self) -> u64 {
        if self.hw.button.is_confirmed() {
            self.enter(Phase::SelectTable);
            return MENU_REFRESH_MS;
        }
        if self.celebrating() {
            let now = self.clock.now_ms();
            let step = self.animation.advance(now, RAINBOW_STEP_MS, KnobColor::RAINBOW.len());
            self.set_knob(KnobColor::RAINBOW[step]);
        }
        RESULT_REFRESH_MS
    }
    // endregion: ROUND

    // region: LIGHTSHOW
    fn start_lightshow(&mut self) {
        for table in 0..self.config.table_count {
            report("Relay", self.hw.relays.set(table, true));
            self.idle(TABLE_WRITE_SPACING_MS);
        }
        self.lightshow_hues = LIGHTSHOW_START_HUES;
        self.animation.restart(self.clock.now_ms());
        report(
            "Display",
            screens::instructions(self.hw.display.as_mut(), GameMode::Lightshow, true),
        );
    }

    fn tick_lightshow(&mut self) -> u64 {
        if self.hw.button.is_confirmed() {
            self.enter(Phase::SelectTable);
            return MENU_REFRESH_MS;
        }

        let now = self.clock.now_ms();
        let step = self.animation.advance(now, LIGHTSHOW_STEP_MS, self.lightshow_hues.len());
        let hue = self.lightshow_hues[step];
        report("Lamp", self.hw.lamps.set(step as u8 + 1, lit(hue)));
        self.lightshow_hues[step] = if hue >= LIGHTSHOW_HUE_CEILING {
            0
        } else {
            hue + LIGHTSHOW_HUE_STEP
        };
        self.set_knob(KnobColor::RAINBOW[step % KnobColor::RAINBOW.len()]);
        LIGHTSHOW_REFRESH_MS
    }
    // endregion: LIGHTSHOW

    fn set_gauge(&mut self, percent: u8) {
        report("Gauge", self.hw.gauge.set_position(percent));
    }

    fn set_knob(&mut self, color: KnobColor) {
        report("Knob LED", self.hw.knob.set(color));
    }
}
