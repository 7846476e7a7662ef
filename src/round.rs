use anyhow::{Result, bail, ensure};
use rand::Rng;

use crate::config::KioskConfig;
use crate::domain::{DomainRange, GameMode};
use crate::input_mapper::{InputMapper, MappedGuess};
use crate::peripherals::TemperatureSensor;
use crate::scoring::{Outcome, score};
use crate::target::{Target, TargetGenerator};

/// One play of a scored game mode.
///
/// The target is fixed at creation. The guess follows the knob until the
/// round is finalized; from then on the outcome and guess never change.
#[derive(Debug, Clone)]
pub struct Round {
    mode: GameMode,
    table: u8,
    target: Target,
    mapper: InputMapper,
    guess: i32,
    outcome: Option<Outcome>,
}

impl Round {
    pub fn new(mode: GameMode, table: u8, target: Target, mapper: InputMapper) -> Self {
        Self {
            mode,
            table,
            target,
            mapper,
            guess: mapper.domain().min(),
            outcome: None,
        }
    }

    /// Draw a target for `mode` and set up its input mapping.
    pub fn start<R: Rng>(
        mode: GameMode,
        table: u8,
        config: &KioskConfig,
        targets: &mut TargetGenerator<R>,
        sensor: Option<&mut (dyn TemperatureSensor + 'static)>,
    ) -> Result<Self> {
        ensure!(mode.is_scored(), "{mode} is not a scored mode");
        let Some(settings) = config.settings(mode) else {
            bail!("no settings for {mode}");
        };
        let (target, mapper) = match mode {
            GameMode::Hue => {
                let domain = config.hue_domain;
                let hue = domain.min() + targets.hue(domain.span());
                (Target::Hue(hue), settings.mapper(domain)?)
            }
            GameMode::Midpoint => {
                let line = targets.line(&config.line_bands)?;
                let pixels = DomainRange::linear(0, line.width());
                (Target::Midpoint(line), settings.mapper(pixels)?)
            }
            GameMode::Temperature => (
                targets.temperature(sensor),
                settings.mapper(config.temperature_domain)?,
            ),
            GameMode::Lightshow => bail!("{mode} is not a scored mode"),
        };
        log::debug!(
            "Table {table} {mode} round, target {target:?}, {} per tick over {}",
            mapper.scale(),
            mapper.domain()
        );
        Ok(Self::new(mode, table, target, mapper))
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn table(&self) -> u8 {
        self.table
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn mapper(&self) -> &InputMapper {
        &self.mapper
    }

    pub fn guess(&self) -> i32 {
        self.guess
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn is_scored(&self) -> bool {
        self.outcome.is_some()
    }

    /// Feed a raw encoder read. Ignored once the round is scored.
    pub fn update_guess(&mut self, raw_ticks: i32) -> MappedGuess {
        if self.is_scored() {
            return MappedGuess {
                value: self.guess,
                reseed: None,
            };
        }
        let mapped = self.mapper.read_guess(raw_ticks);
        self.guess = mapped.value;
        mapped
    }

    /// Score the current guess. Computed on the first call only.
    pub fn finalize(&mut self) -> Outcome {
        let Self {
            target,
            mapper,
            guess,
            outcome,
            ..
        } = self;
        *outcome.get_or_insert_with(|| score(target, *guess, mapper.domain()))
    }
}

/// Selections that survive across rounds.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub table: u8,
    pub mode: GameMode,
    pub round: Option<Round>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::{LineSegment, Point};
    use anyhow::anyhow;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    struct Ambient(f64);

    impl TemperatureSensor for Ambient {
        fn read_celsius(&mut self) -> Result<f64> {
            Ok(self.0)
        }
    }

    struct Broken;

    impl TemperatureSensor for Broken {
        fn read_celsius(&mut self) -> Result<f64> {
            Err(anyhow!("no ack"))
        }
    }

    fn targets() -> TargetGenerator<StdRng> {
        TargetGenerator::new(StdRng::seed_from_u64(42))
    }

    #[test]
    fn test_outcome_fixed_after_finalize() -> Result<()> {
        let config = KioskConfig::default();
        let mut round = Round::new(
            GameMode::Hue,
            1,
            Target::Hue(30000),
            config.hue.mapper(config.hue_domain)?,
        );
        assert_eq!(round.outcome(), None);

        round.update_guess(600);
        assert_eq!(round.guess(), 30000);
        assert_eq!(round.finalize(), Outcome::Scored(100.0));

        // Knob keeps turning after the confirm: nothing changes.
        round.update_guess(0);
        assert_eq!(round.guess(), 30000);
        assert_eq!(round.finalize(), Outcome::Scored(100.0));
        Ok(())
    }

    #[test]
    fn test_update_guess_reports_reseed() -> Result<()> {
        let config = KioskConfig::default();
        let mut round = Round::new(
            GameMode::Temperature,
            0,
            Target::Temperature(70),
            config.temperature.mapper(config.temperature_domain)?,
        );
        assert_eq!(round.guess(), 32);
        let mapped = round.update_guess(10_000);
        assert_eq!(mapped.reseed, Some(272));
        assert_eq!(round.guess(), 100);
        Ok(())
    }

    #[test]
    fn test_start_hue_round() -> Result<()> {
        let config = KioskConfig::default();
        let round = Round::start(GameMode::Hue, 2, &config, &mut targets(), None)?;
        assert_eq!(round.table(), 2);
        assert!(matches!(round.target(), Target::Hue(h) if (0..65350).contains(h)));
        assert!(round.mapper().domain().is_cyclic());
        Ok(())
    }

    #[test]
    fn test_start_midpoint_round_maps_over_line_width() -> Result<()> {
        let config = KioskConfig::default();
        let round = Round::start(GameMode::Midpoint, 0, &config, &mut targets(), None)?;
        let Target::Midpoint(line) = round.target() else {
            panic!("expected a line target");
        };
        assert_eq!(round.mapper().domain(), DomainRange::linear(0, line.width()));
        assert_eq!(round.guess(), 0);
        Ok(())
    }

    #[test]
    fn test_start_temperature_round() -> Result<()> {
        let config = KioskConfig::default();
        let mut sensor = Ambient(21.0);
        let round = Round::start(
            GameMode::Temperature,
            0,
            &config,
            &mut targets(),
            Some(&mut sensor),
        )?;
        // 21°C is 69.8°F.
        assert_eq!(round.target(), &Target::Temperature(70));
        Ok(())
    }

    #[test]
    fn test_failed_sensor_round_is_flagged() -> Result<()> {
        let config = KioskConfig::default();
        let mut sensor = Broken;
        let mut round = Round::start(
            GameMode::Temperature,
            0,
            &config,
            &mut targets(),
            Some(&mut sensor),
        )?;
        assert_eq!(round.target(), &Target::Unavailable);
        assert_eq!(round.finalize(), Outcome::SensorUnavailable);
        Ok(())
    }

    #[test]
    fn test_lightshow_has_no_round() {
        let config = KioskConfig::default();
        assert!(Round::start(GameMode::Lightshow, 0, &config, &mut targets(), None).is_err());
    }

    #[test]
    fn test_midpoint_scoring_through_round() -> Result<()> {
        let line = LineSegment::new(Point::new(10, 10), Point::new(120, 50))?;
        let mapper = InputMapper::new(DomainRange::linear(0, line.width()), 4, 1)?;
        let mut round = Round::new(GameMode::Midpoint, 0, Target::Midpoint(line), mapper);
        round.update_guess(55 * 4);
        assert_eq!(round.finalize(), Outcome::Scored(100.0));
        Ok(())
    }
}
