use std::fmt;

use anyhow::{Result, ensure};
use rand::Rng;

use crate::config::LineBands;
use crate::peripherals::TemperatureSensor;

/// A display pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Segment drawn for the midpoint game. `start` is always left of `end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    start: Point,
    end: Point,
}

impl LineSegment {
    pub fn new(start: Point, end: Point) -> Result<Self> {
        ensure!(
            start.x < end.x,
            "segment {start} -> {end} must run left to right"
        );
        Ok(Self { start, end })
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn end(&self) -> Point {
        self.end
    }

    /// Horizontal extent in pixels; the guess offset runs over `0..=width`.
    pub fn width(&self) -> i32 {
        self.end.x - self.start.x
    }

    pub fn length(&self) -> f64 {
        f64::from(self.end.x - self.start.x).hypot(f64::from(self.end.y - self.start.y))
    }

    /// x coordinate of the true midpoint.
    pub fn mid_x(&self) -> f64 {
        f64::from(self.start.x) + f64::from(self.width()) / 2.0
    }

    /// Point on the segment `offset` pixels right of `start`.
    pub fn point_at(&self, offset: i32) -> (f64, f64) {
        let slope = f64::from(self.end.y - self.start.y) / f64::from(self.width());
        (
            f64::from(self.start.x + offset),
            f64::from(self.start.y) + slope * f64::from(offset),
        )
    }
}

/// Ground truth of a round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Target {
    Hue(i32),
    Midpoint(LineSegment),
    /// Whole degrees Fahrenheit.
    Temperature(i32),
    /// The sensor could not be trusted; the round cannot be scored.
    Unavailable,
}

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

/// Draws round targets from a random source and the temperature sensor.
pub struct TargetGenerator<R: Rng> {
    rng: R,
}

impl<R: Rng> TargetGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Uniform hue in `[0, range)`.
    pub fn hue(&mut self, range: i32) -> i32 {
        self.rng.gen_range(0..range)
    }

    /// Starting hue for the knob, within `spread` of the target's antipode.
    pub fn decoy_hue(&mut self, target: i32, range: i32, spread: i32) -> i32 {
        let offset = self.rng.gen_range(0..spread);
        (target + range / 2 + offset).rem_euclid(range)
    }

    /// Endpoints in the left and right bands, each at an independent height.
    pub fn line(&mut self, bands: &LineBands) -> Result<LineSegment> {
        let start = Point::new(
            self.rng.gen_range(bands.left_x.0..bands.left_x.1),
            self.rng.gen_range(bands.y.0..bands.y.1),
        );
        let end = Point::new(
            self.rng.gen_range(bands.right_x.0..bands.right_x.1),
            self.rng.gen_range(bands.y.0..bands.y.1),
        );
        LineSegment::new(start, end)
    }

    /// One sensor read, fixed for the whole round.
    ///
    /// A missing sensor or a failed read yields `Target::Unavailable`; the
    /// round is then reported as unscorable instead of guessing at a value.
    pub fn temperature(&mut self, sensor: Option<&mut (dyn TemperatureSensor + 'static)>) -> Target {
        let Some(sensor) = sensor else {
            log::warn!("Temperature sensor offline, round will not be scored");
            return Target::Unavailable;
        };
        match sensor.read_celsius() {
            Ok(celsius) if celsius.is_finite() => {
                let fahrenheit = celsius_to_fahrenheit(celsius);
                log::debug!("Ambient {:.2}°C ({:.1}°F)", celsius, fahrenheit);
                Target::Temperature(fahrenheit.round() as i32)
            }
            Ok(celsius) => {
                log::warn!("Temperature sensor returned {celsius}, round will not be scored");
                Target::Unavailable
            }
            Err(e) => {
                log::warn!("Temperature read failed: {e:#}");
                Target::Unavailable
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KioskConfig;
    use anyhow::anyhow;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    struct FixedSensor(Result<f64, &'static str>);

    impl TemperatureSensor for FixedSensor {
        fn read_celsius(&mut self) -> Result<f64> {
            self.0.map_err(|e| anyhow!(e))
        }
    }

    fn generator() -> TargetGenerator<StdRng> {
        TargetGenerator::new(StdRng::seed_from_u64(7))
    }

    #[test]
    fn test_hue_stays_in_range() {
        let mut targets = generator();
        for _ in 0..1000 {
            let hue = targets.hue(65350);
            assert!((0..65350).contains(&hue));
        }
    }

    #[test]
    fn test_decoy_lands_near_antipode() {
        let mut targets = generator();
        for target in [0, 10000, 32675, 65349] {
            let decoy = targets.decoy_hue(target, 65350, 2000);
            assert!((0..65350).contains(&decoy));
            let distance = (decoy - target).rem_euclid(65350);
            assert!((32675..32675 + 2000).contains(&distance), "{target} -> {decoy}");
        }
    }

    #[test]
    fn test_line_endpoints_stay_in_bands() -> Result<()> {
        let bands = KioskConfig::default().line_bands;
        let mut targets = generator();
        for _ in 0..200 {
            let line = targets.line(&bands)?;
            assert!((1..15).contains(&line.start().x));
            assert!((113..127).contains(&line.end().x));
            assert!((1..63).contains(&line.start().y));
            assert!((1..63).contains(&line.end().y));
        }
        Ok(())
    }

    #[test]
    fn test_segment_geometry() -> Result<()> {
        let line = LineSegment::new(Point::new(10, 10), Point::new(120, 50))?;
        assert_eq!(line.width(), 110);
        assert_eq!(line.mid_x(), 65.0);
        assert!((line.length() - 117.047).abs() < 1e-3);
        assert_eq!(line.point_at(0), (10.0, 10.0));
        assert_eq!(line.point_at(110), (120.0, 50.0));
        let (x, y) = line.point_at(55);
        assert_eq!(x, 65.0);
        assert!((y - 30.0).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn test_segment_must_run_left_to_right() {
        assert!(LineSegment::new(Point::new(10, 10), Point::new(10, 40)).is_err());
        assert!(LineSegment::new(Point::new(20, 10), Point::new(10, 40)).is_err());
    }

    #[test]
    fn test_temperature_converts_and_rounds() {
        let mut sensor = FixedSensor(Ok(22.2));
        // 22.2°C is 71.96°F.
        assert_eq!(
            generator().temperature(Some(&mut sensor)),
            Target::Temperature(72)
        );
        assert_eq!(celsius_to_fahrenheit(100.0), 212.0);
        assert_eq!(celsius_to_fahrenheit(-40.0), -40.0);
    }

    #[test]
    fn test_temperature_unavailable_without_sensor() {
        assert_eq!(generator().temperature(None), Target::Unavailable);
    }

    #[test]
    fn test_temperature_unavailable_on_read_error() {
        let mut sensor = FixedSensor(Err("bus timeout"));
        assert_eq!(generator().temperature(Some(&mut sensor)), Target::Unavailable);
        let mut sensor = FixedSensor(Ok(f64::NAN));
        assert_eq!(generator().temperature(Some(&mut sensor)), Target::Unavailable);
    }
}
