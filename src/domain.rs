use std::fmt;

/// Value space of a game mode.
///
/// Linear ranges are inclusive at both ends. Cyclic ranges are half-open,
/// `max` being the same point as `min`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomainRange {
    min: i32,
    max: i32,
    cyclic: bool,
}

impl DomainRange {
    pub const fn linear(min: i32, max: i32) -> Self {
        Self {
            min,
            max,
            cyclic: false,
        }
    }

    pub const fn cyclic(min: i32, max: i32) -> Self {
        Self {
            min,
            max,
            cyclic: true,
        }
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn is_cyclic(&self) -> bool {
        self.cyclic
    }

    /// Distance from `min` to `max`.
    pub fn span(&self) -> i32 {
        self.max - self.min
    }

    pub fn contains(&self, value: i32) -> bool {
        if self.cyclic {
            value >= self.min && value < self.max
        } else {
            value >= self.min && value <= self.max
        }
    }
}

impl fmt::Display for DomainRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.cyclic {
            write!(f, "[{}, {}) cyclic", self.min, self.max)
        } else {
            write!(f, "[{}, {}]", self.min, self.max)
        }
    }
}

/// The games offered on the mode menu, in menu order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GameMode {
    #[default]
    Hue,
    Midpoint,
    Temperature,
    /// Free-running lamp animation, never scored.
    Lightshow,
}

impl GameMode {
    pub const ALL: [GameMode; 4] = [
        GameMode::Hue,
        GameMode::Midpoint,
        GameMode::Temperature,
        GameMode::Lightshow,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(&self) -> usize {
        match self {
            GameMode::Hue => 0,
            GameMode::Midpoint => 1,
            GameMode::Temperature => 2,
            GameMode::Lightshow => 3,
        }
    }

    /// Menu label.
    pub fn name(&self) -> &'static str {
        match self {
            GameMode::Hue => "Guess Hue",
            GameMode::Midpoint => "Line Midpoint",
            GameMode::Temperature => "Guess Temperature",
            GameMode::Lightshow => "Lightshow",
        }
    }

    pub fn is_scored(&self) -> bool {
        !matches!(self, GameMode::Lightshow)
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
