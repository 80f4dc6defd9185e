//! Pulse edge counter.
//!
//! Turns the sampled digital line into a monotonic count of rising edges.
//! "Debounce" here is level-change detection between consecutive samples:
//! the line must be seen Low before another High can count again.
//!
//! The count is a `u64`; at one pulse per second it would take longer
//! than the age of the universe to wrap, so overflow is not handled.

use serde::Serialize;

/// Logical level of the digital input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Level {
    #[default]
    Low,
    High,
}

impl Level {
    /// Interpret a raw GPIO reading (non-zero = High).
    pub const fn from_raw(raw: i32) -> Self {
        if raw == 0 { Self::Low } else { Self::High }
    }

    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Low => 0,
            Self::High => 1,
        }
    }
}

/// Result of feeding one sample into the counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation {
    /// Count after this sample.
    pub count: u64,
    /// The level differs from the previous sample.
    pub changed: bool,
    /// The change was Low → High (and was counted).
    pub rising: bool,
}

#[derive(Debug, Clone)]
pub struct EdgeCounter {
    last_level: Level,
    count: u64,
    multiplier: f64,
}

impl EdgeCounter {
    pub fn new(multiplier: f64) -> Self {
        Self {
            last_level: Level::Low,
            count: 0,
            multiplier,
        }
    }

    /// Feed one sampled level.
    pub fn observe(&mut self, level: Level) -> Observation {
        if level == self.last_level {
            return Observation {
                count: self.count,
                changed: false,
                rising: false,
            };
        }

        self.last_level = level;
        let rising = level == Level::High;
        if rising {
            self.count += 1;
        }
        Observation {
            count: self.count,
            changed: true,
            rising,
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn last_level(&self) -> Level {
        self.last_level
    }

    /// Metered usage (`count × multiplier`), always derived from the count.
    pub fn usage(&self) -> f64 {
        self.count as f64 * self.multiplier
    }
}
