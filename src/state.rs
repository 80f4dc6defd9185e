//! Sampled state and the read-only snapshot handed to readers.

use core::fmt;

use serde::{Serialize, Serializer};

use crate::connectivity::ConnectionHealth;
use crate::counter::Level;

/// Text used wherever a temperature cannot be produced.
pub const UNAVAILABLE: &str = "unavailable";

/// Temperature probe reading, or the sentinel when the probe is absent.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Temperature {
    Celsius(f32),
    #[default]
    Unavailable,
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Celsius(c) => write!(f, "{c:.2}"),
            Self::Unavailable => f.write_str(UNAVAILABLE),
        }
    }
}

/// Serialises as a JSON number, or the string `"unavailable"`.
impl Serialize for Temperature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Celsius(c) => serializer.serialize_f32(*c),
            Self::Unavailable => serializer.serialize_str(UNAVAILABLE),
        }
    }
}

/// Values written once per tick by the sampling step.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SampleState {
    pub analog_voltage: f32,
    pub digital_level: Level,
    pub counter: u64,
    pub temperature: Temperature,
}

/// Owned, point-in-time copy of everything readers may show.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    pub sample: SampleState,
    /// `counter × multiplier`, derived at snapshot time.
    pub usage: f64,
    pub link: ConnectionHealth,
    pub broker: ConnectionHealth,
}
