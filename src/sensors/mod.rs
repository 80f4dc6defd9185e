//! Sensor subsystem: individual drivers and the aggregating [`SensorHub`].
//!
//! The hub owns every sensor driver; the hardware adapter exposes it to
//! the application through [`SensorPort`](crate::app::ports::SensorPort).

pub mod analog;
pub mod pulse;
pub mod temperature;

use analog::MeterVoltageSensor;
use pulse::PulseInput;
use temperature::TemperatureSensor;

use crate::counter::Level;
use crate::error::SensorError;

/// Aggregates all sensor drivers.
pub struct SensorHub {
    pub meter: MeterVoltageSensor,
    pub pulse: PulseInput,
    /// `None` when no probe is fitted.
    pub temperature: Option<TemperatureSensor>,
}

impl SensorHub {
    /// Construct a new hub.  Pass in pre-built drivers (built in main
    /// where peripheral ownership is established).
    pub fn new(
        meter: MeterVoltageSensor,
        pulse: PulseInput,
        temperature: Option<TemperatureSensor>,
    ) -> Self {
        Self {
            meter,
            pulse,
            temperature,
        }
    }

    pub fn voltage(&mut self) -> f32 {
        self.meter.read().volts
    }

    pub fn level(&mut self) -> Level {
        self.pulse.read()
    }

    pub fn temperature(&mut self) -> Result<f32, SensorError> {
        match &self.temperature {
            Some(probe) => probe.read().map(|r| r.celsius),
            None => Err(SensorError::NotPresent),
        }
    }
}
