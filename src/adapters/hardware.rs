//! Hardware adapter: bridges real peripherals to the [`SensorPort`] trait.
//!
//! Owns the [`SensorHub`].  This is the only module in the system that
//! touches actual hardware.  On non-espidf targets, the underlying drivers
//! use cfg-gated simulation stubs.

use crate::app::ports::SensorPort;
use crate::counter::Level;
use crate::error::SensorError;
use crate::sensors::SensorHub;

/// Concrete adapter that puts all sensors behind the port trait.
pub struct HardwareAdapter {
    sensor_hub: SensorHub,
}

impl HardwareAdapter {
    pub fn new(sensor_hub: SensorHub) -> Self {
        Self { sensor_hub }
    }
}

impl SensorPort for HardwareAdapter {
    fn read_analog_voltage(&mut self) -> f32 {
        self.sensor_hub.voltage()
    }

    fn read_digital_level(&mut self) -> Level {
        self.sensor_hub.level()
    }

    fn read_temperature(&mut self) -> Result<f32, SensorError> {
        self.sensor_hub.temperature()
    }
}
