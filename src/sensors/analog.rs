//! Meter-face analog channel (reflective IR sensor behind a divider).
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads ADC1 via the oneshot API (initialised by hw_init).
//! On host/test: reads from a static AtomicU16 for injection.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU16, Ordering};

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
use crate::pins::ADC_MAX;

#[cfg(not(target_os = "espidf"))]
static SIM_METER_ADC: AtomicU16 = AtomicU16::new(0);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_meter_adc(raw: u16) {
    SIM_METER_ADC.store(raw, Ordering::Relaxed);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoltageReading {
    pub raw: u16,
    pub volts: f32,
}

pub struct MeterVoltageSensor {
    _channel: u32,
    full_scale_volts: f32,
}

impl MeterVoltageSensor {
    pub fn new(channel: u32, full_scale_volts: f32) -> Self {
        Self {
            _channel: channel,
            full_scale_volts,
        }
    }

    pub fn read(&self) -> VoltageReading {
        let raw = self.read_adc();
        VoltageReading {
            raw,
            volts: scale(raw, self.full_scale_volts),
        }
    }

    /// A failed conversion reads as 0 V; the loop keeps going.
    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> u16 {
        hw_init::adc1_read(self._channel).unwrap_or(0)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> u16 {
        SIM_METER_ADC.load(Ordering::Relaxed)
    }
}

/// `raw / ADC_MAX × full_scale`, clamped to the ADC range.
pub fn scale(raw: u16, full_scale_volts: f32) -> f32 {
    f32::from(raw.min(ADC_MAX)) / f32::from(ADC_MAX) * full_scale_volts
}
