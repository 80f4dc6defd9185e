//! NTC thermistor temperature probe (10 kOhm @ 25 C, B = 3950).
//!
//! Wired in a voltage-divider with a fixed 10 kOhm resistor, read via
//! the ESP32-S3 ADC. The simplified Beta (Steinhart-Hart) equation
//! converts resistance to temperature.  A reading pinned to either rail
//! means the probe is unplugged or shorted.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads the configured ADC1 channel via the oneshot API.
//! On host/test: reads from a static AtomicU16 for injection.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU16, Ordering};

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
use crate::error::SensorError;
use crate::pins::ADC_MAX;

#[cfg(not(target_os = "espidf"))]
static SIM_TEMP_ADC: AtomicU16 = AtomicU16::new(2048);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_temp_adc(raw: u16) {
    SIM_TEMP_ADC.store(raw, Ordering::Relaxed);
}

const R25: f32 = 10_000.0;
const BETA: f32 = 3950.0;
const T25_K: f32 = 298.15;
const R_DIVIDER: f32 = 10_000.0;
const V_REF: f32 = 3.3;
/// Margin from either rail, in volts, below which the probe counts as absent.
const RAIL_MARGIN: f32 = 0.01;
/// Plausible range of the probe; anything outside is a wiring fault.
const MIN_C: f32 = -40.0;
const MAX_C: f32 = 125.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureReading {
    pub raw: u16,
    pub celsius: f32,
}

pub struct TemperatureSensor {
    _channel: u32,
}

impl TemperatureSensor {
    pub fn new(channel: u32) -> Self {
        Self { _channel: channel }
    }

    pub fn read(&self) -> Result<TemperatureReading, SensorError> {
        let raw = self.read_adc().ok_or(SensorError::NotPresent)?;
        let celsius = adc_to_celsius(raw)?;
        Ok(TemperatureReading { raw, celsius })
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> Option<u16> {
        hw_init::adc1_read(self._channel)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> Option<u16> {
        Some(SIM_TEMP_ADC.load(Ordering::Relaxed))
    }
}

pub fn adc_to_celsius(raw: u16) -> Result<f32, SensorError> {
    let voltage = (f32::from(raw) / f32::from(ADC_MAX)) * V_REF;
    if voltage <= RAIL_MARGIN || voltage >= (V_REF - RAIL_MARGIN) {
        return Err(SensorError::NotPresent);
    }
    let r_ntc = R_DIVIDER * voltage / (V_REF - voltage);
    let inv_t = (1.0 / T25_K) + (1.0 / BETA) * (r_ntc / R25).ln();
    if inv_t <= 0.0 {
        return Err(SensorError::OutOfRange);
    }
    let celsius = (1.0 / inv_t) - 273.15;
    if !(MIN_C..=MAX_C).contains(&celsius) {
        return Err(SensorError::OutOfRange);
    }
    Ok(celsius)
}
