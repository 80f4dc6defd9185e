//! GPIO / peripheral pin assignments for the gas meter reader board.
//!
//! Defaults only: the active assignment lives in
//! [`AgentConfig`](crate::config::AgentConfig) so a differently wired
//! board can be flashed without a code change.

// ---------------------------------------------------------------------------
// Sensors: Analog (ADC1)
// ---------------------------------------------------------------------------

/// Reflective IR sensor on the meter's index wheel: analog voltage via
/// resistive divider.  ADC1 channel 0 (GPIO 1 on ESP32-S3).
pub const ANALOG_ADC_GPIO: i32 = 1;

/// NTC thermistor: 10 kΩ @ 25 °C, voltage-divider to ADC.
/// ADC1 channel 8 (GPIO 9 on ESP32-S3).  Optional fitment.
pub const TEMP_ADC_GPIO: i32 = 9;

// ---------------------------------------------------------------------------
// Sensors: Digital
// ---------------------------------------------------------------------------

/// Comparator output of the IR sensor.  HIGH while the reflective
/// segment of the index wheel passes the sensor.
pub const PULSE_GPIO: i32 = 5;

// ---------------------------------------------------------------------------
// ADC configuration
// ---------------------------------------------------------------------------

/// Full-scale raw reading for the 12-bit oneshot ADC.
pub const ADC_MAX: u16 = 4095;

/// Map a GPIO number to its ADC1 channel (ESP32-S3: GPIO 1..=10 → CH 0..=9).
pub const fn adc1_channel(gpio: i32) -> Option<u32> {
    if gpio >= 1 && gpio <= 10 {
        Some((gpio - 1) as u32)
    } else {
        None
    }
}
