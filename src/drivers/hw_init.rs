//! One-shot hardware peripheral initialization.
//!
//! Configures the ADC1 oneshot unit for the analog and temperature
//! channels and the pulse line as a plain input, using raw ESP-IDF sys
//! calls.  Called once from `main()` before the control loop starts.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    /// The configured GPIO is not routed to ADC1.
    NotAnAdcPin(i32),
    AdcInitFailed(i32),
    GpioConfigFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotAnAdcPin(gpio)    => write!(f, "GPIO{} has no ADC1 channel", gpio),
            Self::AdcInitFailed(rc)    => write!(f, "ADC1 init failed (rc={})", rc),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
        }
    }
}

/// Pin assignment handed over from the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorPins {
    pub analog_channel: u32,
    pub pulse_gpio: i32,
    pub temperature_channel: Option<u32>,
}

impl SensorPins {
    /// Resolve GPIO numbers to ADC1 channels.
    pub fn resolve(
        analog_gpio: i32,
        pulse_gpio: i32,
        temperature_gpio: Option<i32>,
    ) -> Result<Self, HwInitError> {
        let analog_channel =
            pins::adc1_channel(analog_gpio).ok_or(HwInitError::NotAnAdcPin(analog_gpio))?;
        let temperature_channel = match temperature_gpio {
            Some(gpio) => Some(pins::adc1_channel(gpio).ok_or(HwInitError::NotAnAdcPin(gpio))?),
            None => None,
        };
        Ok(Self {
            analog_channel,
            pulse_gpio,
            temperature_channel,
        })
    }
}

#[cfg(target_os = "espidf")]
pub fn init_peripherals(p: &SensorPins) -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the control loop; single-threaded.
    unsafe {
        init_adc(p)?;
        init_pulse_input(p.pulse_gpio)?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals(_p: &SensorPins) -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── ADC (oneshot) ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// SAFETY: Must be called only from the single-threaded init path or the
/// main-loop ADC read path.  `init_adc()` completes before the loop starts.
#[cfg(target_os = "espidf")]
unsafe fn adc1_handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

#[cfg(target_os = "espidf")]
unsafe fn init_adc(p: &SensorPins) -> Result<(), HwInitError> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is only written here, once at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK as i32 { return Err(HwInitError::AdcInitFailed(ret)); }

    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };

    let channels = [Some(p.analog_channel), p.temperature_channel];
    for ch in channels.into_iter().flatten() {
        let ret = unsafe { adc_oneshot_config_channel(adc1_handle(), ch, &chan_cfg) };
        if ret != ESP_OK as i32 { return Err(HwInitError::AdcInitFailed(ret)); }
    }

    info!(
        "hw_init: ADC1 configured (CH{}=meter, temp={:?})",
        p.analog_channel, p.temperature_channel
    );
    Ok(())
}

/// Raw 12-bit reading, or `None` if the conversion failed.
#[cfg(target_os = "espidf")]
pub fn adc1_read(channel: u32) -> Option<u16> {
    let mut raw: i32 = 0;
    // SAFETY: adc1_handle() contract: single-threaded main-loop access only.
    let ret = unsafe { adc_oneshot_read(adc1_handle(), channel, &mut raw) };
    if ret != ESP_OK as i32 {
        return None;
    }
    Some(raw.clamp(0, pins::ADC_MAX as i32) as u16)
}

// ── GPIO input ────────────────────────────────────────────────

/// The comparator drives the line, so no pulls.
#[cfg(target_os = "espidf")]
unsafe fn init_pulse_input(pin: i32) -> Result<(), HwInitError> {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pin,
        mode: gpio_mode_t_GPIO_MODE_INPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as i32 { return Err(HwInitError::GpioConfigFailed(ret)); }

    info!("hw_init: GPIO{} configured as pulse input", pin);
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_read(pin: i32) -> i32 {
    // SAFETY: gpio_get_level is a read-only register access on an
    // already-configured input pin; safe to call from main context.
    unsafe { gpio_get_level(pin) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_default_pins() {
        let p = SensorPins::resolve(pins::ANALOG_ADC_GPIO, pins::PULSE_GPIO, Some(pins::TEMP_ADC_GPIO))
            .unwrap();
        assert_eq!(p.analog_channel, 0);
        assert_eq!(p.temperature_channel, Some(8));
        assert_eq!(p.pulse_gpio, 5);
    }

    #[test]
    fn rejects_non_adc_gpio() {
        assert_eq!(
            SensorPins::resolve(20, pins::PULSE_GPIO, None),
            Err(HwInitError::NotAnAdcPin(20))
        );
        assert_eq!(
            SensorPins::resolve(1, pins::PULSE_GPIO, Some(40)),
            Err(HwInitError::NotAnAdcPin(40))
        );
    }

    #[test]
    fn probe_is_optional() {
        let p = SensorPins::resolve(2, 6, None).unwrap();
        assert_eq!(p.temperature_channel, None);
    }
}
