//! Pulse line from the meter's comparator.
//!
//! Polled once per tick; edge detection lives in
//! [`EdgeCounter`](crate::counter::EdgeCounter), not here.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: `gpio_get_level` on the input configured by hw_init.
//! On host/test: reads from a static AtomicBool for injection.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicBool, Ordering};

use crate::counter::Level;
#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;

#[cfg(not(target_os = "espidf"))]
static SIM_PULSE_HIGH: AtomicBool = AtomicBool::new(false);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_pulse(high: bool) {
    SIM_PULSE_HIGH.store(high, Ordering::Relaxed);
}

pub struct PulseInput {
    _gpio: i32,
}

impl PulseInput {
    pub fn new(gpio: i32) -> Self {
        Self { _gpio: gpio }
    }

    #[cfg(target_os = "espidf")]
    pub fn read(&self) -> Level {
        Level::from_raw(hw_init::gpio_read(self._gpio))
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn read(&self) -> Level {
        Level::from_raw(i32::from(SIM_PULSE_HIGH.load(Ordering::Relaxed)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_level_follows_injection() {
        let p = PulseInput::new(5);
        sim_set_pulse(true);
        assert_eq!(p.read(), Level::High);
        sim_set_pulse(false);
        assert_eq!(p.read(), Level::Low);
    }
}
