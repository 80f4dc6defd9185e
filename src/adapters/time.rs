//! ESP32 time adapter.
//!
//! Implements [`ClockPort`].
//!
//! - **`target_os = "espidf"`**: monotonic time from `esp_timer_get_time()`
//!   (microsecond precision), wall clock from the RTC that SNTP keeps in
//!   sync.
//! - **`not(target_os = "espidf")`**: `std::time::Instant` / `SystemTime`
//!   for host-side testing and simulation.

use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};

use crate::app::ports::ClockPort;

/// Anything before this is an RTC that was never synced (2020-01-01).
const EPOCH_2020: i64 = 1_577_836_800;

/// System clock for the ESP32-S3 platform.
pub struct SystemClock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Whether the wall clock looks like it has been set by SNTP.
    pub fn is_synced(&self) -> bool {
        self.utc_now().timestamp() >= EPOCH_2020
    }
}

impl ClockPort for SystemClock {
    #[cfg(target_os = "espidf")]
    fn monotonic_ms(&self) -> u64 {
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64 / 1_000
    }

    #[cfg(not(target_os = "espidf"))]
    fn monotonic_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    /// Before SNTP sync this is whatever the RTC holds (usually 1970).
    fn utc_now(&self) -> DateTime<Utc> {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        DateTime::from_timestamp(since_epoch.as_secs() as i64, since_epoch.subsec_nanos())
            .unwrap_or_default()
    }
}

/// Start the SNTP client.  The returned handle must be kept alive.
#[cfg(target_os = "espidf")]
pub fn start_sntp() -> Result<esp_idf_svc::sntp::EspSntp<'static>, esp_idf_svc::sys::EspError> {
    let sntp = esp_idf_svc::sntp::EspSntp::new_default()?;
    log::info!("SNTP: started");
    Ok(sntp)
}
