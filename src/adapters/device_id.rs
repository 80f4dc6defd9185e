//! Device identity derived from the ESP32 factory MAC address.
//!
//! Produces a stable, human-readable device ID in the form
//! `gasmeter-xxyyzz` (last 3 bytes of the 6-byte MAC in lowercase hex).
//! Used as the MQTT client id and in the default publish topic when no
//! `device_id` is configured.

use core::fmt::Write;

/// Fixed-size device ID string: "gasmeter-xxyyzz".
pub type DeviceIdString = heapless::String<24>;

/// Full 6-byte MAC address.
pub type MacAddress = [u8; 6];

/// Read the factory MAC address from eFuse.
#[cfg(target_os = "espidf")]
pub fn read_mac() -> MacAddress {
    let mut mac: MacAddress = [0u8; 6];
    unsafe {
        esp_idf_svc::sys::esp_efuse_mac_get_default(mac.as_mut_ptr());
    }
    mac
}

/// Simulation: returns a deterministic fake MAC.
#[cfg(not(target_os = "espidf"))]
pub fn read_mac() -> MacAddress {
    [0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE]
}

pub fn device_id(mac: &MacAddress) -> DeviceIdString {
    let mut id = DeviceIdString::new();
    let _ = write!(id, "gasmeter-{:02x}{:02x}{:02x}", mac[3], mac[4], mac[5]);
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_id_format() {
        let mac = [0x00, 0x11, 0x22, 0xAA, 0xBB, 0xCC];
        assert_eq!(device_id(&mac).as_str(), "gasmeter-aabbcc");
    }

    #[test]
    fn device_id_from_sim_mac() {
        assert_eq!(device_id(&read_mac()).as_str(), "gasmeter-efcafe");
    }
}
