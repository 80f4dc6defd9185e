//! WiFi station-mode adapter.
//!
//! Implements [`LinkPort`]: one blocking connection attempt per call,
//! including DHCP, plus a cheap liveness probe.  Retry pacing and failure
//! accounting live in the [`ConnectivitySupervisor`](crate::connectivity::ConnectivitySupervisor).
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver via `esp_idf_svc::wifi`.
//! - **all other targets**: simulation with scripted failures and drops.

use log::{info, warn};

use crate::app::ports::LinkPort;
use crate::config::{Secret, Ssid};
use crate::error::LinkError;

#[cfg(target_os = "espidf")]
use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiLink {
    ssid: Ssid,
    #[cfg(target_os = "espidf")]
    password: Secret,

    #[cfg(target_os = "espidf")]
    wifi: BlockingWifi<EspWifi<'static>>,

    /// Simulation: association state as the driver would report it.
    #[cfg(not(target_os = "espidf"))]
    sim_associated: bool,
    /// Simulation: this many upcoming attempts fail.
    #[cfg(not(target_os = "espidf"))]
    sim_fail_next: u32,
    #[cfg(not(target_os = "espidf"))]
    sim_attempts: u32,
}

impl WifiLink {
    #[cfg(target_os = "espidf")]
    pub fn new(wifi: BlockingWifi<EspWifi<'static>>, ssid: &Ssid, password: &Secret) -> Self {
        Self {
            ssid: ssid.clone(),
            password: password.clone(),
            wifi,
        }
    }

    /// The simulated access point accepts any passphrase.
    #[cfg(not(target_os = "espidf"))]
    pub fn new(ssid: &Ssid, _password: &Secret) -> Self {
        Self {
            ssid: ssid.clone(),
            sim_associated: false,
            sim_fail_next: 0,
            sim_attempts: 0,
        }
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    /// Station IPv4 address, for the startup banner.
    #[cfg(target_os = "espidf")]
    pub fn ip_addr(&self) -> Option<core::net::Ipv4Addr> {
        self.wifi.wifi().sta_netif().get_ip_info().ok().map(|i| i.ip)
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn ip_addr(&self) -> Option<core::net::Ipv4Addr> {
        self.sim_associated.then_some(core::net::Ipv4Addr::LOCALHOST)
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self) -> Result<(), LinkError> {
        use esp_idf_svc::sys::ESP_ERR_INVALID_ARG;

        let auth_method = if self.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        let cfg = Configuration::Client(ClientConfiguration {
            ssid: self
                .ssid
                .as_str()
                .try_into()
                .map_err(|_| LinkError::Config(ESP_ERR_INVALID_ARG))?,
            password: self
                .password
                .as_str()
                .try_into()
                .map_err(|_| LinkError::Config(ESP_ERR_INVALID_ARG))?,
            auth_method,
            ..Default::default()
        });
        self.wifi
            .set_configuration(&cfg)
            .map_err(|e| LinkError::Config(e.code()))?;
        if !self.wifi.is_started().unwrap_or(false) {
            self.wifi
                .start()
                .map_err(|e| LinkError::Config(e.code()))?;
        }
        self.wifi
            .connect()
            .map_err(|e| LinkError::ConnectFailed(e.code()))?;
        self.wifi
            .wait_netif_up()
            .map_err(|e| LinkError::ConnectFailed(e.code()))?;
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self) -> Result<(), LinkError> {
        self.sim_attempts = self.sim_attempts.wrapping_add(1);
        if self.sim_fail_next > 0 {
            self.sim_fail_next -= 1;
            warn!("WiFi(sim): simulated association failure (attempt {})", self.sim_attempts);
            return Err(LinkError::Unknown);
        }
        self.sim_associated = true;
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_disconnect(&mut self) {
        if let Err(e) = self.wifi.disconnect() {
            warn!("WiFi: disconnect failed — {}", e);
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_disconnect(&mut self) {
        self.sim_associated = false;
    }

    #[cfg(target_os = "espidf")]
    fn platform_is_connected(&self) -> bool {
        self.wifi.is_connected().unwrap_or(false)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_is_connected(&self) -> bool {
        self.sim_associated
    }
}

// ───────────────────────────────────────────────────────────────
// Simulation controls
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
impl WifiLink {
    /// The access point goes away without telling us.
    pub fn sim_drop(&mut self) {
        self.sim_associated = false;
    }

    /// Make the next `n` connection attempts fail.
    pub fn sim_fail_next(&mut self, n: u32) {
        self.sim_fail_next = n;
    }

    pub fn sim_attempts(&self) -> u32 {
        self.sim_attempts
    }
}

// ───────────────────────────────────────────────────────────────
// LinkPort
// ───────────────────────────────────────────────────────────────

impl LinkPort for WifiLink {
    fn connect(&mut self) -> Result<(), LinkError> {
        info!("WiFi: connecting to '{}'", self.ssid);
        self.platform_connect()?;
        info!("WiFi: connected (ip={:?})", self.ip_addr());
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.platform_is_connected()
    }

    fn disconnect(&mut self) {
        self.platform_disconnect();
        info!("WiFi: disconnected");
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn link() -> WifiLink {
        let mut ssid = Ssid::new();
        ssid.push_str("HomeWiFi").unwrap();
        let mut pass = Secret::new();
        pass.push_str("mysecret8").unwrap();
        WifiLink::new(&ssid, &pass)
    }

    #[test]
    fn connect_disconnect_roundtrip() {
        let mut l = link();
        assert!(!l.is_connected());
        l.connect().unwrap();
        assert!(l.is_connected());
        assert!(l.ip_addr().is_some());
        l.disconnect();
        assert!(!l.is_connected());
        assert!(l.ip_addr().is_none());
    }

    #[test]
    fn scripted_failures_then_success() {
        let mut l = link();
        l.sim_fail_next(2);
        assert_eq!(l.connect(), Err(LinkError::Unknown));
        assert_eq!(l.connect(), Err(LinkError::Unknown));
        assert!(l.connect().is_ok());
        assert_eq!(l.sim_attempts(), 3);
    }

    #[test]
    fn drop_is_visible_to_probe() {
        let mut l = link();
        l.connect().unwrap();
        l.sim_drop();
        assert!(!l.is_connected());
    }
}
