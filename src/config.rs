//! Agent configuration.
//!
//! Everything the agent needs is read once at startup into an immutable
//! [`AgentConfig`].  Credentials come from the build environment (see
//! [`BuildEnvConfig`](crate::adapters::credentials::BuildEnvConfig)); the
//! remaining fields have sensible defaults for the reference board.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::pins;

pub type Ssid = heapless::String<32>;
pub type Secret = heapless::String<64>;
pub type Host = heapless::String<64>;
pub type Ident = heapless::String<32>;
pub type Topic = heapless::String<96>;

/// Core agent configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    // --- Wi-Fi ---
    pub ssid: Ssid,
    pub password: Secret,

    // --- MQTT ---
    pub broker_host: Host,
    pub broker_port: u16,
    pub broker_user: Ident,
    pub broker_password: Secret,
    /// Device identifier used in the topic and as MQTT client id.
    /// Empty means "derive from the factory MAC".
    pub device_id: Ident,
    /// Publish topic override. Empty means `tele/<device_id>/SENSOR`.
    pub topic: Topic,

    // --- Timing ---
    /// Publish cadence (milliseconds).
    pub publish_interval_ms: u64,
    /// Fixed wait at the end of every control tick (milliseconds).
    pub sample_interval_ms: u32,
    /// Wait between Wi-Fi connection attempts (milliseconds).
    pub link_retry_delay_ms: u32,
    /// Wait between MQTT connection attempts (milliseconds).
    pub broker_retry_delay_ms: u32,

    // --- Metering ---
    /// Usage units per counted pulse (e.g. 0.01 m³ per revolution).
    pub counter_multiplier: f64,
    /// Voltage at full ADC scale, including any external divider.
    pub analog_full_scale_volts: f32,

    // --- Pins ---
    pub analog_gpio: i32,
    pub pulse_gpio: i32,
    /// `None` when no temperature probe is fitted.
    pub temperature_gpio: Option<i32>,

    // --- Inspection ---
    pub http_port: u16,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            ssid: Ssid::new(),
            password: Secret::new(),

            broker_host: Host::new(),
            broker_port: 1883,
            broker_user: Ident::new(),
            broker_password: Secret::new(),
            device_id: Ident::new(),
            topic: Topic::new(),

            publish_interval_ms: 60_000, // 1/min
            sample_interval_ms: 50,      // 20 Hz
            link_retry_delay_ms: 500,
            broker_retry_delay_ms: 5_000,

            counter_multiplier: 0.01,
            analog_full_scale_volts: 5.0,

            analog_gpio: pins::ANALOG_ADC_GPIO,
            pulse_gpio: pins::PULSE_GPIO,
            temperature_gpio: Some(pins::TEMP_ADC_GPIO),

            http_port: 80,
        }
    }
}

impl AgentConfig {
    /// Parse a JSON document; absent fields keep their defaults.
    pub fn from_json(doc: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(doc).map_err(|_| ConfigError::Malformed)
    }

    /// Reject configurations the agent cannot run with.
    ///
    /// Missing credentials are reported as [`ConfigError::Missing`] so
    /// startup can distinguish "not provisioned" from "provisioned badly".
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ssid.is_empty() {
            return Err(ConfigError::Missing("wifi ssid"));
        }
        if !self.ssid.bytes().all(|b| (0x20..=0x7E).contains(&b)) {
            return Err(ConfigError::ValidationFailed(
                "ssid must be 1-32 printable ASCII bytes",
            ));
        }
        if !self.password.is_empty() && self.password.len() < 8 {
            return Err(ConfigError::ValidationFailed(
                "password must be 8-64 bytes for WPA2, or empty for open",
            ));
        }
        if self.broker_host.is_empty() {
            return Err(ConfigError::Missing("mqtt broker host"));
        }
        if self.broker_port == 0 {
            return Err(ConfigError::ValidationFailed("broker_port must be non-zero"));
        }
        if !(1_000..=3_600_000).contains(&self.publish_interval_ms) {
            return Err(ConfigError::ValidationFailed(
                "publish_interval_ms must be 1000-3600000",
            ));
        }
        if !(10..=1_000).contains(&self.sample_interval_ms) {
            return Err(ConfigError::ValidationFailed(
                "sample_interval_ms must be 10-1000",
            ));
        }
        if self.link_retry_delay_ms < 100 || self.broker_retry_delay_ms < 100 {
            return Err(ConfigError::ValidationFailed(
                "retry delays must be at least 100 ms",
            ));
        }
        if !(self.counter_multiplier.is_finite() && self.counter_multiplier > 0.0) {
            return Err(ConfigError::ValidationFailed(
                "counter_multiplier must be a positive number",
            ));
        }
        if !(self.analog_full_scale_volts > 0.0 && self.analog_full_scale_volts <= 30.0) {
            return Err(ConfigError::ValidationFailed(
                "analog_full_scale_volts must be 0-30",
            ));
        }
        if pins::adc1_channel(self.analog_gpio).is_none() {
            return Err(ConfigError::ValidationFailed(
                "analog_gpio must be an ADC1-capable pin",
            ));
        }
        if let Some(gpio) = self.temperature_gpio {
            if pins::adc1_channel(gpio).is_none() {
                return Err(ConfigError::ValidationFailed(
                    "temperature_gpio must be an ADC1-capable pin",
                ));
            }
        }
        Ok(())
    }

    /// Fill an empty `device_id` from a fallback (the MAC-derived id).
    pub fn with_device_id_fallback(mut self, fallback: &str) -> Self {
        if self.device_id.is_empty() {
            let _ = self.device_id.push_str(fallback);
        }
        self
    }

    /// The topic telemetry is published on.
    pub fn publish_topic(&self) -> Topic {
        if !self.topic.is_empty() {
            return self.topic.clone();
        }
        let mut topic = Topic::new();
        use core::fmt::Write;
        let _ = write!(topic, "tele/{}/SENSOR", self.device_id);
        topic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provisioned() -> AgentConfig {
        let mut c = AgentConfig::default();
        c.ssid.push_str("HomeWiFi").unwrap();
        c.password.push_str("mysecret8").unwrap();
        c.broker_host.push_str("mqtt.local").unwrap();
        c.device_id.push_str("gasmeter").unwrap();
        c
    }

    #[test]
    fn default_config_is_unprovisioned() {
        assert_eq!(
            AgentConfig::default().validate(),
            Err(ConfigError::Missing("wifi ssid"))
        );
    }

    #[test]
    fn provisioned_config_is_valid() {
        assert_eq!(provisioned().validate(), Ok(()));
    }

    #[test]
    fn missing_broker_is_reported_as_missing() {
        let mut c = provisioned();
        c.broker_host.clear();
        assert_eq!(c.validate(), Err(ConfigError::Missing("mqtt broker host")));
    }

    #[test]
    fn short_password_rejected_open_network_accepted() {
        let mut c = provisioned();
        c.password.clear();
        c.password.push_str("short").unwrap();
        assert!(matches!(c.validate(), Err(ConfigError::ValidationFailed(_))));
        c.password.clear();
        assert_eq!(c.validate(), Ok(()));
    }

    #[test]
    fn zero_multiplier_rejected() {
        let mut c = provisioned();
        c.counter_multiplier = 0.0;
        assert!(matches!(c.validate(), Err(ConfigError::ValidationFailed(_))));
    }

    #[test]
    fn timing_ratios_make_sense() {
        let c = AgentConfig::default();
        assert!(
            u64::from(c.sample_interval_ms) < c.publish_interval_ms,
            "sampling must be faster than publishing"
        );
        assert!(c.link_retry_delay_ms < c.broker_retry_delay_ms);
    }

    #[test]
    fn default_topic_uses_device_id() {
        assert_eq!(provisioned().publish_topic().as_str(), "tele/gasmeter/SENSOR");
        let mut c = provisioned();
        c.topic.push_str("home/gas").unwrap();
        assert_eq!(c.publish_topic().as_str(), "home/gas");
    }

    #[test]
    fn device_id_fallback_only_when_empty() {
        let c = provisioned().with_device_id_fallback("gasmeter-efcafe");
        assert_eq!(c.device_id.as_str(), "gasmeter");
        let mut c = provisioned();
        c.device_id.clear();
        let c = c.with_device_id_fallback("gasmeter-efcafe");
        assert_eq!(c.device_id.as_str(), "gasmeter-efcafe");
    }

    #[test]
    fn json_partial_document_keeps_defaults() {
        let c = AgentConfig::from_json(
            r#"{"ssid":"Net","broker_host":"10.0.0.2","publish_interval_ms":30000}"#,
        )
        .unwrap();
        assert_eq!(c.ssid.as_str(), "Net");
        assert_eq!(c.publish_interval_ms, 30_000);
        assert_eq!(c.broker_port, 1883);
        assert!((c.counter_multiplier - 0.01).abs() < f64::EPSILON);
    }

    #[test]
    fn json_garbage_is_malformed() {
        assert_eq!(AgentConfig::from_json("{ssid"), Err(ConfigError::Malformed));
    }

    #[test]
    fn serde_roundtrip() {
        let c = provisioned();
        let json = serde_json::to_string(&c).unwrap();
        let c2 = AgentConfig::from_json(&json).unwrap();
        assert_eq!(c, c2);
    }
}
