//! Build-environment configuration source.
//!
//! Credentials are baked into the image at compile time, the same way
//! `embuild` passes the ESP-IDF environment through: set the variables in
//! the shell (or `.cargo/config.toml` `[env]`) before `cargo build`.
//!
//! | Variable                       | Field                  |
//! |--------------------------------|------------------------|
//! | `GASMETER_CONFIG_JSON`         | whole document (base)  |
//! | `GASMETER_WIFI_SSID`           | `ssid`                 |
//! | `GASMETER_WIFI_PASSWORD`       | `password`             |
//! | `GASMETER_MQTT_HOST`           | `broker_host`          |
//! | `GASMETER_MQTT_PORT`           | `broker_port`          |
//! | `GASMETER_MQTT_USER`           | `broker_user`          |
//! | `GASMETER_MQTT_PASSWORD`       | `broker_password`      |
//! | `GASMETER_DEVICE_ID`           | `device_id`            |
//! | `GASMETER_PUBLISH_INTERVAL_MS` | `publish_interval_ms`  |
//!
//! Individual variables override the JSON document, which overrides the
//! built-in defaults.

use crate::app::ports::ConfigPort;
use crate::config::AgentConfig;
use crate::error::ConfigError;

pub const CONFIG_JSON: &str = "GASMETER_CONFIG_JSON";
pub const WIFI_SSID: &str = "GASMETER_WIFI_SSID";
pub const WIFI_PASSWORD: &str = "GASMETER_WIFI_PASSWORD";
pub const MQTT_HOST: &str = "GASMETER_MQTT_HOST";
pub const MQTT_PORT: &str = "GASMETER_MQTT_PORT";
pub const MQTT_USER: &str = "GASMETER_MQTT_USER";
pub const MQTT_PASSWORD: &str = "GASMETER_MQTT_PASSWORD";
pub const DEVICE_ID: &str = "GASMETER_DEVICE_ID";
pub const PUBLISH_INTERVAL_MS: &str = "GASMETER_PUBLISH_INTERVAL_MS";

/// Values captured by the compiler.  `option_env!` needs literals.
const BUILD_VARS: &[(&str, Option<&str>)] = &[
    (CONFIG_JSON, option_env!("GASMETER_CONFIG_JSON")),
    (WIFI_SSID, option_env!("GASMETER_WIFI_SSID")),
    (WIFI_PASSWORD, option_env!("GASMETER_WIFI_PASSWORD")),
    (MQTT_HOST, option_env!("GASMETER_MQTT_HOST")),
    (MQTT_PORT, option_env!("GASMETER_MQTT_PORT")),
    (MQTT_USER, option_env!("GASMETER_MQTT_USER")),
    (MQTT_PASSWORD, option_env!("GASMETER_MQTT_PASSWORD")),
    (DEVICE_ID, option_env!("GASMETER_DEVICE_ID")),
    (PUBLISH_INTERVAL_MS, option_env!("GASMETER_PUBLISH_INTERVAL_MS")),
];

/// [`ConfigPort`] backed by a set of `GASMETER_*` variables.
#[derive(Debug, Clone, Default)]
pub struct BuildEnvConfig {
    vars: Vec<(&'static str, String)>,
}

impl BuildEnvConfig {
    /// Variables as they were when the crate was compiled.
    pub fn from_build_env() -> Self {
        Self::from_vars(
            BUILD_VARS
                .iter()
                .filter_map(|(k, v)| v.map(|v| (*k, v.to_string()))),
        )
    }

    /// Explicit variable set (tests, host tools).
    pub fn from_vars(vars: impl IntoIterator<Item = (&'static str, String)>) -> Self {
        Self {
            vars: vars.into_iter().collect(),
        }
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .iter()
            .rev()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }
}

fn set<const N: usize>(
    field: &mut heapless::String<N>,
    value: Option<&str>,
    too_long: &'static str,
) -> Result<(), ConfigError> {
    if let Some(v) = value {
        field.clear();
        field
            .push_str(v)
            .map_err(|_| ConfigError::ValidationFailed(too_long))?;
    }
    Ok(())
}

impl ConfigPort for BuildEnvConfig {
    fn load(&self) -> Result<AgentConfig, ConfigError> {
        let mut cfg = match self.get(CONFIG_JSON) {
            Some(doc) => AgentConfig::from_json(doc)?,
            None => AgentConfig::default(),
        };

        set(&mut cfg.ssid, self.get(WIFI_SSID), "wifi ssid longer than 32 bytes")?;
        set(&mut cfg.password, self.get(WIFI_PASSWORD), "wifi password longer than 64 bytes")?;
        set(&mut cfg.broker_host, self.get(MQTT_HOST), "mqtt host longer than 64 bytes")?;
        set(&mut cfg.broker_user, self.get(MQTT_USER), "mqtt user longer than 32 bytes")?;
        set(&mut cfg.broker_password, self.get(MQTT_PASSWORD), "mqtt password longer than 64 bytes")?;
        set(&mut cfg.device_id, self.get(DEVICE_ID), "device id longer than 32 bytes")?;

        if let Some(port) = self.get(MQTT_PORT) {
            cfg.broker_port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::ValidationFailed("mqtt port must be 1-65535"))?;
        }
        if let Some(ms) = self.get(PUBLISH_INTERVAL_MS) {
            cfg.publish_interval_ms = ms
                .trim()
                .parse()
                .map_err(|_| ConfigError::ValidationFailed("publish interval must be an integer"))?;
        }
        Ok(cfg)
    }
}
