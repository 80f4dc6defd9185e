//! MQTT client adapter.
//!
//! Implements [`BrokerPort`] on top of the ESP-IDF MQTT client.  The
//! client's own background reconnect is not relied upon: `connect`
//! creates a client and waits for CONNACK, `disconnect` drops it, so the
//! session lifecycle is driven entirely by the supervisor.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `esp_idf_svc::mqtt::client::EspMqttClient`.
//! - **all other targets**: recording simulation for host tests.

use log::info;
#[cfg(target_os = "espidf")]
use log::warn;

use crate::app::ports::BrokerPort;
use crate::config::AgentConfig;
use crate::error::BrokerError;

#[cfg(target_os = "espidf")]
use std::sync::Arc;
#[cfg(target_os = "espidf")]
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

#[cfg(target_os = "espidf")]
use esp_idf_svc::mqtt::client::{EspMqttClient, EventPayload, MqttClientConfiguration, QoS};

/// How long one connection attempt waits for CONNACK.
#[cfg(target_os = "espidf")]
const CONNACK_TIMEOUT_MS: u32 = 10_000;
#[cfg(target_os = "espidf")]
const CONNACK_POLL_MS: u32 = 50;

/// Connection parameters, copied out of the config.
#[derive(Debug, Clone)]
pub struct BrokerSettings {
    pub url: String,
    pub client_id: String,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl BrokerSettings {
    pub fn from_config(config: &AgentConfig) -> Self {
        let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());
        Self {
            url: format!("mqtt://{}:{}", config.broker_host, config.broker_port),
            client_id: config.device_id.to_string(),
            user: non_empty(&config.broker_user),
            password: non_empty(&config.broker_password),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// MQTT adapter
// ───────────────────────────────────────────────────────────────

pub struct MqttBroker {
    settings: BrokerSettings,

    #[cfg(target_os = "espidf")]
    client: Option<EspMqttClient<'static>>,
    /// Written by the client's event callback.
    #[cfg(target_os = "espidf")]
    connected: Arc<AtomicBool>,
    #[cfg(target_os = "espidf")]
    last_error: Arc<AtomicI32>,

    #[cfg(not(target_os = "espidf"))]
    sim: SimBroker,
}

/// Host-side stand-in for the remote broker.
#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Default)]
pub struct SimBroker {
    pub session_up: bool,
    /// Upcoming connection attempts that will time out.
    pub refuse_next: u32,
    /// Upcoming publishes that the transport rejects.
    pub reject_next: u32,
    pub connects: u32,
    pub published: Vec<(String, Vec<u8>)>,
}

impl MqttBroker {
    #[cfg(target_os = "espidf")]
    pub fn new(settings: BrokerSettings) -> Self {
        Self {
            settings,
            client: None,
            connected: Arc::new(AtomicBool::new(false)),
            last_error: Arc::new(AtomicI32::new(0)),
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new(settings: BrokerSettings) -> Self {
        Self {
            settings,
            sim: SimBroker::default(),
        }
    }

    pub fn settings(&self) -> &BrokerSettings {
        &self.settings
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self) -> Result<(), BrokerError> {
        use esp_idf_hal::delay::FreeRtos;

        self.client = None;
        self.connected.store(false, Ordering::Release);
        self.last_error.store(0, Ordering::Release);

        let conf = MqttClientConfiguration {
            client_id: Some(&self.settings.client_id),
            username: self.settings.user.as_deref(),
            password: self.settings.password.as_deref(),
            ..Default::default()
        };

        let connected = Arc::clone(&self.connected);
        let last_error = Arc::clone(&self.last_error);
        let client = EspMqttClient::new_cb(&self.settings.url, &conf, move |event| {
            match event.payload() {
                EventPayload::Connected(_) => connected.store(true, Ordering::Release),
                EventPayload::Disconnected => connected.store(false, Ordering::Release),
                EventPayload::Error(e) => {
                    warn!("MQTT: client error — {:?}", e);
                    last_error.store(e.code(), Ordering::Release);
                }
                _ => {}
            }
        })
        .map_err(|e| BrokerError::Unreachable(Some(e.code())))?;
        self.client = Some(client);

        let mut waited = 0;
        while !self.connected.load(Ordering::Acquire) {
            if waited >= CONNACK_TIMEOUT_MS {
                self.client = None;
                let code = self.last_error.load(Ordering::Acquire);
                return Err(BrokerError::Unreachable((code != 0).then_some(code)));
            }
            FreeRtos::delay_ms(CONNACK_POLL_MS);
            waited += CONNACK_POLL_MS;
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self) -> Result<(), BrokerError> {
        self.sim.connects += 1;
        if self.sim.refuse_next > 0 {
            self.sim.refuse_next -= 1;
            return Err(BrokerError::Unreachable(None));
        }
        self.sim.session_up = true;
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_disconnect(&mut self) {
        // Dropping the client stops its task and closes the socket.
        self.client = None;
        self.connected.store(false, Ordering::Release);
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_disconnect(&mut self) {
        self.sim.session_up = false;
    }

    #[cfg(target_os = "espidf")]
    fn platform_is_connected(&self) -> bool {
        self.client.is_some() && self.connected.load(Ordering::Acquire)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_is_connected(&self) -> bool {
        self.sim.session_up
    }

    #[cfg(target_os = "espidf")]
    fn platform_publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), BrokerError> {
        let client = self.client.as_mut().ok_or(BrokerError::SendFailed(None))?;
        client
            .publish(topic, QoS::AtMostOnce, false, payload)
            .map(|_| ())
            .map_err(|e| BrokerError::SendFailed(Some(e.code())))
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), BrokerError> {
        if !self.sim.session_up {
            return Err(BrokerError::SendFailed(None));
        }
        if self.sim.reject_next > 0 {
            self.sim.reject_next -= 1;
            return Err(BrokerError::SendFailed(Some(-1)));
        }
        self.sim.published.push((topic.to_string(), payload.to_vec()));
        Ok(())
    }
}

#[cfg(not(target_os = "espidf"))]
impl MqttBroker {
    pub fn sim(&self) -> &SimBroker {
        &self.sim
    }

    pub fn sim_mut(&mut self) -> &mut SimBroker {
        &mut self.sim
    }
}

// ───────────────────────────────────────────────────────────────
// BrokerPort
// ───────────────────────────────────────────────────────────────

impl BrokerPort for MqttBroker {
    fn connect(&mut self) -> Result<(), BrokerError> {
        info!(
            "MQTT: connecting to {} as '{}'",
            self.settings.url, self.settings.client_id
        );
        self.platform_connect()?;
        info!("MQTT: session established");
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.platform_is_connected()
    }

    fn disconnect(&mut self) {
        self.platform_disconnect();
        info!("MQTT: session closed");
    }

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), BrokerError> {
        self.platform_publish(topic, payload)
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
