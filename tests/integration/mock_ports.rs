//! Mock port adapters for integration tests.
//!
//! Sensors, inspection requests and time are scripted; Wi-Fi and MQTT use
//! the crate's own host simulations so the real adapter code runs too.

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use embedded_hal::delay::DelayNs;

use gasmeter::adapters::mqtt::{BrokerSettings, MqttBroker};
use gasmeter::adapters::wifi::WifiLink;
use gasmeter::app::events::AppEvent;
use gasmeter::app::ports::{ClockPort, EventSink, InspectionPort, SensorPort};
use gasmeter::config::AgentConfig;
use gasmeter::connectivity::{ConnectivitySupervisor, RetryPolicy};
use gasmeter::counter::Level;
use gasmeter::error::SensorError;
use gasmeter::inspection::Response;

// ── Sensors ───────────────────────────────────────────────────

pub struct MockSensors {
    pub voltage: f32,
    pub level: Level,
    pub temperature: Result<f32, SensorError>,
}

impl Default for MockSensors {
    fn default() -> Self {
        Self {
            voltage: 1.25,
            level: Level::Low,
            temperature: Ok(21.5),
        }
    }
}

impl SensorPort for MockSensors {
    fn read_analog_voltage(&mut self) -> f32 {
        self.voltage
    }

    fn read_digital_level(&mut self) -> Level {
        self.level
    }

    fn read_temperature(&mut self) -> Result<f32, SensorError> {
        self.temperature
    }
}

// ── Inspection ────────────────────────────────────────────────

#[derive(Default)]
pub struct MockInspection {
    pub requests: VecDeque<String>,
    pub responses: Vec<Response>,
}

#[allow(dead_code)]
impl MockInspection {
    pub fn request(&mut self, path: &str) {
        self.requests.push_back(path.to_string());
    }

    pub fn last_body(&self) -> &str {
        self.responses.last().map_or("", |r| r.body.as_str())
    }
}

impl InspectionPort for MockInspection {
    fn next_request(&mut self) -> Option<String> {
        self.requests.pop_front()
    }

    fn respond(&mut self, response: &Response) {
        self.responses.push(response.clone());
    }
}

// ── Clock ─────────────────────────────────────────────────────

/// Manually advanced clock.  Wall time is a fixed base plus the
/// monotonic offset.
pub struct ManualClock {
    now_ms: Rc<Cell<u64>>,
    base: DateTime<Utc>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now_ms: Rc::new(Cell::new(0)),
            // 2026-10-19T12:00:00Z
            base: DateTime::from_timestamp(1_792_411_200, 0).unwrap(),
        }
    }

    pub fn set(&self, ms: u64) {
        self.now_ms.set(ms);
    }

    /// A delay whose waits move this clock forward.
    pub fn driving_delay(&self) -> RecordingDelay {
        RecordingDelay {
            clock: Some(Rc::clone(&self.now_ms)),
            ..RecordingDelay::default()
        }
    }
}

impl ClockPort for ManualClock {
    fn monotonic_ms(&self) -> u64 {
        self.now_ms.get()
    }

    fn utc_now(&self) -> DateTime<Utc> {
        self.base + chrono::TimeDelta::milliseconds(self.now_ms.get() as i64)
    }
}

// ── Delay ─────────────────────────────────────────────────────

/// Records requested waits instead of sleeping.  When attached to a
/// [`ManualClock`], every wait also advances that clock.
#[derive(Default)]
pub struct RecordingDelay {
    pub total_ns: u64,
    clock: Option<Rc<Cell<u64>>>,
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        let before_ms = self.total_ns / 1_000_000;
        self.total_ns += u64::from(ns);
        if let Some(clock) = &self.clock {
            clock.set(clock.get() + self.total_ns / 1_000_000 - before_ms);
        }
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct CollectSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl CollectSink {
    pub fn published(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, AppEvent::Published { .. }))
            .count()
    }

    pub fn dropped(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, AppEvent::PublishDropped(_)))
            .count()
    }
}

impl EventSink for CollectSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Fixtures ──────────────────────────────────────────────────

pub type SimSupervisor = ConnectivitySupervisor<WifiLink, MqttBroker, RecordingDelay>;

pub fn provisioned_config(interval_ms: u64) -> AgentConfig {
    let mut c = AgentConfig::default();
    c.ssid.push_str("HomeWiFi").unwrap();
    c.password.push_str("mysecret8").unwrap();
    c.broker_host.push_str("mqtt.local").unwrap();
    c.device_id.push_str("gasmeter-aabbcc").unwrap();
    c.publish_interval_ms = interval_ms;
    c
}

pub fn sim_supervisor(config: &AgentConfig) -> SimSupervisor {
    sim_supervisor_with(config, RecordingDelay::default())
}

pub fn sim_supervisor_with(config: &AgentConfig, delay: RecordingDelay) -> SimSupervisor {
    ConnectivitySupervisor::new(
        WifiLink::new(&config.ssid, &config.password),
        MqttBroker::new(BrokerSettings::from_config(config)),
        delay,
        RetryPolicy::unbounded(config.link_retry_delay_ms),
        RetryPolicy::unbounded(config.broker_retry_delay_ms),
    )
}
