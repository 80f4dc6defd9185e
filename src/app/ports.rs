//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService / ConnectivitySupervisor
//! ```
//!
//! Driven adapters (sensors, Wi-Fi, MQTT, HTTP, clock, event sinks)
//! implement these traits.  The domain consumes them via generics, so the
//! core never touches hardware or sockets directly and every component
//! can be exercised on the host with mocks.

use chrono::{DateTime, Utc};

use crate::config::AgentConfig;
use crate::counter::Level;
use crate::error::{BrokerError, ConfigError, LinkError, SensorError};
use crate::inspection::Response;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the sampling step calls this once per tick.
pub trait SensorPort {
    /// Analog input scaled to volts.
    fn read_analog_voltage(&mut self) -> f32;

    /// Current logical level of the pulse line.
    fn read_digital_level(&mut self) -> Level;

    /// Temperature probe in °C.  Errors degrade the field, never the loop.
    fn read_temperature(&mut self) -> Result<f32, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Network ports (driven adapters: domain → Wi-Fi / MQTT stacks)
// ───────────────────────────────────────────────────────────────

/// Link-layer session (Wi-Fi station).
pub trait LinkPort {
    /// One blocking connection attempt, including address acquisition.
    fn connect(&mut self) -> Result<(), LinkError>;

    /// Liveness probe as reported by the underlying stack.
    fn is_connected(&self) -> bool;

    fn disconnect(&mut self);
}

/// Pub/sub session (MQTT client), layered on an established link.
pub trait BrokerPort {
    /// One blocking connection attempt (returns once CONNACK is seen
    /// or the attempt times out).
    fn connect(&mut self) -> Result<(), BrokerError>;

    fn is_connected(&self) -> bool;

    /// Tear down the session, e.g. after the link went away.
    fn disconnect(&mut self);

    /// At-most-once, non-retained publish.
    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), BrokerError>;
}

// ───────────────────────────────────────────────────────────────
// Inspection port (driven adapter: HTTP server ↔ domain)
// ───────────────────────────────────────────────────────────────

/// Pull-style request source.  Non-blocking: `next_request` returns
/// `None` immediately when nobody is asking.
pub trait InspectionPort {
    /// Accept at most one pending request and return its path.
    fn next_request(&mut self) -> Option<String>;

    /// Answer the request most recently returned by `next_request`.
    fn respond(&mut self, response: &Response);
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

pub trait ClockPort {
    /// Milliseconds since boot, never goes backwards.
    fn monotonic_ms(&self) -> u64;

    /// Wall clock.  Only meaningful after SNTP sync.
    fn utc_now(&self) -> DateTime<Utc>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port
// ───────────────────────────────────────────────────────────────

/// Produces the startup configuration.
///
/// Implementations return the config unvalidated; the caller runs
/// [`AgentConfig::validate`] and treats any error as fatal.
pub trait ConfigPort {
    fn load(&self) -> Result<AgentConfig, ConfigError>;
}
