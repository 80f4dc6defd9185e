//! Connectivity supervisor: owns the Wi-Fi link and the MQTT session.
//!
//! ```text
//!            ┌──────────────┐  connect ok   ┌───────────┐
//!  start ──▶ │ Disconnected │ ────────────▶ │ Connected │
//!            └──────┬───────┘ ◀──────────── └───────────┘
//!                   │ request     probe fails      ▲
//!                   ▼                              │
//!             ┌────────────┐     handshake ok      │
//!             │ Connecting │ ──────────────────────┘
//!             └────────────┘
//! ```
//!
//! Two such machines run side by side.  The broker machine may only leave
//! `Disconnected` while the link machine is `Connected`, and a link loss
//! tears the broker session down with it.
//!
//! Recovery is synchronous: [`ConnectivitySupervisor::ensure_ready`]
//! loops with a fixed wait until both sessions are up (or a bounded
//! [`RetryPolicy`] runs out).  It is only called from the publish path,
//! never from sampling.

mod health;
mod policy;

pub use health::{ConnectionHealth, SessionState};
pub use policy::RetryPolicy;

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crate::app::ports::{BrokerPort, LinkPort};
use crate::error::{ConnectivityError, PublishError};

/// Whether the broker loop finished or has to hand back to link recovery.
enum BrokerOutcome {
    Connected,
    LinkLost,
}

pub struct ConnectivitySupervisor<L, B, D> {
    link: L,
    broker: B,
    delay: D,
    link_health: ConnectionHealth,
    broker_health: ConnectionHealth,
    link_policy: RetryPolicy,
    broker_policy: RetryPolicy,
}

impl<L: LinkPort, B: BrokerPort, D: DelayNs> ConnectivitySupervisor<L, B, D> {
    pub fn new(
        link: L,
        broker: B,
        delay: D,
        link_policy: RetryPolicy,
        broker_policy: RetryPolicy,
    ) -> Self {
        Self {
            link,
            broker,
            delay,
            link_health: ConnectionHealth::new(),
            broker_health: ConnectionHealth::new(),
            link_policy,
            broker_policy,
        }
    }

    // ── Public API ────────────────────────────────────────────

    /// Bring both sessions to `Connected`, blocking until they are.
    ///
    /// Drops that happened since the previous call are detected here (or
    /// already were, by [`publish`](Self::publish)) and counted once each.
    /// With both sessions up this is a cheap probe and changes nothing.
    pub fn ensure_ready(&mut self) -> Result<(), ConnectivityError> {
        self.probe();
        loop {
            self.ensure_link()?;
            match self.ensure_broker()? {
                BrokerOutcome::Connected => return Ok(()),
                BrokerOutcome::LinkLost => {}
            }
        }
    }

    /// Send one message.  Requires a successful `ensure_ready` first.
    ///
    /// Never retries.  A link drop noticed here is recorded (and counted)
    /// so the next `ensure_ready` only has to reconnect.
    pub fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), PublishError> {
        if !(self.link_health.is_connected() && self.broker_health.is_connected()) {
            return Err(PublishError::NotReady);
        }
        if !self.link.is_connected() {
            self.on_link_lost(None);
            return Err(PublishError::LinkLost);
        }

        match self.broker.publish(topic, payload) {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!("MQTT: publish to '{}' failed — {}", topic, e);
                if self.broker.is_connected() {
                    self.broker_health.record_error(e.code());
                } else if self.broker_health.mark_down(e.code()) {
                    warn!("MQTT: session lost (mqtt_fails={})", self.broker_health.failures());
                }
                Err(PublishError::Rejected(e.code()))
            }
        }
    }

    /// Current link health (copy).
    pub fn link_health(&self) -> ConnectionHealth {
        self.link_health
    }

    /// Current broker health (copy).
    pub fn broker_health(&self) -> ConnectionHealth {
        self.broker_health
    }

    /// `(link, broker)` health copies, for the inspection snapshot.
    pub fn health(&self) -> (ConnectionHealth, ConnectionHealth) {
        (self.link_health, self.broker_health)
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    pub fn broker(&self) -> &B {
        &self.broker
    }

    pub fn broker_mut(&mut self) -> &mut B {
        &mut self.broker
    }

    // ── Internal ──────────────────────────────────────────────

    /// Compare recorded state with what the stacks report.
    fn probe(&mut self) {
        if self.link_health.is_connected() && !self.link.is_connected() {
            self.on_link_lost(None);
        }
        if self.broker_health.is_connected()
            && !self.broker.is_connected()
            && self.broker_health.mark_down(None)
        {
            warn!("MQTT: session lost (mqtt_fails={})", self.broker_health.failures());
        }
    }

    fn on_link_lost(&mut self, code: Option<i32>) {
        if self.link_health.mark_down(code) {
            warn!("Link: connection lost (wifi_fails={})", self.link_health.failures());
        }
        if self.broker_health.is_connected() && self.broker_health.mark_down(None) {
            warn!(
                "MQTT: session lost with link (mqtt_fails={})",
                self.broker_health.failures()
            );
        }
        self.broker.disconnect();
    }

    fn ensure_link(&mut self) -> Result<(), ConnectivityError> {
        if self.link_health.is_connected() {
            return Ok(());
        }
        // Counts the startup "never connected" state; no-op if already counted.
        self.link_health.mark_down(None);

        let mut attempts: u32 = 0;
        loop {
            attempts += 1;
            self.link_health.begin_connecting();
            match self.link.connect() {
                Ok(()) => {
                    self.link_health.mark_up();
                    info!(
                        "Link: connected after {} attempt(s) (wifi_fails={})",
                        attempts,
                        self.link_health.failures()
                    );
                    return Ok(());
                }
                Err(e) => {
                    self.link_health.connect_failed(e.code());
                    warn!("Link: attempt {} failed — {}", attempts, e);
                    if self.link_policy.exhausted(attempts) {
                        return Err(ConnectivityError::LinkUnavailable {
                            attempts,
                            code: e.code(),
                        });
                    }
                    self.delay.delay_ms(self.link_policy.delay_ms);
                }
            }
        }
    }

    fn ensure_broker(&mut self) -> Result<BrokerOutcome, ConnectivityError> {
        if self.broker_health.is_connected() {
            return Ok(BrokerOutcome::Connected);
        }
        self.broker_health.mark_down(None);

        let mut attempts: u32 = 0;
        loop {
            if !self.link.is_connected() {
                self.on_link_lost(None);
                return Ok(BrokerOutcome::LinkLost);
            }

            attempts += 1;
            self.broker_health.begin_connecting();
            match self.broker.connect() {
                Ok(()) => {
                    self.broker_health.mark_up();
                    info!(
                        "MQTT: connected after {} attempt(s) (mqtt_fails={})",
                        attempts,
                        self.broker_health.failures()
                    );
                    return Ok(BrokerOutcome::Connected);
                }
                Err(e) => {
                    self.broker_health.connect_failed(e.code());
                    warn!("MQTT: attempt {} failed — {}", attempts, e);
                    if self.broker_policy.exhausted(attempts) {
                        return Err(ConnectivityError::BrokerUnreachable {
                            attempts,
                            code: e.code(),
                        });
                    }
                    self.delay.delay_ms(self.broker_policy.delay_ms);
                }
            }
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
