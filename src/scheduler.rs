//! Publish scheduling.
//!
//! Runs at the control-tick rate but fires at the (much slower) publish
//! interval.  A fire reserves the slot *before* any network work, so a
//! publish that blocks for minutes in reconnection still yields exactly
//! one fire, and the next one is a full interval later.
//!
//! ```text
//!  tick ──▶ PublishSchedule::poll ──(due)──▶ ensure_ready ──▶ payload ──▶ publish
//!                  │                              │                         │
//!               not due                        failed                    failed
//!                  ▼                              ▼                         ▼
//!               NotDue                  Dropped (no buffering, retry next interval)
//! ```

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crate::app::ports::{BrokerPort, ClockPort, LinkPort};
use crate::config::Topic;
use crate::connectivity::ConnectivitySupervisor;
use crate::error::Error;
use crate::state::Snapshot;
use crate::telemetry::TelemetryPayload;

// ═══════════════════════════════════════════════════════════════
//  Schedule
// ═══════════════════════════════════════════════════════════════

/// Fixed-interval trigger on the monotonic clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishSchedule {
    interval_ms: u64,
    last_fire_ms: u64,
}

impl PublishSchedule {
    /// `start_ms` counts as the previous fire, so nothing fires before
    /// one full interval has elapsed.
    pub fn new(interval_ms: u64, start_ms: u64) -> Self {
        Self {
            interval_ms,
            last_fire_ms: start_ms,
        }
    }

    /// Returns `true` (and records `now_ms` as the fire time) when due.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        if now_ms.saturating_sub(self.last_fire_ms) < self.interval_ms {
            return false;
        }
        self.last_fire_ms = now_ms;
        true
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    pub fn last_fire_ms(&self) -> u64 {
        self.last_fire_ms
    }

    /// Earliest monotonic time at which the next fire can happen.
    pub fn next_due_ms(&self) -> u64 {
        self.last_fire_ms.saturating_add(self.interval_ms)
    }
}

// ═══════════════════════════════════════════════════════════════
//  Telemetry scheduler
// ═══════════════════════════════════════════════════════════════

/// What a scheduler tick did.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    NotDue,
    Published { bytes: usize },
    /// The interval's payload was abandoned.
    Dropped(Error),
}

/// Running totals, for logs and the status page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishStats {
    pub attempted: u32,
    pub published: u32,
    pub dropped: u32,
}

pub struct TelemetryScheduler {
    schedule: PublishSchedule,
    topic: Topic,
    stats: PublishStats,
}

impl TelemetryScheduler {
    pub fn new(schedule: PublishSchedule, topic: Topic) -> Self {
        info!(
            "Scheduler: publishing to '{}' every {} ms",
            topic,
            schedule.interval_ms()
        );
        Self {
            schedule,
            topic,
            stats: PublishStats::default(),
        }
    }

    /// Run the publish step for one control tick.
    ///
    /// `snapshot` is called only when a fire is due, and only after the
    /// sessions are up, so the payload reflects the latest completed
    /// sample and the current failure counters.  The wall clock is read
    /// at the same point, after any reconnection wait.
    pub fn tick<L, B, D>(
        &mut self,
        clock: &impl ClockPort,
        net: &mut ConnectivitySupervisor<L, B, D>,
        snapshot: impl FnOnce(&ConnectivitySupervisor<L, B, D>) -> Snapshot,
    ) -> TickOutcome
    where
        L: LinkPort,
        B: BrokerPort,
        D: DelayNs,
    {
        if !self.schedule.poll(clock.monotonic_ms()) {
            return TickOutcome::NotDue;
        }
        self.stats.attempted += 1;

        if let Err(e) = net.ensure_ready() {
            warn!("Scheduler: sessions not ready ({}), dropping interval", e);
            self.stats.dropped += 1;
            return TickOutcome::Dropped(e.into());
        }

        let payload = TelemetryPayload::from_snapshot(&snapshot(&*net), clock.utc_now()).to_json();
        match net.publish(&self.topic, &payload) {
            Ok(()) => {
                self.stats.published += 1;
                TickOutcome::Published {
                    bytes: payload.len(),
                }
            }
            Err(e) => {
                warn!("Scheduler: publish failed ({}), dropping interval", e);
                self.stats.dropped += 1;
                TickOutcome::Dropped(e.into())
            }
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn stats(&self) -> PublishStats {
        self.stats
    }

    pub fn schedule(&self) -> &PublishSchedule {
        &self.schedule
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
