//! Application service: the hexagonal core.
//!
//! [`AppService`] owns the sampled state, the edge counter and the publish
//! scheduler.  It exposes a hardware-agnostic API; all I/O flows through
//! port traits injected at call sites, making the entire service testable
//! with mock adapters.
//!
//! ```text
//!  InspectionPort ◀─▶ ┌──────────────────────────┐
//!  SensorPort ──────▶ │        AppService         │ ──▶ EventSink
//!  ClockPort ───────▶ │ Counter · Scheduler · HTTP│
//!                     └────────────┬─────────────┘
//!                                  ▼
//!                      ConnectivitySupervisor (Link + Broker)
//! ```

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crate::config::AgentConfig;
use crate::connectivity::{ConnectionHealth, ConnectivitySupervisor};
use crate::counter::EdgeCounter;
use crate::inspection::Router;
use crate::scheduler::{PublishSchedule, TelemetryScheduler, TickOutcome};
use crate::state::{SampleState, Snapshot, Temperature};

use super::events::AppEvent;
use super::ports::{BrokerPort, ClockPort, EventSink, InspectionPort, LinkPort, SensorPort};

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    config: AgentConfig,
    sample: SampleState,
    counter: EdgeCounter,
    scheduler: TelemetryScheduler,
    router: Router,
    tick_count: u64,
    /// Whether the last temperature read failed, so the warning is
    /// logged on the transition rather than every tick.
    probe_missing: bool,
}

impl AppService {
    /// Construct the service from a validated configuration.
    ///
    /// `start_ms` is the monotonic time at agent start; the first publish
    /// happens one full interval after it.
    pub fn new(config: AgentConfig, start_ms: u64) -> Self {
        let schedule = PublishSchedule::new(config.publish_interval_ms, start_ms);
        let scheduler = TelemetryScheduler::new(schedule, config.publish_topic());
        let counter = EdgeCounter::new(config.counter_multiplier);
        Self {
            config,
            sample: SampleState::default(),
            counter,
            scheduler,
            router: Router::default(),
            tick_count: 0,
            probe_missing: false,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::Started {
            device_id: self.config.device_id.to_string(),
            topic: self.scheduler.topic().to_string(),
            interval_ms: self.config.publish_interval_ms,
        });
        info!(
            "AppService started: device '{}', sampling every {} ms",
            self.config.device_id, self.config.sample_interval_ms
        );
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one control cycle: inspection → sampling → publish.
    ///
    /// The publish step may block inside
    /// [`ConnectivitySupervisor::ensure_ready`]; inspection and sampling
    /// pause until it returns.
    pub fn tick<L, B, D>(
        &mut self,
        clock: &impl ClockPort,
        hw: &mut impl SensorPort,
        http: &mut impl InspectionPort,
        net: &mut ConnectivitySupervisor<L, B, D>,
        sink: &mut impl EventSink,
    ) -> TickOutcome
    where
        L: LinkPort,
        B: BrokerPort,
        D: DelayNs,
    {
        self.tick_count += 1;

        // 1. Answer whoever is asking, with the state as of the last tick.
        let (link, broker) = net.health();
        let snapshot = self.snapshot(link, broker);
        self.serve(http, &snapshot);

        // 2. Sample inputs.
        self.sample(hw, sink);

        // 3. Publish when due.
        let sample = self.sample;
        let usage = self.counter.usage();
        let outcome = self.scheduler.tick(clock, net, |n| {
            let (link, broker) = n.health();
            Snapshot { sample, usage, link, broker }
        });

        match &outcome {
            TickOutcome::NotDue => {}
            TickOutcome::Published { bytes } => sink.emit(&AppEvent::Published {
                topic: self.scheduler.topic().to_string(),
                bytes: *bytes,
            }),
            TickOutcome::Dropped(e) => sink.emit(&AppEvent::PublishDropped(*e)),
        }
        outcome
    }

    /// Read every input once and update the counter.
    ///
    /// A missing temperature probe degrades the field to
    /// [`Temperature::Unavailable`]; it never aborts the tick.
    pub fn sample(&mut self, hw: &mut impl SensorPort, sink: &mut impl EventSink) {
        let voltage = hw.read_analog_voltage();
        let level = hw.read_digital_level();
        let obs = self.counter.observe(level);

        let temperature = match hw.read_temperature() {
            Ok(c) => {
                self.probe_missing = false;
                Temperature::Celsius(c)
            }
            Err(e) => {
                if !self.probe_missing {
                    warn!("Sensor: temperature unavailable ({})", e);
                }
                self.probe_missing = true;
                Temperature::Unavailable
            }
        };

        self.sample = SampleState {
            analog_voltage: voltage,
            digital_level: level,
            counter: obs.count,
            temperature,
        };

        if obs.rising {
            sink.emit(&AppEvent::Edge {
                voltage,
                count: obs.count,
                usage: self.counter.usage(),
            });
        }
    }

    /// Answer at most one pending inspection request.  Returns whether a
    /// request was served.
    pub fn serve(&self, http: &mut impl InspectionPort, snapshot: &Snapshot) -> bool {
        let Some(path) = http.next_request() else {
            return false;
        };
        let response = self.router.handle(&path, snapshot);
        http.respond(&response);
        true
    }

    // ── Queries ───────────────────────────────────────────────

    /// Owned copy of everything readers may show.
    pub fn snapshot(&self, link: ConnectionHealth, broker: ConnectionHealth) -> Snapshot {
        Snapshot {
            sample: self.sample,
            usage: self.counter.usage(),
            link,
            broker,
        }
    }

    pub fn sample_state(&self) -> &SampleState {
        &self.sample
    }

    pub fn counter(&self) -> &EdgeCounter {
        &self.counter
    }

    pub fn scheduler(&self) -> &TelemetryScheduler {
        &self.scheduler
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}
