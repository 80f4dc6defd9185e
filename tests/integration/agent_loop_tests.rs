//! End-to-end tests for the control loop: AppService → scheduler →
//! supervisor → simulated Wi-Fi/MQTT, with scripted sensors and clock.

use gasmeter::app::events::AppEvent;
use gasmeter::app::ports::ClockPort;
use gasmeter::app::service::AppService;
use gasmeter::counter::Level;
use gasmeter::error::{Error, SensorError};
use gasmeter::scheduler::TickOutcome;

use crate::mock_ports::{
    CollectSink, ManualClock, MockInspection, MockSensors, SimSupervisor, provisioned_config,
    sim_supervisor, sim_supervisor_with,
};

struct Rig {
    app: AppService,
    net: SimSupervisor,
    clock: ManualClock,
    hw: MockSensors,
    http: MockInspection,
    sink: CollectSink,
}

impl Rig {
    fn new(interval_ms: u64) -> Self {
        let config = provisioned_config(interval_ms);
        let net = sim_supervisor(&config);
        let clock = ManualClock::new();
        let mut sink = CollectSink::default();
        let mut app = AppService::new(config, 0);
        app.start(&mut sink);
        Self {
            app,
            net,
            clock,
            hw: MockSensors::default(),
            http: MockInspection::default(),
            sink,
        }
    }

    /// Reconnection waits advance the rig's clock, as they would on the
    /// device.
    fn with_slow_broker(interval_ms: u64, broker_retry_delay_ms: u32) -> Self {
        let mut config = provisioned_config(interval_ms);
        config.broker_retry_delay_ms = broker_retry_delay_ms;
        let clock = ManualClock::new();
        let net = sim_supervisor_with(&config, clock.driving_delay());
        let mut sink = CollectSink::default();
        let mut app = AppService::new(config, 0);
        app.start(&mut sink);
        Self {
            app,
            net,
            clock,
            hw: MockSensors::default(),
            http: MockInspection::default(),
            sink,
        }
    }

    fn tick_at(&mut self, ms: u64) -> TickOutcome {
        self.clock.set(ms);
        self.app.tick(
            &self.clock,
            &mut self.hw,
            &mut self.http,
            &mut self.net,
            &mut self.sink,
        )
    }

    fn published(&self) -> &[(String, Vec<u8>)] {
        &self.net.broker().sim().published
    }

    fn last_payload(&self) -> serde_json::Value {
        let (_, bytes) = self.published().last().expect("nothing published");
        serde_json::from_slice(bytes).unwrap()
    }
}

// ── Publish cadence ───────────────────────────────────────────

#[test]
fn publishes_only_once_the_interval_has_elapsed() {
    let mut rig = Rig::new(1_000);
    let outcomes: Vec<TickOutcome> = [0, 300, 1_100, 1_900]
        .into_iter()
        .map(|t| rig.tick_at(t))
        .collect();

    assert_eq!(outcomes[0], TickOutcome::NotDue);
    assert_eq!(outcomes[1], TickOutcome::NotDue);
    assert!(matches!(outcomes[2], TickOutcome::Published { .. }));
    assert_eq!(outcomes[3], TickOutcome::NotDue);
    assert_eq!(rig.published().len(), 1);
    assert_eq!(rig.sink.published(), 1);
}

#[test]
fn payload_carries_sample_and_health() {
    let mut rig = Rig::new(1_000);
    rig.tick_at(1_100);

    let (topic, _) = &rig.published()[0];
    assert_eq!(topic, "tele/gasmeter-aabbcc/SENSOR");

    let p = rig.last_payload();
    assert_eq!(p["time"], "2026-10-19T12:00:01Z");
    assert_eq!(p["voltage"], 1.25);
    assert_eq!(p["counter"], 0);
    assert_eq!(p["temperature"], 21.5);
    assert_eq!(p["fails"]["wifi"], 0);
    assert_eq!(p["fails"]["mqtt"], 0);
}

#[test]
fn slow_reconnect_does_not_shift_the_schedule() {
    let mut rig = Rig::with_slow_broker(1_000, 900);
    rig.net.broker_mut().sim_mut().refuse_next = 1;

    // Fires at 1000; one refused broker attempt keeps it busy until 1900.
    assert!(matches!(rig.tick_at(1_000), TickOutcome::Published { .. }));
    assert_eq!(rig.clock.monotonic_ms(), 1_900);
    assert_eq!(rig.app.scheduler().schedule().last_fire_ms(), 1_000);

    // The next slot is measured from the decision, not the completion.
    assert_eq!(rig.tick_at(1_999), TickOutcome::NotDue);
    assert!(matches!(rig.tick_at(2_000), TickOutcome::Published { .. }));
    assert_eq!(rig.published().len(), 2);
}

// ── Counting ──────────────────────────────────────────────────

#[test]
fn edges_between_publishes_reach_payload_and_metrics() {
    let mut rig = Rig::new(1_000);
    let levels = [0, 1, 0, 1, 1, 0];
    for (i, raw) in levels.into_iter().enumerate() {
        rig.hw.level = Level::from_raw(raw);
        rig.tick_at(i as u64 * 100);
    }
    rig.tick_at(1_000);
    assert_eq!(rig.last_payload()["counter"], 2);

    rig.http.request("/metrics");
    rig.tick_at(1_100);
    let body = rig.http.last_body();
    assert!(body.contains("gas_meter_counter=0.02\n"), "{body}");
    assert!(body.contains("gas_meter_value=0\n"), "{body}");

    let edges = rig
        .sink
        .events
        .iter()
        .filter(|e| matches!(e, AppEvent::Edge { .. }))
        .count();
    assert_eq!(edges, 2);
}

// ── Failure accounting ────────────────────────────────────────

#[test]
fn each_link_drop_counts_once_in_payload() {
    let mut rig = Rig::new(1_000);

    rig.tick_at(1_000);
    assert_eq!(rig.last_payload()["fails"]["wifi"], 0);

    rig.net.link_mut().sim_drop();
    rig.tick_at(2_000);
    assert_eq!(rig.last_payload()["fails"]["wifi"], 1);
    // The broker session went down with the link.
    assert_eq!(rig.last_payload()["fails"]["mqtt"], 1);

    rig.net.link_mut().sim_drop();
    rig.net.link_mut().sim_fail_next(3);
    rig.tick_at(3_000);
    assert_eq!(rig.last_payload()["fails"]["wifi"], 2);
    assert_eq!(rig.published().len(), 3);
}

#[test]
fn rejected_publish_drops_only_that_interval() {
    let mut rig = Rig::new(1_000);
    rig.net.broker_mut().sim_mut().reject_next = 1;

    assert_eq!(
        rig.tick_at(1_000),
        TickOutcome::Dropped(Error::PublishRejected(Some(-1)))
    );
    assert_eq!(rig.sink.dropped(), 1);
    assert!(rig.published().is_empty());

    assert!(matches!(rig.tick_at(2_000), TickOutcome::Published { .. }));
    assert_eq!(rig.published().len(), 1);
    assert_eq!(rig.app.scheduler().stats().dropped, 1);
    assert_eq!(rig.app.scheduler().stats().published, 1);
}

// ── Degraded temperature probe ───────────────────────────────

#[test]
fn absent_probe_publishes_sentinel() {
    let mut rig = Rig::new(1_000);
    rig.hw.temperature = Err(SensorError::NotPresent);

    assert!(matches!(rig.tick_at(1_000), TickOutcome::Published { .. }));
    assert_eq!(rig.last_payload()["temperature"], "unavailable");

    rig.http.request("/metrics");
    rig.tick_at(1_050);
    assert!(rig.http.last_body().contains("temperature_value=unavailable\n"));
}

// ── Inspection ────────────────────────────────────────────────

#[test]
fn inspection_answers_during_outage_without_touching_network() {
    let mut rig = Rig::new(1_000);
    rig.tick_at(1_000);
    let connects = rig.net.broker().sim().connects;

    rig.net.link_mut().sim_drop();
    rig.http.request("/");
    rig.tick_at(1_200);

    let page = rig.http.responses.last().unwrap();
    assert_eq!(page.status, 200);
    assert_eq!(page.content_type, "text/html");
    assert!(page.body.contains("wifi_fails=0"));
    assert_eq!(rig.net.broker().sim().connects, connects);
}

#[test]
fn unknown_path_is_not_found() {
    let mut rig = Rig::new(1_000);
    rig.http.request("/favicon.ico");
    rig.tick_at(10);
    let r = rig.http.responses.last().unwrap();
    assert_eq!(r.status, 404);
    assert_eq!(r.body, "Not found");
}
