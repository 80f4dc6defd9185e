//! Connectivity supervisor against the simulated Wi-Fi and MQTT adapters.

use gasmeter::adapters::mqtt::{BrokerSettings, MqttBroker};
use gasmeter::adapters::wifi::WifiLink;
use gasmeter::connectivity::{ConnectivitySupervisor, RetryPolicy, SessionState};
use gasmeter::error::{ConnectivityError, PublishError};

use crate::mock_ports::{RecordingDelay, provisioned_config, sim_supervisor};

#[test]
fn startup_connects_with_zero_failures() {
    let mut net = sim_supervisor(&provisioned_config(1_000));
    assert_eq!(net.link_health().failures(), -1);

    net.ensure_ready().unwrap();
    assert!(net.link_health().is_connected());
    assert!(net.broker_health().is_connected());
    assert_eq!(net.link_health().failures(), 0);
    assert_eq!(net.broker_health().failures(), 0);
}

#[test]
fn ensure_ready_is_idempotent_while_connected() {
    let mut net = sim_supervisor(&provisioned_config(1_000));
    for _ in 0..5 {
        net.ensure_ready().unwrap();
    }
    assert_eq!(net.broker().sim().connects, 1);
    assert_eq!(net.link().sim_attempts(), 1);
    assert_eq!(net.link_health().failures(), 0);
}

#[test]
fn failed_startup_attempts_do_not_count_as_drops() {
    let mut net = sim_supervisor(&provisioned_config(1_000));
    net.link_mut().sim_fail_next(2);
    net.broker_mut().sim_mut().refuse_next = 3;

    net.ensure_ready().unwrap();
    assert_eq!(net.link().sim_attempts(), 3);
    assert_eq!(net.broker().sim().connects, 4);
    assert_eq!(net.link_health().failures(), 0);
    assert_eq!(net.broker_health().failures(), 0);
}

#[test]
fn drop_noticed_at_publish_is_not_counted_again() {
    let mut net = sim_supervisor(&provisioned_config(1_000));
    net.ensure_ready().unwrap();

    net.link_mut().sim_drop();
    assert_eq!(net.publish("t", b"{}"), Err(PublishError::LinkLost));
    assert_eq!(net.link_health().state(), SessionState::Disconnected);
    assert_eq!(net.link_health().failures(), 1);
    assert!(!net.broker().sim().session_up);

    net.ensure_ready().unwrap();
    assert_eq!(net.link_health().failures(), 1);
    assert!(net.publish("t", b"{}").is_ok());
}

#[test]
fn bounded_policy_gives_up() {
    let cfg = provisioned_config(1_000);
    let mut net = ConnectivitySupervisor::new(
        WifiLink::new(&cfg.ssid, &cfg.password),
        MqttBroker::new(BrokerSettings::from_config(&cfg)),
        RecordingDelay::default(),
        RetryPolicy::bounded(500, 2),
        RetryPolicy::bounded(5_000, 2),
    );
    net.link_mut().sim_fail_next(5);

    assert_eq!(
        net.ensure_ready(),
        Err(ConnectivityError::LinkUnavailable {
            attempts: 2,
            code: None
        })
    );
    assert_eq!(net.link_health().failures(), 0);
    assert_eq!(net.broker().sim().connects, 0);
}
