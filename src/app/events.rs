//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  The log adapter renders
//! them as tagged serial lines; tests collect them to assert behaviour.

use crate::error::Error;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The agent finished startup and entered the control loop.
    Started {
        device_id: String,
        topic: String,
        interval_ms: u64,
    },

    /// The pulse line went Low → High.
    Edge {
        voltage: f32,
        count: u64,
        usage: f64,
    },

    /// A telemetry payload was handed to the broker.
    Published { topic: String, bytes: usize },

    /// The interval's payload was abandoned.
    PublishDropped(Error),
}
