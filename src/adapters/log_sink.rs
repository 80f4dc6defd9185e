//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing application events to the logger
//! (UART / USB-CDC on the device), one tagged line per event.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started {
                device_id,
                topic,
                interval_ms,
            } => {
                info!(
                    "START | device={} | topic={} | interval={}ms",
                    device_id, topic, interval_ms
                );
            }
            AppEvent::Edge {
                voltage,
                count,
                usage,
            } => {
                info!("EDGE | voltage={:.4}V | count={} | usage={:.2}", voltage, count, usage);
            }
            AppEvent::Published { topic, bytes } => {
                info!("PUBLISH | topic={} | {}B", topic, bytes);
            }
            AppEvent::PublishDropped(e) => {
                warn!("DROP | {}", e);
            }
        }
    }
}
