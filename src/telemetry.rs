//! Wire payload for the periodic publish.
//!
//! ```json
//! {"time":"2026-10-19T12:00:00Z","voltage":1.23,"counter":42,
//!  "temperature":21.5,"fails":{"wifi":0,"mqtt":1}}
//! ```
//!
//! Field order is fixed by the struct declaration order.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::state::{Snapshot, Temperature};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailCounts {
    pub wifi: i32,
    pub mqtt: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryPayload {
    /// ISO-8601 UTC, second precision, `Z` suffix.
    pub time: String,
    pub voltage: f32,
    /// Raw pulse count (not multiplied).
    pub counter: u64,
    pub temperature: Temperature,
    pub fails: FailCounts,
}

impl TelemetryPayload {
    /// Build from a snapshot.  Reads only.
    pub fn from_snapshot(snapshot: &Snapshot, now: DateTime<Utc>) -> Self {
        Self {
            time: now.to_rfc3339_opts(SecondsFormat::Secs, true),
            voltage: snapshot.sample.analog_voltage,
            counter: snapshot.sample.counter,
            temperature: snapshot.sample.temperature,
            fails: FailCounts {
                wifi: snapshot.link.failures(),
                mqtt: snapshot.broker.failures(),
            },
        }
    }

    pub fn to_json(&self) -> Vec<u8> {
        // Serialising plain numbers and strings into a Vec cannot fail.
        serde_json::to_vec(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectivity::ConnectionHealth;
    use crate::counter::Level;
    use crate::state::SampleState;

    fn snapshot(temperature: Temperature) -> Snapshot {
        let mut link = ConnectionHealth::new();
        link.mark_down(None);
        link.mark_up();
        let mut broker = ConnectionHealth::new();
        broker.mark_down(None);
        broker.mark_up();
        broker.mark_down(None);
        broker.mark_up();
        Snapshot {
            sample: SampleState {
                analog_voltage: 1.25,
                digital_level: Level::High,
                counter: 42,
                temperature,
            },
            usage: 0.42,
            link,
            broker,
        }
    }

    fn at_noon() -> DateTime<Utc> {
        DateTime::from_timestamp(1_792_411_200, 0).unwrap()
    }

    #[test]
    fn payload_has_expected_shape() {
        let p = TelemetryPayload::from_snapshot(&snapshot(Temperature::Celsius(21.5)), at_noon());
        let json = String::from_utf8(p.to_json()).unwrap();
        assert_eq!(
            json,
            r#"{"time":"2026-10-19T12:00:00Z","voltage":1.25,"counter":42,"temperature":21.5,"fails":{"wifi":0,"mqtt":1}}"#
        );
    }

    #[test]
    fn missing_probe_serialises_sentinel() {
        let p = TelemetryPayload::from_snapshot(&snapshot(Temperature::Unavailable), at_noon());
        let value: serde_json::Value = serde_json::from_slice(&p.to_json()).unwrap();
        assert_eq!(value["temperature"], "unavailable");
        assert_eq!(value["counter"], 42);
    }
}
