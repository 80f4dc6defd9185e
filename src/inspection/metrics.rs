use core::fmt::Write;

use crate::state::Snapshot;

/// Render the flat metrics listing.
///
/// One `key=value` per line, fixed order, every key exactly once.  The
/// temperature line reads `unavailable` when the probe is absent.
pub fn render_metrics(snapshot: &Snapshot) -> String {
    let s = &snapshot.sample;
    let mut out = String::with_capacity(160);
    // Writing into a String cannot fail.
    let _ = writeln!(out, "gas_meter_voltage={:.2}", s.analog_voltage);
    let _ = writeln!(out, "gas_meter_value={}", s.digital_level.as_u8());
    let _ = writeln!(out, "gas_meter_counter={:.2}", snapshot.usage);
    let _ = writeln!(out, "temperature_value={}", s.temperature);
    let _ = writeln!(out, "wifi_fails={}", snapshot.link.failures());
    let _ = writeln!(out, "mqtt_fails={}", snapshot.broker.failures());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspection::tests::sample_snapshot;
    use crate::state::Temperature;

    fn value_of<'a>(body: &'a str, key: &str) -> Vec<&'a str> {
        body.lines()
            .filter_map(|l| l.split_once('='))
            .filter(|(k, _)| *k == key)
            .map(|(_, v)| v)
            .collect()
    }

    #[test]
    fn every_key_exactly_once_with_expected_value() {
        let body = render_metrics(&sample_snapshot(Temperature::Celsius(21.456)));
        let expected = [
            ("gas_meter_voltage", "3.50"),
            ("gas_meter_value", "1"),
            ("gas_meter_counter", "0.02"),
            ("temperature_value", "21.46"),
            ("wifi_fails", "1"),
            ("mqtt_fails", "0"),
        ];
        for (key, value) in expected {
            assert_eq!(value_of(&body, key), vec![value], "key {key}");
        }
        assert_eq!(body.lines().count(), expected.len());
    }

    #[test]
    fn absent_probe_reads_unavailable() {
        let body = render_metrics(&sample_snapshot(Temperature::Unavailable));
        assert_eq!(value_of(&body, "temperature_value"), vec!["unavailable"]);
    }
}
