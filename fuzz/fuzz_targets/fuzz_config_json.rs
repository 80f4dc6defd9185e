//! Fuzz target: configuration document parsing and validation
//!
//! Invariants checked:
//! - No panics under arbitrary (UTF-8) input
//! - A config that validates has a non-empty SSID and broker host
//! - The derived publish topic is never empty
//!
//! cargo fuzz run fuzz_config_json

#![no_main]

use libfuzzer_sys::fuzz_target;
use gasmeter::config::AgentConfig;

fuzz_target!(|data: &[u8]| {
    let Ok(doc) = core::str::from_utf8(data) else {
        return;
    };
    let Ok(cfg) = AgentConfig::from_json(doc) else {
        return;
    };
    let cfg = cfg.with_device_id_fallback("gasmeter-fuzz");
    if cfg.validate().is_ok() {
        assert!(!cfg.ssid.is_empty());
        assert!(!cfg.broker_host.is_empty());
    }
    assert!(!cfg.publish_topic().is_empty());
});
