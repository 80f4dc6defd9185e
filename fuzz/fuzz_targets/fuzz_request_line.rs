//! Fuzz target: request target → router
//!
//! Feeds arbitrary request targets (as an HTTP server hands them over)
//! through the inspection router.
//!
//! Invariants checked:
//! - No panics under any input
//! - Every routed response is 200 or 404
//! - The query string never changes which handler answers
//!
//! cargo fuzz run fuzz_request_line

#![no_main]

use libfuzzer_sys::fuzz_target;
use gasmeter::connectivity::ConnectionHealth;
use gasmeter::inspection::Router;
use gasmeter::state::{SampleState, Snapshot};

fuzz_target!(|data: &[u8]| {
    let Ok(target) = core::str::from_utf8(data) else {
        return;
    };

    let snapshot = Snapshot {
        sample: SampleState::default(),
        usage: 0.0,
        link: ConnectionHealth::new(),
        broker: ConnectionHealth::new(),
    };
    let router = Router::default();
    let response = router.handle(target, &snapshot);
    assert!(response.status == 200 || response.status == 404);

    let bare = target.split('?').next().unwrap_or(target);
    assert_eq!(router.handle(bare, &snapshot).status, response.status);
});
