use askama::Template;
use log::warn;

use super::{Response, render_metrics};
use crate::state::Snapshot;

/// Client-side reload period of the status page.
pub const REFRESH_MS: u32 = 1_000;

#[derive(Template)]
#[template(path = "status.html")]
struct StatusPage<'a> {
    metrics: &'a str,
    wifi_connected: bool,
    wifi_error: String,
    mqtt_connected: bool,
    mqtt_error: String,
    refresh_ms: u32,
}

fn error_text(code: Option<i32>) -> String {
    code.map_or_else(|| "none".to_string(), |c| c.to_string())
}

pub(super) fn status_handler(snapshot: &Snapshot) -> Response {
    let metrics = render_metrics(snapshot);
    let page = StatusPage {
        metrics: &metrics,
        wifi_connected: snapshot.link.is_connected(),
        wifi_error: error_text(snapshot.link.last_error_code()),
        mqtt_connected: snapshot.broker.is_connected(),
        mqtt_error: error_text(snapshot.broker.last_error_code()),
        refresh_ms: REFRESH_MS,
    };
    match page.render() {
        Ok(body) => Response::html(body),
        Err(e) => {
            warn!("HTTP: status page render failed — {}", e);
            Response::text(500, "Internal error")
        }
    }
}
