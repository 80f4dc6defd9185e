//! Inspection surface: a pull-style view of the live state.
//!
//! | Path       | Type         | Body                                   |
//! |------------|--------------|----------------------------------------|
//! | `/metrics` | `text/plain` | flat `key=value` lines (scrapable)     |
//! | `/`        | `text/html`  | metrics + connection health, reloads   |
//! | other      | `text/plain` | `404 Not found`                        |
//!
//! Handlers are pure functions of a [`Snapshot`].  They never touch the
//! network, so during an outage they keep answering with the last known
//! values, which is exactly when they are needed.

mod metrics;
mod status;

pub use metrics::render_metrics;
pub use status::REFRESH_MS;

use crate::state::Snapshot;

/// A rendered reply, independent of the HTTP server that sends it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Response {
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: "text/plain",
            body: body.into(),
        }
    }

    pub fn html(body: String) -> Self {
        Self {
            status: 200,
            content_type: "text/html",
            body,
        }
    }

    pub fn not_found() -> Self {
        Self::text(404, "Not found")
    }
}

pub type Handler = fn(&Snapshot) -> Response;

/// Default routing table.
pub const ROUTES: &[(&str, Handler)] = &[
    ("/metrics", metrics_handler as Handler),
    ("/", status::status_handler as Handler),
];

fn metrics_handler(snapshot: &Snapshot) -> Response {
    Response::text(200, render_metrics(snapshot))
}

/// Exact-path router.  Query strings are ignored.
#[derive(Debug, Clone, Copy)]
pub struct Router {
    routes: &'static [(&'static str, Handler)],
}

impl Default for Router {
    fn default() -> Self {
        Self::new(ROUTES)
    }
}

impl Router {
    pub const fn new(routes: &'static [(&'static str, Handler)]) -> Self {
        Self { routes }
    }

    pub fn handle(&self, path: &str, snapshot: &Snapshot) -> Response {
        let path = path.split_once('?').map_or(path, |(p, _)| p);
        self.routes
            .iter()
            .find(|(route, _)| *route == path)
            .map_or_else(Response::not_found, |(_, handler)| handler(snapshot))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::connectivity::ConnectionHealth;
    use crate::counter::Level;
    use crate::state::{SampleState, Temperature};

    pub(crate) fn sample_snapshot(temperature: Temperature) -> Snapshot {
        let mut link = ConnectionHealth::new();
        link.mark_down(None);
        link.mark_up();
        link.mark_down(Some(201));
        link.mark_up();
        let mut broker = ConnectionHealth::new();
        broker.mark_down(None);
        Snapshot {
            sample: SampleState {
                analog_voltage: 3.5,
                digital_level: Level::High,
                counter: 2,
                temperature,
            },
            usage: 0.02,
            link,
            broker,
        }
    }

    #[test]
    fn routes_metrics() {
        let r = Router::default().handle("/metrics", &sample_snapshot(Temperature::Unavailable));
        assert_eq!(r.status, 200);
        assert_eq!(r.content_type, "text/plain");
        assert!(r.body.starts_with("gas_meter_voltage="));
    }

    #[test]
    fn routes_status_page() {
        let r = Router::default().handle("/", &sample_snapshot(Temperature::Celsius(20.0)));
        assert_eq!(r.status, 200);
        assert_eq!(r.content_type, "text/html");
    }

    #[test]
    fn query_string_is_ignored() {
        let r = Router::default().handle("/metrics?x=1", &sample_snapshot(Temperature::Unavailable));
        assert_eq!(r.status, 200);
    }

    #[test]
    fn unknown_path_is_404() {
        let r = Router::default().handle("/favicon.ico", &sample_snapshot(Temperature::Unavailable));
        assert_eq!(r, Response::not_found());
        assert_eq!(r.body, "Not found");
        assert_eq!(r.content_type, "text/plain");
    }
}
