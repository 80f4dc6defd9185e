//! HTTP inspection server adapter.
//!
//! Implements [`InspectionPort`] over an HTTP server that parses requests
//! on its own threads, so a slow or silent client never holds up the
//! control loop.  `next_request` only polls a queue of fully parsed
//! requests; `respond` hands the rendered [`Response`] back.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `esp_idf_svc::http::server::EspHttpServer`.
//!   Its handlers run in the httpd task, queue the path to the loop and
//!   wait (bounded) for the reply.
//! - **all other targets**: `tiny_http::Server` polled with `try_recv`.

use log::{debug, info};
#[cfg(not(target_os = "espidf"))]
use log::warn;

use crate::app::ports::InspectionPort;
use crate::inspection::Response;

#[cfg(target_os = "espidf")]
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
#[cfg(target_os = "espidf")]
use std::time::Duration;

#[cfg(target_os = "espidf")]
use esp_idf_svc::http::Method;
#[cfg(target_os = "espidf")]
use esp_idf_svc::http::server::{Configuration, EspHttpServer};
#[cfg(target_os = "espidf")]
use esp_idf_svc::io::{EspIOError, Write};

/// Requests waiting for the loop; further ones are turned away with 503.
#[cfg(target_os = "espidf")]
const QUEUE_DEPTH: usize = 4;
/// How long an httpd handler waits for the loop to answer.  Covers a few
/// ticks, not a reconnection.
#[cfg(target_os = "espidf")]
const REPLY_TIMEOUT: Duration = Duration::from_millis(2_000);

#[derive(Debug)]
pub enum HttpError {
    Bind(Box<dyn std::error::Error + Send + Sync>),
}

impl core::fmt::Display for HttpError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Bind(e) => write!(f, "failed to start HTTP server: {}", e),
        }
    }
}

impl std::error::Error for HttpError {}

/// A request parked in the httpd task until the loop answers it.
#[cfg(target_os = "espidf")]
struct QueuedRequest {
    path: String,
    reply: SyncSender<Response>,
}

// ───────────────────────────────────────────────────────────────
// HTTP adapter
// ───────────────────────────────────────────────────────────────

pub struct HttpInspectionServer {
    #[cfg(target_os = "espidf")]
    _server: EspHttpServer<'static>,
    #[cfg(target_os = "espidf")]
    queue: Receiver<QueuedRequest>,
    #[cfg(target_os = "espidf")]
    pending: Option<SyncSender<Response>>,

    #[cfg(not(target_os = "espidf"))]
    server: tiny_http::Server,
    /// Request handed out by `next_request` and not answered yet.
    #[cfg(not(target_os = "espidf"))]
    pending: Option<tiny_http::Request>,
}

impl HttpInspectionServer {
    /// Listen on `<port>` on all interfaces.
    #[cfg(target_os = "espidf")]
    pub fn bind(port: u16) -> Result<Self, HttpError> {
        let conf = Configuration {
            http_port: port,
            uri_match_wildcard: true,
            ..Default::default()
        };
        let mut server = EspHttpServer::new(&conf).map_err(|e| HttpError::Bind(Box::new(e)))?;

        let (tx, queue) = mpsc::sync_channel::<QueuedRequest>(QUEUE_DEPTH);
        for method in [Method::Get, Method::Head, Method::Post] {
            let tx = tx.clone();
            server
                .fn_handler("/*", method, move |req| -> Result<(), EspIOError> {
                    let response = Self::relay(&tx, req.uri().to_string());
                    let content_type = format!("{}; charset=utf-8", response.content_type);
                    let mut out = req.into_response(
                        response.status,
                        None,
                        &[("Content-Type", content_type.as_str())],
                    )?;
                    out.write_all(response.body.as_bytes())?;
                    Ok(())
                })
                .map_err(|e| HttpError::Bind(Box::new(e)))?;
        }

        info!("HTTP: listening on port {}", port);
        Ok(Self {
            _server: server,
            queue,
            pending: None,
        })
    }

    /// Runs in the httpd task: queue the path and wait for the loop.
    #[cfg(target_os = "espidf")]
    fn relay(tx: &SyncSender<QueuedRequest>, path: String) -> Response {
        let (reply, answer) = mpsc::sync_channel(1);
        match tx.try_send(QueuedRequest { path, reply }) {
            Ok(()) => answer
                .recv_timeout(REPLY_TIMEOUT)
                .unwrap_or_else(|_| Response::text(503, "Busy")),
            Err(TrySendError::Full(_) | TrySendError::Disconnected(_)) => {
                Response::text(503, "Busy")
            }
        }
    }

    /// Listen on `<port>` on all interfaces.  Port `0` lets the OS pick.
    #[cfg(not(target_os = "espidf"))]
    pub fn bind(port: u16) -> Result<Self, HttpError> {
        let server = tiny_http::Server::http(("0.0.0.0", port)).map_err(HttpError::Bind)?;
        info!("HTTP: listening on port {}", port);
        Ok(Self {
            server,
            pending: None,
        })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn local_addr(&self) -> Option<std::net::SocketAddr> {
        self.server.server_addr().to_ip()
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_next(&mut self) -> Option<String> {
        let QueuedRequest { path, reply } = self.queue.try_recv().ok()?;
        self.pending = Some(reply);
        Some(path)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_next(&mut self) -> Option<String> {
        let request = match self.server.try_recv() {
            Ok(Some(request)) => request,
            Ok(None) => return None,
            Err(e) => {
                warn!("HTTP: receive error: {}", e);
                return None;
            }
        };
        debug!(
            "HTTP: {:?} {} {}",
            request.remote_addr(),
            request.method(),
            request.url()
        );
        let path = request.url().to_string();
        self.pending = Some(request);
        Some(path)
    }

    #[cfg(target_os = "espidf")]
    fn platform_respond(&mut self, response: &Response) {
        if let Some(reply) = self.pending.take() {
            // The handler may have given up waiting; nothing left to do then.
            if reply.try_send(response.clone()).is_err() {
                debug!("HTTP: reply arrived after the handler timed out");
            }
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_respond(&mut self, response: &Response) {
        let Some(request) = self.pending.take() else {
            return;
        };
        let content_type = format!("{}; charset=utf-8", response.content_type);
        let headers = tiny_http::Header::from_bytes(&b"Content-Type"[..], content_type.as_bytes())
            .map(|h| vec![h])
            .unwrap_or_default();
        let body = response.body.as_bytes().to_vec();
        let reply = tiny_http::Response::new(
            tiny_http::StatusCode(response.status),
            headers,
            std::io::Cursor::new(body),
            Some(response.body.len()),
            None,
        );
        if let Err(e) = request.respond(reply) {
            warn!("HTTP: write failed: {}", e);
        }
    }
}

// ───────────────────────────────────────────────────────────────
// InspectionPort
// ───────────────────────────────────────────────────────────────

impl InspectionPort for HttpInspectionServer {
    fn next_request(&mut self) -> Option<String> {
        // An unanswered request is dropped rather than leaked.
        self.pending = None;
        self.platform_next()
    }

    fn respond(&mut self, response: &Response) {
        self.platform_respond(response);
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
