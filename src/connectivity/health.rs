//! Per-channel session state and failure accounting.

/// Lifecycle of one network session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Observable health of one channel (link or broker).
///
/// `failures` starts at `-1`: the first loss detection is the startup
/// "never connected" state, which brings it to `0`, so a device that has
/// never dropped reports zero failures.  After that it increments once
/// per Connected → Disconnected transition.  Failed retries while already
/// down do not count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionHealth {
    state: SessionState,
    failures: i32,
    last_error_code: Option<i32>,
    /// Set once a loss has been counted, cleared on reconnect.
    loss_counted: bool,
}

impl Default for ConnectionHealth {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionHealth {
    pub const fn new() -> Self {
        Self {
            state: SessionState::Disconnected,
            failures: -1,
            last_error_code: None,
            loss_counted: false,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == SessionState::Connected
    }

    pub fn failures(&self) -> i32 {
        self.failures
    }

    pub fn last_error_code(&self) -> Option<i32> {
        self.last_error_code
    }

    /// Record that the session is down.  Returns `true` if this call
    /// counted a new failure (i.e. the session was not already down).
    pub fn mark_down(&mut self, code: Option<i32>) -> bool {
        self.state = SessionState::Disconnected;
        self.record_error(code);
        if self.loss_counted {
            return false;
        }
        self.loss_counted = true;
        self.failures = self.failures.saturating_add(1);
        true
    }

    pub fn begin_connecting(&mut self) {
        self.state = SessionState::Connecting;
    }

    /// A connection attempt failed; the session stays down.
    pub fn connect_failed(&mut self, code: Option<i32>) {
        self.state = SessionState::Disconnected;
        self.record_error(code);
    }

    pub fn mark_up(&mut self) {
        self.state = SessionState::Connected;
        self.loss_counted = false;
    }

    pub fn record_error(&mut self, code: Option<i32>) {
        if code.is_some() {
            self.last_error_code = code;
        }
    }
}
