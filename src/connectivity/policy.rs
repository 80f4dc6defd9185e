/// How a session is retried inside `ensure_ready`.
///
/// The default device behaviour is unbounded: network loss is assumed to
/// be transient and a stalled loop beats lost telemetry.  A bounded policy
/// lets `ensure_ready` give up and return an error instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Wait between consecutive attempts.
    pub delay_ms: u32,
    /// `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl RetryPolicy {
    pub const fn unbounded(delay_ms: u32) -> Self {
        Self {
            delay_ms,
            max_attempts: None,
        }
    }

    pub const fn bounded(delay_ms: u32, max_attempts: u32) -> Self {
        Self {
            delay_ms,
            max_attempts: Some(max_attempts),
        }
    }

    /// Whether no further attempt is allowed after `attempts` failures.
    pub fn exhausted(&self, attempts: u32) -> bool {
        self.max_attempts.is_some_and(|max| attempts >= max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbounded_never_exhausts() {
        let p = RetryPolicy::unbounded(500);
        assert!(!p.exhausted(u32::MAX));
    }

    #[test]
    fn bounded_exhausts_at_limit() {
        let p = RetryPolicy::bounded(500, 3);
        assert!(!p.exhausted(2));
        assert!(p.exhausted(3));
    }
}
