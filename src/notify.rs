//! Transient user-visible notices.
//!
//! A single slot: posting replaces whatever is showing, and the notice
//! disappears on its own once its time-to-live has elapsed.

use std::time::{Duration, Instant};

#[derive(Debug)]
struct Notice {
    message: String,
    posted_at: Instant,
}

#[derive(Debug)]
pub struct Notifier {
    ttl: Duration,
    slot: Option<Notice>,
}

impl Notifier {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, slot: None }
    }

    pub fn post(&mut self, message: impl Into<String>, now: Instant) {
        self.slot = Some(Notice {
            message: message.into(),
            posted_at: now,
        });
    }

    /// The visible notice, if it has not expired by `now`.
    pub fn current(&self, now: Instant) -> Option<&str> {
        self.slot
            .as_ref()
            .filter(|n| now.saturating_duration_since(n.posted_at) < self.ttl)
            .map(|n| n.message.as_str())
    }

    /// Drop an expired notice. Returns `true` if one was removed.
    pub fn expire(&mut self, now: Instant) -> bool {
        if self.slot.is_some() && self.current(now).is_none() {
            self.slot = None;
            return true;
        }
        false
    }

    pub fn dismiss(&mut self) {
        self.slot = None;
    }
}
