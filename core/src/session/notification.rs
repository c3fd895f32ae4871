//! Transient status messages.

use std::time::{Duration, Instant};

/// Default lifetime of a notification.
pub const DEFAULT_NOTIFICATION_TTL: Duration = Duration::from_secs(3);

/// A message shown until `expires_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    text: String,
    expires_at: Instant,
}

impl Notification {
    pub fn new(text: impl Into<String>, ttl: Duration) -> Self {
        Self {
            text: text.into(),
            expires_at: Instant::now() + ttl,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}
