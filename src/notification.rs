//! Transient notifications shown after a user action completes.

use std::time::Duration;

use tokio::time::Instant;

use crate::constants::NOTIFICATION_DURATION;

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

impl Severity {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
    shown_at: Instant,
}

impl Notification {
    #[must_use]
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.shown_at.elapsed() >= ttl
    }
}

/// Holds at most one notification. A newer one replaces the older and restarts the timer.
#[derive(Debug, Clone)]
pub struct NotificationSlot {
    current: Option<Notification>,
    ttl: Duration,
}

impl Default for NotificationSlot {
    fn default() -> Self {
        Self::new(NOTIFICATION_DURATION)
    }
}

impl NotificationSlot {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self { current: None, ttl }
    }

    pub fn show(&mut self, severity: Severity, message: impl Into<String>) {
        self.current = Some(Notification {
            severity,
            message: message.into(),
            shown_at: Instant::now(),
        });
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.show(Severity::Success, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.show(Severity::Error, message);
    }

    /// Clear the notification. Calling this with nothing shown is a no-op.
    pub fn dismiss(&mut self) {
        self.current = None;
    }

    /// The visible notification, dropping it first if it has timed out.
    pub fn active(&mut self) -> Option<&Notification> {
        if self.current.as_ref().is_some_and(|n| n.is_expired(self.ttl)) {
            self.current = None;
        }
        self.current.as_ref()
    }
}
