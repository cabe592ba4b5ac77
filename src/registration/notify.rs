//! Transient user-visible messages

use crate::registration::services::Notifier;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{error, info, warn};

/// How long a short notification stays on screen.
pub const SHORT_DISPLAY: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: Level,
    pub message: String,
    pub shown_at: DateTime<Utc>,
}

impl Notification {
    fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            shown_at: Utc::now(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(Level::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Level::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Level::Error, message)
    }

    pub fn dismiss_at(&self) -> DateTime<Utc> {
        self.shown_at + chrono::Duration::milliseconds(SHORT_DISPLAY.as_millis() as i64)
    }
}

/// Writes notifications to the log. Used by the command line front end.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            Level::Success => info!(target: "signup::notify", "{}", notification.message),
            Level::Warning => warn!(target: "signup::notify", "{}", notification.message),
            Level::Error => error!(target: "signup::notify", "{}", notification.message),
        }
    }
}

/// Collects notifications so a caller can hand them back in one response.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    shown: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.snapshot().into_iter().map(|n| n.message).collect()
    }

    pub fn snapshot(&self) -> Vec<Notification> {
        self.shown
            .lock()
            .map(|shown| shown.clone())
            .unwrap_or_default()
    }

    pub fn take(&self) -> Vec<Notification> {
        self.shown
            .lock()
            .map(|mut shown| std::mem::take(&mut *shown))
            .unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        if let Ok(mut shown) = self.shown.lock() {
            shown.push(notification);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_notifier_keeps_order_and_drains() {
        let notifier = RecordingNotifier::new();
        notifier.notify(Notification::success("User data saved."));
        notifier.notify(Notification::error("Image upload failed."));

        assert_eq!(notifier.messages(), vec!["User data saved.", "Image upload failed."]);
        let taken = notifier.take();
        assert_eq!(taken.len(), 2);
        assert_eq!(taken[1].level, Level::Error);
        assert!(notifier.snapshot().is_empty());
    }

    #[test]
    fn short_notifications_dismiss_after_two_seconds() {
        let n = Notification::warning("Permission denied. Cannot access storage.");
        assert_eq!((n.dismiss_at() - n.shown_at).num_milliseconds(), 2000);
    }
}
