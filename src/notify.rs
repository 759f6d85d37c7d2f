use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

/// How long a banner stays up before it dismisses itself.
pub const DEFAULT_DISMISS_AFTER: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

/// A transient, auto-dismissing banner.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub dismiss_after: Duration,
}

impl Notification {
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            created_at: Utc::now(),
            dismiss_after: DEFAULT_DISMISS_AFTER,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match chrono::Duration::from_std(self.dismiss_after) {
            Ok(ttl) => now >= self.created_at + ttl,
            Err(_) => false,
        }
    }
}

/// Sending half of the notification channel. A disabled notifier drops
/// everything it is given.
#[derive(Debug, Clone, Default)]
pub struct Notifier {
    sender: Option<mpsc::UnboundedSender<Notification>>,
}

impl Notifier {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { sender: Some(tx) }, rx)
    }

    pub fn disabled() -> Self {
        Self { sender: None }
    }

    pub fn notify(&self, notification: Notification) {
        if let Some(sender) = &self.sender {
            if sender.send(notification).is_err() {
                debug!("Notification receiver dropped");
            }
        }
    }

    pub fn info(&self, message: impl Into<String>) {
        self.notify(Notification::new(NotificationLevel::Info, message));
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.notify(Notification::new(NotificationLevel::Warning, message));
    }

    pub fn error(&self, message: impl Into<String>) {
        self.notify(Notification::new(NotificationLevel::Error, message));
    }
}
