//! User-facing notifications. The orchestrator emits; a presentation layer subscribes and renders.

use std::fmt;
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Warning,
    Error,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Success => "success",
            NotificationKind::Warning => "warning",
            NotificationKind::Error => "error",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self { kind: NotificationKind::Success, message: message.into() }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { kind: NotificationKind::Warning, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { kind: NotificationKind::Error, message: message.into() }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.as_str(), self.message)
    }
}

/// Broadcast sender for [`Notification`]s. Cloning shares the channel.
#[derive(Clone)]
pub struct Notifier {
    tx: broadcast::Sender<Notification>,
}

impl Notifier {
    pub fn new() -> Self {
        Self { tx: broadcast::channel(CHANNEL_CAPACITY).0 }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    /// Emit and log. Nobody listening is fine.
    pub fn emit(&self, notification: Notification) {
        match notification.kind {
            NotificationKind::Success => log::info!("[excel_upload] notify success: {}", notification.message),
            NotificationKind::Warning => log::warn!("[excel_upload] notify warning: {}", notification.message),
            NotificationKind::Error => log::error!("[excel_upload] notify error: {}", notification.message),
        }
        let _ = self.tx.send(notification);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.emit(Notification::success(message));
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.emit(Notification::warning(message));
    }

    pub fn error(&self, message: impl Into<String>) {
        self.emit(Notification::error(message));
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}
