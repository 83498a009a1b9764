use serde::Serialize;
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Danger,
}

/// A transient message for the user (a toast, a status line).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DeskEvent {
    /// Derived views should be recomputed from the new snapshot.
    Reloaded { generation: u64, bookings: usize },
    Notice(Notice),
}

/// Broadcast hub between the engine and whatever presents its output.
pub struct NotifyHub {
    sender: broadcast::Sender<DeskEvent>,
}

impl Default for NotifyHub {
    fn default() -> Self {
        Self::new()
    }
}

impl NotifyHub {
    pub fn new() -> Self {
        Self {
            sender: broadcast::channel(CHANNEL_CAPACITY).0,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DeskEvent> {
        self.sender.subscribe()
    }

    /// Send an event. No-op if nobody is listening.
    pub fn send(&self, event: &DeskEvent) {
        let _ = self.sender.send(event.clone());
    }

    pub fn notice(&self, level: NoticeLevel, message: impl Into<String>) {
        self.send(&DeskEvent::Notice(Notice {
            level,
            message: message.into(),
        }));
    }
}
