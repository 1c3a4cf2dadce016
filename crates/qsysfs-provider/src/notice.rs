//! User-visible notices.
//!
//! Capability downgrades never fail the calling operation; they surface
//! here instead, fanned out over a broadcast channel for a UI layer to
//! render. Everything published is also logged through `tracing`.

use tokio::sync::broadcast;

/// Advisory notices raised by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Source dates were requested but the session cannot run the
    /// record-level query mechanism; transfers fall back to plain content.
    SourceDatesUnavailable,
    /// The session reported the unreliable-encoding CCSID sentinel; source
    /// dates stay enabled but may misalign.
    UnreliableEncoding {
        /// The reported CCSID.
        ccsid: u16,
    },
}

/// Broadcast hub for notices.
#[derive(Debug)]
pub struct NoticeHub {
    tx: broadcast::Sender<Notice>,
}

impl Default for NoticeHub {
    fn default() -> Self {
        Self::new()
    }
}

impl NoticeHub {
    /// Create a hub. Capacity is small: notices are rare and advisory.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(16);
        Self { tx }
    }

    /// Subscribe to future notices.
    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.tx.subscribe()
    }

    /// Publish a notice. Dropped silently when nobody is subscribed.
    pub fn publish(&self, notice: Notice) {
        match &notice {
            Notice::SourceDatesUnavailable => {
                tracing::warn!("source dates requested but the session lacks record-level queries; falling back to plain transfer");
            }
            Notice::UnreliableEncoding { ccsid } => {
                tracing::info!(ccsid, "session reports an unreliable character encoding");
            }
        }
        let _ = self.tx.send(notice);
    }
}
