//! Event types for the ThinMusic event system
//!
//! Provides shared event definitions and the EventBus used to fan state
//! changes out to SSE clients.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Panel tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelTab {
    Browse,
    Playing,
    Search,
}

/// Whether the signed-in state of the user is known yet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthState {
    /// Auth provider has not reported yet
    Unknown,
    LoggedOut,
    LoggedIn,
}

/// Track playback length available to the current user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackMode {
    /// 30-second previews only
    Preview,
    /// Full-length playback through a linked streaming account
    Full,
}

/// ThinMusic event types
///
/// Events are broadcast via EventBus and serialized for SSE transmission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ThinEvent {
    /// Search panel state changed (input accepted, cleared, or results committed)
    SearchStateChanged {
        query: String,
        searching: bool,
        result_count: usize,
        generation: u64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Selected panel tab changed
    TabChanged {
        tab: PanelTab,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Playback queue contents changed
    QueueChanged {
        length: usize,
        now_playing_index: Option<usize>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Playback started or stopped
    PlaybackStateChanged {
        playing: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Sign-in state or account link changed
    AuthStateChanged {
        state: AuthState,
        playback_mode: PlaybackMode,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl ThinEvent {
    /// Event name used as the SSE `event:` field
    pub fn event_type(&self) -> &'static str {
        match self {
            ThinEvent::SearchStateChanged { .. } => "SearchStateChanged",
            ThinEvent::TabChanged { .. } => "TabChanged",
            ThinEvent::QueueChanged { .. } => "QueueChanged",
            ThinEvent::PlaybackStateChanged { .. } => "PlaybackStateChanged",
            ThinEvent::AuthStateChanged { .. } => "AuthStateChanged",
        }
    }
}

/// Central event distribution bus
///
/// Uses tokio::broadcast internally: publishing never blocks, slow
/// subscribers see a lag error instead of stalling producers.
///
/// ```
/// use thinmusic_common::events::{EventBus, PanelTab, ThinEvent};
///
/// let event_bus = EventBus::new(100);
/// let mut rx = event_bus.subscribe();
///
/// event_bus.emit_lossy(ThinEvent::TabChanged {
///     tab: PanelTab::Playing,
///     timestamp: chrono::Utc::now(),
/// });
///
/// assert!(rx.try_recv().is_ok());
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ThinEvent>,
}

impl EventBus {
    /// Creates a new EventBus buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<ThinEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: ThinEvent) {
        let _ = self.tx.send(event);
    }

    /// Number of live subscribers (SSE clients plus internal listeners)
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
