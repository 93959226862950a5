//! Event types for the jukebox event system
//!
//! Provides the shared event definitions and the EventBus used by the
//! playback engine to announce what it did.

mod playback_types;

pub use playback_types::PlaybackState;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::model::CollectionId;

/// Jukebox event types
///
/// Events are broadcast via [`EventBus`] and can be serialized for logging or
/// external observers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum JukeboxEvent {
    /// Playback state changed (Stopped / Playing / Paused)
    PlaybackStateChanged {
        old_state: PlaybackState,
        new_state: PlaybackState,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A track was handed to the backend
    TrackStarted {
        collection_id: CollectionId,
        /// Position of the track inside its collection
        track_index: usize,
        track_id: String,
        name: String,
        artist: String,
        /// User that queued the owning collection
        requested_by: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A collection entered the queue
    CollectionAdded {
        collection_id: CollectionId,
        description: String,
        user: String,
        /// Inserted at the head instead of the tail
        play_now: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A collection was taken back out of the queue by undo
    CollectionRemoved {
        collection_id: CollectionId,
        description: String,
        user: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A fully played collection moved to play history
    CollectionRetired {
        collection_id: CollectionId,
        description: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Queue emptied by the clear command
    QueueCleared {
        /// Collections dropped from the queue
        removed: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The backend account started playing somewhere else
    PlayTokenLost {
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl JukeboxEvent {
    /// Short event name for logging
    pub fn event_type(&self) -> &'static str {
        match self {
            JukeboxEvent::PlaybackStateChanged { .. } => "PlaybackStateChanged",
            JukeboxEvent::TrackStarted { .. } => "TrackStarted",
            JukeboxEvent::CollectionAdded { .. } => "CollectionAdded",
            JukeboxEvent::CollectionRemoved { .. } => "CollectionRemoved",
            JukeboxEvent::CollectionRetired { .. } => "CollectionRetired",
            JukeboxEvent::QueueCleared { .. } => "QueueCleared",
            JukeboxEvent::PlayTokenLost { .. } => "PlayTokenLost",
        }
    }
}

// ========================================
// EventBus Implementation
// ========================================

/// Central event distribution bus
///
/// Uses tokio::broadcast internally:
/// - Non-blocking publish (slow subscribers don't block producers)
/// - Multiple concurrent subscribers
/// - Lagged message detection for slow subscribers
///
/// Publishing never blocks, so the playback engine may emit while holding
/// its lock.
///
/// # Examples
///
/// ```
/// use jukebox_common::events::{EventBus, JukeboxEvent, PlaybackState};
///
/// let event_bus = EventBus::new(100);
/// let mut rx = event_bus.subscribe();
///
/// event_bus.emit_lossy(JukeboxEvent::PlaybackStateChanged {
///     old_state: PlaybackState::Stopped,
///     new_state: PlaybackState::Playing,
///     timestamp: chrono::Utc::now(),
/// });
///
/// assert!(rx.try_recv().is_ok());
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<JukeboxEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<JukeboxEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: JukeboxEvent,
    ) -> Result<usize, broadcast::error::SendError<JukeboxEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: JukeboxEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_without_subscribers_is_error() {
        let bus = EventBus::new(10);
        let result = bus.emit(JukeboxEvent::PlayTokenLost {
            timestamp: chrono::Utc::now(),
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_emit_reaches_every_subscriber() {
        let bus = EventBus::new(10);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        let delivered = bus
            .emit(JukeboxEvent::QueueCleared {
                removed: 3,
                timestamp: chrono::Utc::now(),
            })
            .unwrap();
        assert_eq!(delivered, 2);

        for rx in [&mut rx1, &mut rx2] {
            match rx.try_recv().unwrap() {
                JukeboxEvent::QueueCleared { removed, .. } => assert_eq!(removed, 3),
                other => panic!("Expected QueueCleared, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_playback_state_display_lowercase() {
        let event = JukeboxEvent::PlaybackStateChanged {
            old_state: PlaybackState::Paused,
            new_state: PlaybackState::Playing,
            timestamp: chrono::Utc::now(),
        };
        assert_eq!(event.event_type(), "PlaybackStateChanged");
        assert_eq!(PlaybackState::Paused.to_string(), "paused");
        assert_eq!(PlaybackState::default(), PlaybackState::Stopped);
    }
}
