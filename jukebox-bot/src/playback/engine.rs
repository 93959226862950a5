//! Playback state machine
//!
//! **Responsibilities:**
//! - Own the [`CollectionQueue`] and the Stopped / Playing / Paused state
//! - Decide what plays next (`advance`), retiring finished collections
//! - Instruct the backend and publish the queue through the chat comment
//!
//! **Concurrency:** the engine is shared as [`SharedEngine`]; every mutating
//! call happens while that single lock is held, whether it comes from a chat
//! command, a backend event or the startup comment check. Backend and chat
//! calls made from here are non-blocking by contract.

use std::sync::Arc;

use jukebox_common::{Collection, EventBus, JukeboxEvent, PlaybackState, Track};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::queue::{AddRecord, CollectionQueue, TrackRef};
use super::snapshot::QueueSnapshot;
use crate::backend::{BackendStatus, PlaybackBackend};
use crate::chat::ChatSink;
use crate::error::{Error, Result};
use crate::render;

/// Engine handle shared by the dispatcher and the coordinator
pub type SharedEngine = Arc<Mutex<PlaybackEngine>>;

/// Queue + state machine driving one backend
pub struct PlaybackEngine {
    queue: CollectionQueue,
    state: PlaybackState,
    /// Track handed to the backend most recently (None while stopped)
    current: Option<TrackRef>,
    backend: Arc<dyn PlaybackBackend>,
    chat: Arc<dyn ChatSink>,
    events: EventBus,
}

impl PlaybackEngine {
    pub fn new(backend: Arc<dyn PlaybackBackend>, chat: Arc<dyn ChatSink>, events: EventBus) -> Self {
        Self {
            queue: CollectionQueue::new(),
            state: PlaybackState::Stopped,
            current: None,
            backend,
            chat,
            events,
        }
    }

    pub fn into_shared(self) -> SharedEngine {
        Arc::new(Mutex::new(self))
    }

    // ========================================
    // Queue control
    // ========================================

    /// Queue a collection
    ///
    /// `play_now` puts it at the head and starts it immediately. Otherwise it
    /// is appended, and playback starts only if the engine was idle with
    /// nothing left to play and `queue_only` is false.
    pub fn add(&mut self, collection: Collection, play_now: bool, queue_only: bool) -> AddRecord {
        let idle = self.queue.is_empty() && self.state == PlaybackState::Stopped;
        let record = self.queue.push(collection, play_now);

        self.events.emit_lossy(JukeboxEvent::CollectionAdded {
            collection_id: record.collection_id,
            description: record.description.clone(),
            user: record.user.clone(),
            play_now,
            timestamp: chrono::Utc::now(),
        });

        if play_now || (idle && !queue_only) {
            self.advance();
        } else if self.state != PlaybackState::Stopped {
            self.publish_queue_comment();
        }
        record
    }

    /// Remove the most recently added collection, wherever it sits
    ///
    /// Advances when the removed collection supplied the current track.
    pub fn undo(&mut self) -> Result<AddRecord> {
        let record = self.queue.pop_history().ok_or(Error::EmptyHistory)?;
        let removed = self.queue.remove(record.collection_id);

        info!(
            "Undo: {} added by {} ({})",
            record.description,
            record.user,
            if removed.is_some() { "removed from queue" } else { "no longer queued" }
        );
        self.events.emit_lossy(JukeboxEvent::CollectionRemoved {
            collection_id: record.collection_id,
            description: record.description.clone(),
            user: record.user.clone(),
            timestamp: chrono::Utc::now(),
        });

        let was_current = self
            .current
            .as_ref()
            .is_some_and(|c| c.collection_id == record.collection_id);

        if removed.is_some() && was_current {
            self.advance();
        } else if self.state != PlaybackState::Stopped {
            self.publish_queue_comment();
        }
        Ok(record)
    }

    /// Empty the queue and stop; histories are kept
    pub fn clear(&mut self) {
        let removed = self.queue.clear();
        info!("Queue cleared ({} collections)", removed);
        self.events.emit_lossy(JukeboxEvent::QueueCleared {
            removed,
            timestamp: chrono::Utc::now(),
        });
        self.stop();
    }

    // ========================================
    // Playback commands
    // ========================================

    /// Start or resume playback
    ///
    /// Stopped advances to the next track, paused resumes, playing is left
    /// alone.
    pub fn play(&mut self) {
        match self.backend.status() {
            BackendStatus::Stopped => self.advance(),
            BackendStatus::Paused => {
                self.backend.resume();
                self.set_state(PlaybackState::Playing);
            }
            BackendStatus::Playing => {}
        }
    }

    /// Toggle between playing and paused
    ///
    /// Returns the new state, or `None` when nothing was playing.
    pub fn pause(&mut self) -> Option<PlaybackState> {
        match self.backend.status() {
            BackendStatus::Playing => {
                self.backend.pause();
                self.set_state(PlaybackState::Paused);
            }
            BackendStatus::Paused => {
                self.backend.resume();
                self.set_state(PlaybackState::Playing);
            }
            BackendStatus::Stopped => return None,
        }
        Some(self.state)
    }

    /// Play the next track, retiring the head collection once it is used up
    ///
    /// Retirement and the following pull happen in one call under the engine
    /// lock, so no other operation can observe the queue in between.
    pub fn advance(&mut self) {
        if let Some(retired) = self.queue.retire_exhausted_head() {
            debug!("Retired {} to play history", retired.description);
            self.events.emit_lossy(JukeboxEvent::CollectionRetired {
                collection_id: retired.collection_id,
                description: retired.description,
                timestamp: chrono::Utc::now(),
            });
        }

        if !self.queue.has_remaining() {
            debug!("Nothing left to play");
            self.stop();
            return;
        }

        let Some(next) = self.queue.pull_from_head() else {
            // Tracks remain further back but the head has none to give
            warn!("Head collection yielded no track; stopping");
            self.stop();
            return;
        };

        info!("\u{266B}  {}", next.track);
        self.backend.play_track(&next.track);

        let requested_by = self.queue.head().map(|c| c.user().to_string()).unwrap_or_default();
        self.events.emit_lossy(JukeboxEvent::TrackStarted {
            collection_id: next.collection_id,
            track_index: next.index,
            track_id: next.track.id().to_string(),
            name: next.track.name().to_string(),
            artist: next.track.artist().to_string(),
            requested_by,
            timestamp: chrono::Utc::now(),
        });

        self.current = Some(next);
        self.set_state(PlaybackState::Playing);
        self.publish_queue_comment();
    }

    /// Stop the backend and show the idle comment
    pub fn stop(&mut self) {
        self.backend.stop();
        self.current = None;
        self.set_state(PlaybackState::Stopped);
        self.chat.set_comment(render::NOTHING_PLAYING);
    }

    // ========================================
    // Coordinator hooks
    // ========================================

    /// Re-emit the idle comment if stopped
    ///
    /// Returns true if the comment was set.
    pub fn ensure_idle_comment(&mut self) -> bool {
        if self.state != PlaybackState::Stopped {
            return false;
        }
        self.chat.set_comment(render::NOTHING_PLAYING);
        true
    }

    /// Tell the channel the backend account was taken over elsewhere
    ///
    /// The backend has already paused itself; engine state is left as is.
    pub fn play_token_lost(&mut self) {
        warn!("Play token lost: account in use elsewhere");
        self.chat.broadcast(render::PLAY_TOKEN_LOST);
        self.events.emit_lossy(JukeboxEvent::PlayTokenLost {
            timestamp: chrono::Utc::now(),
        });
    }

    // ========================================
    // Queries
    // ========================================

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// What the backend reports, used for play/pause toggle decisions
    pub fn backend_status(&self) -> BackendStatus {
        self.backend.status()
    }

    pub fn current(&self) -> Option<&TrackRef> {
        self.current.as_ref()
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current.as_ref().map(|c| &c.track)
    }

    pub fn has_remaining(&self) -> bool {
        self.queue.has_remaining()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn queue(&self) -> &CollectionQueue {
        &self.queue
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        QueueSnapshot::capture(&self.queue, self.state, self.current.as_ref())
    }

    fn set_state(&mut self, new_state: PlaybackState) {
        let old_state = self.state;
        if old_state == new_state {
            return;
        }
        self.state = new_state;
        info!("Playback state: {} -> {}", old_state, new_state);
        self.events.emit_lossy(JukeboxEvent::PlaybackStateChanged {
            old_state,
            new_state,
            timestamp: chrono::Utc::now(),
        });
    }

    fn publish_queue_comment(&self) {
        self.chat.set_comment(&render::render_queue(&self.snapshot()));
    }
}
