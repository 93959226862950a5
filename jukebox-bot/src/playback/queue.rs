//! Collection queue with add/play history
//!
//! Pure bookkeeping: no backend calls, no notifications. The engine owns a
//! [`CollectionQueue`] and decides when to advance.
//!
//! **Ordering:** insertion order is preserved except for front insertion
//! (`play ... now`). Removal by undo leaves the relative order of the other
//! entries untouched.

use std::collections::VecDeque;

use jukebox_common::{Collection, CollectionId, Track};
use tracing::debug;

/// Add-history record
///
/// Outlives the collection's queue membership so undo can still report who
/// added what after the collection was retired or cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddRecord {
    pub collection_id: CollectionId,
    pub description: String,
    pub user: String,
}

/// Reference to a track inside a queued collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRef {
    pub collection_id: CollectionId,
    /// Position of the track inside its collection
    pub index: usize,
    pub track: Track,
}

/// Ordered collections awaiting or supplying playback
#[derive(Debug, Default)]
pub struct CollectionQueue {
    entries: VecDeque<Collection>,
    add_history: Vec<AddRecord>,
    play_history: Vec<Collection>,
}

impl CollectionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a collection and record it in add history
    ///
    /// `play_now` puts it at the head, otherwise it goes to the back.
    pub fn push(&mut self, collection: Collection, play_now: bool) -> AddRecord {
        let record = AddRecord {
            collection_id: collection.id(),
            description: collection.description().to_string(),
            user: collection.user().to_string(),
        };

        if play_now {
            self.entries.push_front(collection);
        } else {
            self.entries.push_back(collection);
        }
        self.add_history.push(record.clone());

        debug!(
            "Queued {} ({}) at {}; queue length {}",
            record.description,
            record.collection_id,
            if play_now { "front" } else { "back" },
            self.entries.len()
        );
        record
    }

    /// Pop the most recent add-history record
    pub fn pop_history(&mut self) -> Option<AddRecord> {
        self.add_history.pop()
    }

    /// Remove the first entry with the given identity
    pub fn remove(&mut self, id: CollectionId) -> Option<Collection> {
        let position = self.entries.iter().position(|c| c.id() == id)?;
        self.entries.remove(position)
    }

    /// Move an exhausted head collection into play history
    ///
    /// Returns the retired collection's record, or `None` when the head is
    /// absent or still has tracks.
    pub fn retire_exhausted_head(&mut self) -> Option<AddRecord> {
        if !self.entries.front().is_some_and(Collection::is_empty) {
            return None;
        }
        let retired = self.entries.pop_front()?;
        let record = AddRecord {
            collection_id: retired.id(),
            description: retired.description().to_string(),
            user: retired.user().to_string(),
        };
        self.play_history.push(retired);
        Some(record)
    }

    /// Pull the next track from the head collection's cursor
    pub fn pull_from_head(&mut self) -> Option<TrackRef> {
        let head = self.entries.front_mut()?;
        let track = head.next()?;
        Some(TrackRef {
            collection_id: head.id(),
            index: head.current_index()?,
            track,
        })
    }

    /// Drop every queued collection; histories are kept
    ///
    /// Returns the number of collections removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        removed
    }

    /// True if any queued collection still has unconsumed tracks
    pub fn has_remaining(&self) -> bool {
        self.entries.iter().any(Collection::has_remaining)
    }

    /// Negation of [`has_remaining`](Self::has_remaining)
    pub fn is_empty(&self) -> bool {
        !self.has_remaining()
    }

    pub fn head(&self) -> Option<&Collection> {
        self.entries.front()
    }

    pub fn entries(&self) -> impl Iterator<Item = &Collection> {
        self.entries.iter()
    }

    /// Number of queued collections (exhausted or not)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn add_history(&self) -> &[AddRecord] {
        &self.add_history
    }

    pub fn play_history(&self) -> &[Collection] {
        &self.play_history
    }
}
