//! Immutable view of the queue for rendering
//!
//! Taken under the engine lock, rendered after it is released, so a render
//! never observes a half-applied mutation.

use jukebox_common::{CollectionId, PlaybackState};

use super::queue::{CollectionQueue, TrackRef};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackView {
    pub name: String,
    pub artist: String,
    /// This is the track the engine is playing
    pub playing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionView {
    pub id: CollectionId,
    pub description: String,
    pub user: String,
    pub tracks: Vec<TrackView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueSnapshot {
    pub state: PlaybackState,
    pub current: Option<TrackRef>,
    pub collections: Vec<CollectionView>,
}

impl QueueSnapshot {
    pub(crate) fn capture(queue: &CollectionQueue, state: PlaybackState, current: Option<&TrackRef>) -> Self {
        let collections = queue
            .entries()
            .map(|collection| CollectionView {
                id: collection.id(),
                description: collection.description().to_string(),
                user: collection.user().to_string(),
                tracks: collection
                    .tracks()
                    .iter()
                    .enumerate()
                    .map(|(index, track)| TrackView {
                        name: track.name().to_string(),
                        artist: track.artist().to_string(),
                        playing: current
                            .is_some_and(|c| c.collection_id == collection.id() && c.index == index),
                    })
                    .collect(),
            })
            .collect();

        Self {
            state,
            current: current.cloned(),
            collections,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}
