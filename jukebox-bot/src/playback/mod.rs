//! Playback queue and state engine

pub mod engine;
pub mod queue;
pub mod snapshot;

pub use engine::{PlaybackEngine, SharedEngine};
pub use queue::{AddRecord, CollectionQueue, TrackRef};
pub use snapshot::{CollectionView, QueueSnapshot, TrackView};
