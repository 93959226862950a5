//! # Jukebox Common Library
//!
//! Shared code for the jukebox chat bot:
//! - Track and Collection model
//! - Event types (JukeboxEvent enum) and the EventBus
//! - Bootstrap configuration loading
//! - Common error type

pub mod config;
pub mod error;
pub mod events;
pub mod model;

pub use error::{Error, Result};
pub use events::{EventBus, JukeboxEvent, PlaybackState};
pub use model::{Collection, CollectionId, Track};
