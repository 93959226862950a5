//! Playable items and ordered groups of them
//!
//! A [`Track`] is an immutable playable item. A [`Collection`] is an ordered,
//! named group of tracks contributed by one user and consumed front-to-back.

mod collection;
mod track;

pub use collection::{Collection, CollectionId};
pub use track::Track;
