//! Collection: an ordered group of tracks with a consumption cursor

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Track;

/// Opaque identity of a [`Collection`]
///
/// Assigned once at construction. Queue removal and undo compare collections
/// by this id, never by content, so two collections holding identical tracks
/// stay distinguishable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectionId(Uuid);

impl CollectionId {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for CollectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered tracks contributed by one user
///
/// The collection is consumed through [`Iterator::next`], which yields each
/// not-yet-played track once and advances the cursor. The sequence is finite
/// and cannot be restarted.
///
/// Not `Clone`: a copy would share this collection's identity.
#[derive(Debug)]
pub struct Collection {
    id: CollectionId,
    tracks: Vec<Track>,
    description: String,
    user: String,
    /// Number of tracks already handed out
    cursor: usize,
}

impl Collection {
    /// Create a collection with a fresh identity and no owner yet
    pub fn new(description: impl Into<String>, tracks: Vec<Track>) -> Self {
        Self {
            id: CollectionId::generate(),
            tracks,
            description: description.into(),
            user: String::new(),
            cursor: 0,
        }
    }

    /// Associate the collection with the user that requested it
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    pub fn id(&self) -> CollectionId {
        self.id
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// User that requested the collection (empty until assigned)
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Number of tracks consumed so far
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Index of the most recently yielded track, if any
    pub fn current_index(&self) -> Option<usize> {
        self.cursor.checked_sub(1)
    }

    /// Tracks not yet yielded
    pub fn remaining(&self) -> usize {
        self.tracks.len().saturating_sub(self.cursor)
    }

    /// True once every track has been yielded
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn has_remaining(&self) -> bool {
        !self.is_empty()
    }
}

impl Iterator for Collection {
    type Item = Track;

    fn next(&mut self) -> Option<Track> {
        let track = self.tracks.get(self.cursor).cloned()?;
        self.cursor += 1;
        Some(track)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

impl std::iter::FusedIterator for Collection {}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_tracks() -> Vec<Track> {
        vec![
            Track::new("t:1", "One", "Artist"),
            Track::new("t:2", "Two", "Artist"),
        ]
    }

    #[test]
    fn test_consumes_front_to_back_once() {
        let mut col = Collection::new("album", two_tracks());
        assert!(col.has_remaining());
        assert_eq!(col.current_index(), None);

        assert_eq!(col.next().map(|t| t.name().to_string()), Some("One".into()));
        assert_eq!(col.current_index(), Some(0));
        assert_eq!(col.next().map(|t| t.name().to_string()), Some("Two".into()));
        assert!(col.is_empty());

        // Finite and non-restartable
        assert!(col.next().is_none());
        assert!(col.next().is_none());
        assert_eq!(col.cursor(), 2);
    }

    #[test]
    fn test_identity_differs_for_identical_content() {
        let a = Collection::new("same", two_tracks());
        let b = Collection::new("same", two_tracks());
        assert_eq!(a.tracks(), b.tracks());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_empty_collection_is_empty_from_start() {
        let col = Collection::new("nothing", Vec::new());
        assert!(col.is_empty());
        assert_eq!(col.size_hint(), (0, Some(0)));
    }

    #[test]
    fn test_with_user_keeps_identity() {
        let col = Collection::new("album", two_tracks());
        let id = col.id();
        let col = col.with_user("alice");
        assert_eq!(col.id(), id);
        assert_eq!(col.user(), "alice");
    }
}
