//! Track value type

use serde::{Deserialize, Serialize};

/// A single playable item
///
/// Immutable once created; fields are only reachable through accessors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    id: String,
    name: String,
    artist: String,
    /// Playback length in milliseconds (0 = unknown)
    #[serde(default)]
    duration_ms: u64,
}

impl Track {
    /// Create a track with unknown duration
    pub fn new(id: impl Into<String>, name: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            artist: artist.into(),
            duration_ms: 0,
        }
    }

    /// Same track with a known duration
    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// Backend identifier (e.g. `spotify:track:...`)
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Artist display name
    pub fn artist(&self) -> &str {
        &self.artist
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }
}

impl std::fmt::Display for Track {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.artist, self.name)
    }
}
