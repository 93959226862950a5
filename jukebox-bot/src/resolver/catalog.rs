//! TOML music catalog and the resolver built on it
//!
//! Catalog format:
//!
//! ```toml
//! [[tracks]]
//! id = "local:track:1"
//! name = "Teardrop"
//! artist = "Massive Attack"
//! album = "Mezzanine"
//! duration_ms = 330000
//!
//! [[playlists]]
//! name = "Trip hop"
//! tracks = ["local:track:1"]
//! ```
//!
//! Query forms understood by [`Catalog::lookup`]:
//! - an exact track id
//! - `album <name>` / `artist <name>` / `playlist <name>`
//! - anything else: the first track whose name and artist contain every word

use std::collections::HashSet;
use std::path::Path;

use async_trait::async_trait;
use jukebox_common::{Collection, Track};
use serde::Deserialize;
use tracing::info;

use super::Resolver;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Deserialize)]
struct CatalogTrack {
    id: String,
    name: String,
    artist: String,
    #[serde(default)]
    album: Option<String>,
    #[serde(default)]
    duration_ms: u64,
}

impl CatalogTrack {
    fn to_track(&self) -> Track {
        Track::new(&self.id, &self.name, &self.artist).with_duration_ms(self.duration_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
struct CatalogPlaylist {
    name: String,
    tracks: Vec<String>,
}

/// In-memory music catalog
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    tracks: Vec<CatalogTrack>,
    #[serde(default)]
    playlists: Vec<CatalogPlaylist>,
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

impl Catalog {
    /// Parse and validate a catalog document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let catalog: Catalog = toml::from_str(content).map_err(jukebox_common::Error::from)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(jukebox_common::Error::from)?;
        let catalog = Self::from_toml_str(&content)?;
        info!(
            "Loaded catalog {:?}: {} tracks, {} playlists",
            path,
            catalog.tracks.len(),
            catalog.playlists.len()
        );
        Ok(catalog)
    }

    fn validate(&self) -> Result<()> {
        let mut ids = HashSet::new();
        for track in &self.tracks {
            if !ids.insert(track.id.as_str()) {
                return Err(Error::Catalog(format!("duplicate track id {}", track.id)));
            }
        }
        for playlist in &self.playlists {
            if let Some(missing) = playlist.tracks.iter().find(|id| !ids.contains(id.as_str())) {
                return Err(Error::Catalog(format!(
                    "playlist '{}' references unknown track {}",
                    playlist.name, missing
                )));
            }
        }
        Ok(())
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Resolve a query to a new collection
    pub fn lookup(&self, query: &str) -> Option<Collection> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }

        if let Some(track) = self.tracks.iter().find(|t| t.id == query) {
            return Some(Self::single(track));
        }

        let (keyword, rest) = match query.split_once(char::is_whitespace) {
            Some((keyword, rest)) => (keyword.to_lowercase(), rest.trim()),
            None => (String::new(), ""),
        };

        match keyword.as_str() {
            "album" if !rest.is_empty() => self.album(rest),
            "artist" if !rest.is_empty() => self.artist(rest),
            "playlist" if !rest.is_empty() => self.playlist(rest),
            _ => self.search(query),
        }
    }

    fn single(track: &CatalogTrack) -> Collection {
        Collection::new(format!("{} by {}", track.name, track.artist), vec![track.to_track()])
    }

    fn album(&self, name: &str) -> Option<Collection> {
        let first = self
            .tracks
            .iter()
            .find(|t| t.album.as_deref().is_some_and(|a| contains_ci(a, name)))?;
        let album = first.album.as_deref()?;
        let tracks = self
            .tracks
            .iter()
            .filter(|t| t.album.as_deref() == Some(album))
            .map(CatalogTrack::to_track)
            .collect();
        Some(Collection::new(format!("the album {} by {}", album, first.artist), tracks))
    }

    fn artist(&self, name: &str) -> Option<Collection> {
        let first = self.tracks.iter().find(|t| contains_ci(&t.artist, name))?;
        let tracks = self
            .tracks
            .iter()
            .filter(|t| t.artist == first.artist)
            .map(CatalogTrack::to_track)
            .collect();
        Some(Collection::new(format!("tracks by {}", first.artist), tracks))
    }

    fn playlist(&self, name: &str) -> Option<Collection> {
        let playlist = self.playlists.iter().find(|p| contains_ci(&p.name, name))?;
        let tracks = playlist
            .tracks
            .iter()
            .filter_map(|id| self.tracks.iter().find(|t| &t.id == id))
            .map(CatalogTrack::to_track)
            .collect();
        Some(Collection::new(format!("the playlist {}", playlist.name), tracks))
    }

    fn search(&self, query: &str) -> Option<Collection> {
        let words: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
        self.tracks
            .iter()
            .find(|t| {
                let haystack = format!("{} {}", t.name, t.artist).to_lowercase();
                words.iter().all(|w| haystack.contains(w.as_str()))
            })
            .map(Self::single)
    }
}

/// [`Resolver`] backed by a [`Catalog`]
pub struct CatalogResolver {
    catalog: Catalog,
}

impl CatalogResolver {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl Resolver for CatalogResolver {
    async fn resolve(&self, query: &str) -> Result<Option<Collection>> {
        Ok(self.catalog.lookup(query))
    }
}
