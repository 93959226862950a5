//! Shared fakes for jukebox-bot integration tests
//!
//! - RecordingBackend: follows play/pause/stop like a real backend and logs calls
//! - RecordingChat: keeps every comment, broadcast and whisper
//! - StaticResolver / SlowResolver: deterministic query resolution

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use jukebox_bot::backend::{BackendStatus, PlaybackBackend};
use jukebox_bot::chat::ChatSink;
use jukebox_bot::playback::{PlaybackEngine, SharedEngine};
use jukebox_bot::resolver::Resolver;
use jukebox_common::{Collection, EventBus, Track};

/// Collection of `tracks` tracks with ids `<description>:<i>`
pub fn album(description: &str, tracks: usize) -> Collection {
    let tracks = (0..tracks)
        .map(|i| Track::new(format!("{description}:{i}"), format!("{description} {i}"), "Band"))
        .collect();
    Collection::new(description, tracks)
}

/// Same as [`album`] with the requesting user set
pub fn album_by(description: &str, tracks: usize, user: &str) -> Collection {
    album(description, tracks).with_user(user)
}

/// Descriptions of the queued collections, head first
pub fn queue_order(engine: &PlaybackEngine) -> Vec<String> {
    engine.queue().entries().map(|c| c.description().to_string()).collect()
}

#[derive(Default)]
struct BackendLog {
    status: Option<BackendStatus>,
    played: Vec<String>,
    stops: usize,
}

/// Backend that records what it was told to do
#[derive(Default)]
pub struct RecordingBackend {
    log: Mutex<BackendLog>,
    polls: AtomicUsize,
    logouts: AtomicUsize,
}

impl RecordingBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Track ids handed to `play_track`, in order
    pub fn played(&self) -> Vec<String> {
        self.log.lock().unwrap().played.clone()
    }

    /// Status as the engine would see it
    pub fn status_now(&self) -> BackendStatus {
        self.log.lock().unwrap().status.unwrap_or(BackendStatus::Stopped)
    }

    pub fn stops(&self) -> usize {
        self.log.lock().unwrap().stops
    }

    pub fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }

    pub fn logouts(&self) -> usize {
        self.logouts.load(Ordering::SeqCst)
    }

    /// Simulate the backend pausing itself (e.g. after losing the play token)
    pub fn force_status(&self, status: BackendStatus) {
        self.log.lock().unwrap().status = Some(status);
    }
}

impl PlaybackBackend for RecordingBackend {
    fn play_track(&self, track: &Track) {
        let mut log = self.log.lock().unwrap();
        log.played.push(track.id().to_string());
        log.status = Some(BackendStatus::Playing);
    }

    fn pause(&self) {
        self.log.lock().unwrap().status = Some(BackendStatus::Paused);
    }

    fn resume(&self) {
        self.log.lock().unwrap().status = Some(BackendStatus::Playing);
    }

    fn stop(&self) {
        let mut log = self.log.lock().unwrap();
        log.stops += 1;
        log.status = Some(BackendStatus::Stopped);
    }

    fn status(&self) -> BackendStatus {
        self.log.lock().unwrap().status.unwrap_or(BackendStatus::Stopped)
    }

    fn process_events(&self) {
        self.polls.fetch_add(1, Ordering::SeqCst);
    }

    fn is_disconnected(&self) -> bool {
        self.logouts() > 0
    }

    fn logout(&self) {
        self.logouts.fetch_add(1, Ordering::SeqCst);
    }
}

/// Chat sink that keeps everything it was sent
pub struct RecordingChat {
    comments: Mutex<Vec<String>>,
    broadcasts: Mutex<Vec<String>>,
    whispers: Mutex<Vec<(String, String)>>,
    volume: AtomicU8,
}

impl RecordingChat {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            comments: Mutex::new(Vec::new()),
            broadcasts: Mutex::new(Vec::new()),
            whispers: Mutex::new(Vec::new()),
            volume: AtomicU8::new(50),
        })
    }

    pub fn last_comment(&self) -> Option<String> {
        self.comments.lock().unwrap().last().cloned()
    }

    pub fn comment_count(&self) -> usize {
        self.comments.lock().unwrap().len()
    }

    pub fn broadcasts(&self) -> Vec<String> {
        self.broadcasts.lock().unwrap().clone()
    }

    pub fn whispers(&self) -> Vec<(String, String)> {
        self.whispers.lock().unwrap().clone()
    }

    /// Text of the most recent whisper to `user`
    pub fn last_whisper_to(&self, user: &str) -> Option<String> {
        self.whispers
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(to, _)| to == user)
            .map(|(_, text)| text.clone())
    }
}

impl ChatSink for RecordingChat {
    fn set_comment(&self, text: &str) {
        self.comments.lock().unwrap().push(text.to_string());
    }

    fn broadcast(&self, text: &str) {
        self.broadcasts.lock().unwrap().push(text.to_string());
    }

    fn whisper(&self, user: &str, text: &str) {
        self.whispers.lock().unwrap().push((user.to_string(), text.to_string()));
    }

    fn volume(&self) -> u8 {
        self.volume.load(Ordering::SeqCst)
    }

    fn set_volume(&self, volume: u8) {
        self.volume.store(volume, Ordering::SeqCst);
    }
}

/// Engine wired to fresh recording fakes
pub struct Harness {
    pub engine: PlaybackEngine,
    pub backend: Arc<RecordingBackend>,
    pub chat: Arc<RecordingChat>,
    pub events: EventBus,
}

impl Harness {
    pub fn new() -> Self {
        let backend = RecordingBackend::new();
        let chat = RecordingChat::new();
        let events = EventBus::new(64);
        let engine = PlaybackEngine::new(backend.clone(), chat.clone(), events.clone());
        Self {
            engine,
            backend,
            chat,
            events,
        }
    }

    pub fn shared(self) -> (SharedEngine, Arc<RecordingBackend>, Arc<RecordingChat>) {
        (self.engine.into_shared(), self.backend, self.chat)
    }
}

/// Resolves known queries to fresh collections of a fixed size
#[derive(Default)]
pub struct StaticResolver {
    known: HashMap<String, usize>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `query` to a collection described as `query` with `tracks` tracks
    pub fn with(mut self, query: &str, tracks: usize) -> Self {
        self.known.insert(query.to_string(), tracks);
        self
    }
}

#[async_trait]
impl Resolver for StaticResolver {
    async fn resolve(&self, query: &str) -> jukebox_bot::Result<Option<Collection>> {
        Ok(self.known.get(query).map(|&tracks| album(query, tracks)))
    }
}

/// Resolver that never answers within any reasonable limit
pub struct SlowResolver(pub Duration);

#[async_trait]
impl Resolver for SlowResolver {
    async fn resolve(&self, query: &str) -> jukebox_bot::Result<Option<Collection>> {
        tokio::time::sleep(self.0).await;
        Ok(Some(album(query, 1)))
    }
}
