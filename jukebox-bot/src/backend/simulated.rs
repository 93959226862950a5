//! Timer-driven stand-in for a streaming backend
//!
//! "Plays" a track by remembering when it would end. Each
//! [`PlaybackBackend::process_events`] call checks the deadline and raises
//! [`BackendEvent::EndOfTrack`] once it has passed, the same way a real
//! session library delivers callbacks from its event-processing step.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use jukebox_common::Track;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::{BackendEvent, BackendStatus, PlaybackBackend};

struct SimulatedState {
    status: BackendStatus,
    track: Option<Track>,
    /// When the current track ends (only while playing)
    deadline: Option<Instant>,
    /// Time left on the current track (only while paused)
    remaining: Duration,
}

/// In-process backend with simulated track timing
pub struct SimulatedBackend {
    events: mpsc::UnboundedSender<BackendEvent>,
    state: Mutex<SimulatedState>,
    disconnected: AtomicBool,
    /// Length used for tracks with unknown duration
    fallback_duration: Duration,
}

impl SimulatedBackend {
    pub fn new(events: mpsc::UnboundedSender<BackendEvent>, fallback_duration: Duration) -> Self {
        Self {
            events,
            state: Mutex::new(SimulatedState {
                status: BackendStatus::Stopped,
                track: None,
                deadline: None,
                remaining: Duration::ZERO,
            }),
            disconnected: AtomicBool::new(false),
            fallback_duration,
        }
    }

    /// Track currently loaded, if any
    pub fn loaded_track(&self) -> Option<Track> {
        self.lock().track.clone()
    }

    /// Behave as if the account started playing on another device
    pub fn lose_play_token(&self) {
        self.pause();
        self.send(BackendEvent::PlayTokenLost);
    }

    /// Behave as if the stream broke
    pub fn fail_streaming(&self, message: impl Into<String>) {
        self.send(BackendEvent::StreamingError(message.into()));
    }

    fn lock(&self) -> MutexGuard<'_, SimulatedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn send(&self, event: BackendEvent) {
        if self.events.send(event).is_err() {
            warn!("Backend event dropped: nobody is listening");
        }
    }

    fn duration_of(&self, track: &Track) -> Duration {
        match track.duration_ms() {
            0 => self.fallback_duration,
            ms => Duration::from_millis(ms),
        }
    }
}

impl PlaybackBackend for SimulatedBackend {
    fn play_track(&self, track: &Track) {
        let duration = self.duration_of(track);
        let mut state = self.lock();
        state.track = Some(track.clone());
        state.deadline = Some(Instant::now() + duration);
        state.remaining = Duration::ZERO;
        state.status = BackendStatus::Playing;
        debug!("Backend playing {} for {:?}", track, duration);
    }

    fn pause(&self) {
        let mut state = self.lock();
        if state.status != BackendStatus::Playing {
            return;
        }
        state.remaining = state
            .deadline
            .take()
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
            .unwrap_or_default();
        state.status = BackendStatus::Paused;
    }

    fn resume(&self) {
        let mut state = self.lock();
        if state.status != BackendStatus::Paused {
            return;
        }
        state.deadline = Some(Instant::now() + state.remaining);
        state.status = BackendStatus::Playing;
    }

    fn stop(&self) {
        let mut state = self.lock();
        state.status = BackendStatus::Stopped;
        state.track = None;
        state.deadline = None;
        state.remaining = Duration::ZERO;
    }

    fn status(&self) -> BackendStatus {
        self.lock().status
    }

    fn process_events(&self) {
        if self.is_disconnected() {
            return;
        }

        let finished = {
            let mut state = self.lock();
            match state.deadline {
                Some(deadline) if state.status == BackendStatus::Playing && deadline <= Instant::now() => {
                    state.deadline = None;
                    state.status = BackendStatus::Stopped;
                    true
                }
                _ => false,
            }
        };

        if finished {
            self.send(BackendEvent::EndOfTrack);
        }
    }

    fn is_disconnected(&self) -> bool {
        self.disconnected.load(Ordering::Acquire)
    }

    fn logout(&self) {
        if !self.disconnected.swap(true, Ordering::AcqRel) {
            self.stop();
            info!("Backend session logged out");
        }
    }
}
