//! Audio backend boundary
//!
//! The backend decodes and outputs audio on its own execution context. The
//! engine only instructs it; completion and failure come back as
//! [`BackendEvent`] messages on the channel handed to the backend at
//! construction.

mod simulated;

pub use simulated::SimulatedBackend;

use jukebox_common::Track;

/// What the backend reports it is doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendStatus {
    Playing,
    Paused,
    Stopped,
}

/// Notifications raised by the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendEvent {
    /// Current track finished playing
    EndOfTrack,

    /// Streaming failed; the session cannot continue
    StreamingError(String),

    /// The account started playing elsewhere; the backend paused itself
    PlayTokenLost,
}

/// Playback backend contract
///
/// Methods are called while the engine lock is held, so implementations must
/// not block: they hand the instruction to the backend's own context and
/// return.
pub trait PlaybackBackend: Send + Sync {
    /// Start playing `track`, replacing whatever was playing
    fn play_track(&self, track: &Track);

    fn pause(&self);

    fn resume(&self);

    fn stop(&self);

    fn status(&self) -> BackendStatus;

    /// Let the backend process pending session/network work
    ///
    /// Called periodically by the coordinator's poll loop, outside the
    /// engine lock.
    fn process_events(&self);

    fn is_disconnected(&self) -> bool;

    /// End the session
    fn logout(&self);
}
