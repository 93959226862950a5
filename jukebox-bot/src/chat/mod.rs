//! Chat transport boundary
//!
//! The engine publishes "now playing / queue" state through the channel
//! comment and announcements through channel-wide broadcasts. Replies to a
//! single user go through [`ChatSink::whisper`].

mod console;

pub use console::{parse_console_line, ConsoleChat};

/// A text message received from the channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Display name of the sender
    pub sender: String,
    pub text: String,
}

impl ChatMessage {
    pub fn new(sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            text: text.into(),
        }
    }
}

/// Outbound side of the chat transport
///
/// All methods are fire-and-forget and must not block; the engine calls
/// `set_comment` and `broadcast` while holding its lock.
pub trait ChatSink: Send + Sync {
    /// Replace the bot's comment (last write wins)
    fn set_comment(&self, text: &str);

    /// Best-effort notice to everyone in the channel
    fn broadcast(&self, text: &str);

    /// Private reply to one user
    fn whisper(&self, user: &str, text: &str);

    /// Current output volume (0-100)
    fn volume(&self) -> u8;

    fn set_volume(&self, volume: u8);
}
