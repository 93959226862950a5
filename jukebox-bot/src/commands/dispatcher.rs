//! Command execution
//!
//! Each chat message is handled on its own task, so a slow resolver never
//! holds up other commands or the coordinator. The engine lock is taken only
//! after resolution has finished.

use std::sync::Arc;
use std::time::Duration;

use jukebox_common::PlaybackState;
use tracing::{debug, info, warn};

use super::Command;
use crate::backend::BackendStatus;
use crate::chat::{ChatMessage, ChatSink};
use crate::error::{Error, Result};
use crate::playback::SharedEngine;
use crate::render::{self, escape};
use crate::resolver::{resolve_with_timeout, Resolver};

const NOT_FOUND: &str = "I couldn't find what you wanted me to play. :'(";
const NOTHING_TO_UNDO: &str = "There's nothing to undo.";
const END_OF_QUEUE: &str = "We're at the end of the queue. Try adding something to play!";
const QUEUE_USAGE: &str = "Tell me what to queue: <code>queue &lt;song/album/artist&gt;</code>";

/// Where a reply goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Only to the user who issued the command
    Private(String),
    /// To everyone in the channel
    Channel(String),
}

/// Executes parsed commands against the engine
pub struct CommandDispatcher {
    engine: SharedEngine,
    resolver: Arc<dyn Resolver>,
    chat: Arc<dyn ChatSink>,
    resolve_timeout: Duration,
}

impl CommandDispatcher {
    pub fn new(
        engine: SharedEngine,
        resolver: Arc<dyn Resolver>,
        chat: Arc<dyn ChatSink>,
        resolve_timeout: Duration,
    ) -> Self {
        Self {
            engine,
            resolver,
            chat,
            resolve_timeout,
        }
    }

    /// Handle one chat message and deliver the reply
    ///
    /// Non-fatal errors become private replies. Fatal errors are returned to
    /// the caller without replying.
    pub async fn handle(&self, message: &ChatMessage) -> Result<()> {
        let reply = match self.dispatch(&message.sender, &message.text).await {
            Ok(reply) => reply,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                debug!("Command from {} failed: {}", message.sender, e);
                Reply::Private(error_reply(&e))
            }
        };

        match reply {
            Reply::Private(text) => self.chat.whisper(&message.sender, &text),
            Reply::Channel(text) => self.chat.broadcast(&text),
        }
        Ok(())
    }

    /// Parse and execute `text` on behalf of `sender`
    pub async fn dispatch(&self, sender: &str, text: &str) -> Result<Reply> {
        let command = Command::parse(text);
        info!("{} issued command: {:?}", sender, command);
        self.execute(sender, command).await
    }

    pub async fn execute(&self, sender: &str, command: Command) -> Result<Reply> {
        match command {
            Command::Play { query, now } => self.play(sender, &query, now).await,
            Command::Unpause => self.unpause().await,
            Command::Queue { query } => self.queue(sender, &query).await,
            Command::Pause => self.pause().await,
            Command::Next => self.next(sender).await,
            Command::Clear => {
                self.engine.lock().await.clear();
                Ok(Reply::Channel(format!("{} cleared the queue.", escape(sender))))
            }
            Command::Undo => self.undo(sender).await,
            Command::What => {
                let snapshot = self.engine.lock().await.snapshot();
                Ok(Reply::Private(render::render_queue(&snapshot)))
            }
            Command::Volume { argument } => self.volume(argument.as_deref()),
            Command::Help => Ok(Reply::Private(render::help_text(None))),
            Command::Unknown(text) => Ok(Reply::Private(render::help_text(Some(&text)))),
        }
    }

    async fn play(&self, sender: &str, query: &str, now: bool) -> Result<Reply> {
        let collection = resolve_with_timeout(self.resolver.as_ref(), query, self.resolve_timeout)
            .await?
            .with_user(sender);
        let description = escape(collection.description());

        self.engine.lock().await.add(collection, now, false);

        let text = if now {
            format!("{} is playing {} RIGHT NOW.", escape(sender), description)
        } else {
            format!("{} added {} to the queue.", escape(sender), description)
        };
        Ok(Reply::Channel(text))
    }

    async fn queue(&self, sender: &str, query: &str) -> Result<Reply> {
        if query.is_empty() {
            return Ok(Reply::Private(QUEUE_USAGE.to_string()));
        }
        let collection = resolve_with_timeout(self.resolver.as_ref(), query, self.resolve_timeout)
            .await?
            .with_user(sender);
        let description = escape(collection.description());

        // Never starts playback, even on an idle engine
        self.engine.lock().await.add(collection, false, true);
        Ok(Reply::Channel(format!("{} added {} to the queue.", escape(sender), description)))
    }

    async fn unpause(&self) -> Result<Reply> {
        let mut engine = self.engine.lock().await;
        if engine.backend_status() == BackendStatus::Paused {
            engine.play();
            Ok(Reply::Private("Unpaused.".to_string()))
        } else {
            Ok(Reply::Private("Not paused.".to_string()))
        }
    }

    async fn pause(&self) -> Result<Reply> {
        let text = match self.engine.lock().await.pause() {
            Some(PlaybackState::Paused) => "Paused.",
            Some(_) => "Unpaused.",
            None => render::NOTHING_PLAYING,
        };
        Ok(Reply::Private(text.to_string()))
    }

    async fn next(&self, sender: &str) -> Result<Reply> {
        let mut engine = self.engine.lock().await;
        if !engine.has_remaining() {
            return Ok(Reply::Private(END_OF_QUEUE.to_string()));
        }

        engine.advance();
        match engine.current_track() {
            Some(track) => Ok(Reply::Channel(format!(
                "{} skipped to {} - {}",
                escape(sender),
                escape(track.artist()),
                escape(track.name())
            ))),
            None => Ok(Reply::Private(END_OF_QUEUE.to_string())),
        }
    }

    async fn undo(&self, sender: &str) -> Result<Reply> {
        let record = self.engine.lock().await.undo()?;
        let text = if record.user == sender {
            format!("{} removed {}.", escape(sender), escape(&record.description))
        } else {
            format!(
                "{} removed {} that {} added.",
                escape(sender),
                escape(&record.description),
                escape(&record.user)
            )
        };
        Ok(Reply::Channel(text))
    }

    fn volume(&self, argument: Option<&str>) -> Result<Reply> {
        let Some(argument) = argument else {
            return Ok(Reply::Private(format!("The volume is {}.", self.chat.volume())));
        };

        let requested: i64 = argument.trim().parse().map_err(|_| {
            Error::InvalidArgument(format!("'{}' is not a volume. Use a number from 0 to 100.", escape(argument)))
        })?;
        let volume = requested.clamp(0, 100) as u8;
        if i64::from(volume) != requested {
            warn!("Requested volume {} clamped to {}", requested, volume);
        }

        self.chat.set_volume(volume);
        Ok(Reply::Private(format!("Now the volume is {}.", self.chat.volume())))
    }
}

/// Private reply text for a non-fatal command error
pub fn error_reply(error: &Error) -> String {
    match error {
        Error::NotFound(_) => NOT_FOUND.to_string(),
        Error::EmptyHistory => NOTHING_TO_UNDO.to_string(),
        Error::ResolutionTimeout(limit) => format!(
            "Looking that up took longer than {}s. Try again?",
            limit.as_secs_f32()
        ),
        Error::InvalidArgument(message) => message.clone(),
        other => format!("Woah, an error occurred: {}", other),
    }
}
