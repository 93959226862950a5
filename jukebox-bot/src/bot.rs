//! Session wiring
//!
//! Builds the engine, coordinator and dispatcher for one chat session and
//! runs them until shutdown, end of chat input or a fatal backend failure.

use std::sync::Arc;

use jukebox_common::config::TomlConfig;
use jukebox_common::{EventBus, JukeboxEvent};
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::backend::{BackendEvent, PlaybackBackend};
use crate::chat::{ChatMessage, ChatSink};
use crate::commands::CommandDispatcher;
use crate::coordinator::EventCoordinator;
use crate::error::{Error, Result};
use crate::playback::PlaybackEngine;
use crate::resolver::Resolver;

/// Collaborators for one session
pub struct Session {
    pub backend: Arc<dyn PlaybackBackend>,
    pub backend_events: mpsc::UnboundedReceiver<BackendEvent>,
    pub chat: Arc<dyn ChatSink>,
    pub incoming: mpsc::Receiver<ChatMessage>,
    pub resolver: Arc<dyn Resolver>,
}

/// Run a session to completion
///
/// Returns `Err` only for fatal backend failures. Cancelling `shutdown` or
/// closing the incoming chat channel ends the session cleanly; either way the
/// coordinator is disconnected and the backend logged out before returning.
pub async fn run(config: &TomlConfig, session: Session, shutdown: CancellationToken) -> Result<()> {
    let Session {
        backend,
        backend_events,
        chat,
        mut incoming,
        resolver,
    } = session;

    let events = EventBus::new(config.event_bus_capacity);
    let event_log = tokio::spawn(log_events(events.subscribe(), shutdown.clone()));

    let engine = PlaybackEngine::new(Arc::clone(&backend), Arc::clone(&chat), events).into_shared();

    let disconnect = shutdown.child_token();
    let coordinator = EventCoordinator::new(
        Arc::clone(&engine),
        backend,
        backend_events,
        config.poll_interval(),
        config.comment_check_delay(),
        disconnect.clone(),
    );
    let mut coordinator_task = tokio::spawn(coordinator.run());

    let dispatcher = Arc::new(CommandDispatcher::new(engine, resolver, chat, config.resolve_timeout()));
    let (fatal_tx, mut fatal_rx) = mpsc::unbounded_channel::<Error>();

    info!("Jukebox session started");

    let outcome = loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                info!("Shutdown requested");
                break Ok(());
            }
            joined = &mut coordinator_task => {
                // Coordinator already logged out; nothing left to disconnect
                let result = flatten(joined);
                event_log.abort();
                return result;
            }
            Some(fatal) = fatal_rx.recv() => {
                error!("Fatal error while handling a command: {}", fatal);
                break Err(fatal);
            }
            message = incoming.recv() => match message {
                Some(message) => {
                    spawn_handler(Arc::clone(&dispatcher), message, fatal_tx.clone());
                }
                None => {
                    info!("Chat input closed");
                    break Ok(());
                }
            }
        }
    };

    disconnect.cancel();
    let coordinator_result = flatten(coordinator_task.await);
    event_log.abort();

    info!("Jukebox session ended");
    outcome.and(coordinator_result)
}

fn spawn_handler(dispatcher: Arc<CommandDispatcher>, message: ChatMessage, fatal: mpsc::UnboundedSender<Error>) {
    tokio::spawn(async move {
        if let Err(e) = dispatcher.handle(&message).await {
            let _ = fatal.send(e);
        }
    });
}

fn flatten(joined: std::result::Result<Result<()>, tokio::task::JoinError>) -> Result<()> {
    joined.map_err(|e| Error::BackendFatal(format!("event coordinator task failed: {}", e)))?
}

/// Trace every engine event until shutdown
async fn log_events(mut rx: broadcast::Receiver<JukeboxEvent>, shutdown: CancellationToken) {
    loop {
        let event = tokio::select! {
            _ = shutdown.cancelled() => break,
            event = rx.recv() => event,
        };
        match event {
            Ok(event) => debug!(event = event.event_type(), "{:?}", event),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("Event log lagged, skipped {} events", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
