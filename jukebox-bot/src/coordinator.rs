//! Event coordinator
//!
//! Bridges the asynchronous sources into the engine:
//! - backend events ([`BackendEvent`]) arriving on an mpsc channel, handled
//!   one at a time under the engine lock
//! - a periodic poll letting the backend process session/network work
//! - a one-shot startup check that the idle comment has been set
//!
//! Everything stops when the shutdown token is cancelled (disconnect).

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::backend::{BackendEvent, PlaybackBackend};
use crate::error::{Error, Result};
use crate::playback::SharedEngine;

/// Owns the backend event receiver and the background tasks
pub struct EventCoordinator {
    engine: SharedEngine,
    backend: Arc<dyn PlaybackBackend>,
    events: mpsc::UnboundedReceiver<BackendEvent>,
    poll_interval: Duration,
    comment_check_delay: Duration,
    shutdown: CancellationToken,
}

impl EventCoordinator {
    pub fn new(
        engine: SharedEngine,
        backend: Arc<dyn PlaybackBackend>,
        events: mpsc::UnboundedReceiver<BackendEvent>,
        poll_interval: Duration,
        comment_check_delay: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            engine,
            backend,
            events,
            poll_interval,
            comment_check_delay,
            shutdown,
        }
    }

    /// Token that disconnects the coordinator when cancelled
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Run until disconnect or a fatal backend event
    ///
    /// Returns `Err(BackendFatal)` on a streaming error. In every case the
    /// poll loop is stopped and the backend session is logged out before
    /// returning.
    pub async fn run(mut self) -> Result<()> {
        info!(
            "Event coordinator started (poll every {:?}, comment check after {:?})",
            self.poll_interval, self.comment_check_delay
        );

        let poll = tokio::spawn(poll_loop(
            Arc::clone(&self.backend),
            self.poll_interval,
            self.shutdown.clone(),
        ));
        let check = tokio::spawn(comment_check(
            Arc::clone(&self.engine),
            self.comment_check_delay,
            self.shutdown.clone(),
        ));

        let result = self.event_loop().await;

        self.shutdown.cancel();
        let _ = poll.await;
        let _ = check.await;
        self.backend.logout();

        match &result {
            Ok(()) => info!("Event coordinator stopped"),
            Err(e) => error!("Event coordinator stopped: {}", e),
        }
        result
    }

    async fn event_loop(&mut self) -> Result<()> {
        loop {
            let event = tokio::select! {
                _ = self.shutdown.cancelled() => return Ok(()),
                event = self.events.recv() => event,
            };

            match event {
                Some(event) => handle_event(&self.engine, event).await?,
                None => {
                    return Err(Error::BackendFatal("backend event channel closed".to_string()));
                }
            }
        }
    }
}

/// Apply one backend event to the engine
///
/// Only [`BackendEvent::StreamingError`] produces an error, and it is always
/// fatal.
pub async fn handle_event(engine: &SharedEngine, event: BackendEvent) -> Result<()> {
    debug!("Backend event: {:?}", event);
    match event {
        BackendEvent::EndOfTrack => {
            engine.lock().await.advance();
            Ok(())
        }
        BackendEvent::StreamingError(message) => Err(Error::BackendFatal(format!(
            "streaming error: {}",
            message
        ))),
        BackendEvent::PlayTokenLost => {
            engine.lock().await.play_token_lost();
            Ok(())
        }
    }
}

/// Periodically let the backend process pending work until cancelled
pub async fn poll_loop(backend: Arc<dyn PlaybackBackend>, every: Duration, shutdown: CancellationToken) {
    let mut interval = time::interval(every);
    interval.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = interval.tick() => {
                if !backend.is_disconnected() {
                    backend.process_events();
                }
            }
        }
    }

    debug!("Backend poll loop stopped");
}

/// After `delay`, make sure a stopped engine shows the idle comment
pub async fn comment_check(engine: SharedEngine, delay: Duration, shutdown: CancellationToken) {
    tokio::select! {
        _ = shutdown.cancelled() => {}
        _ = time::sleep(delay) => {
            if engine.lock().await.ensure_idle_comment() {
                debug!("Startup comment check set the idle comment");
            }
        }
    }
}
