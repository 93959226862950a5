//! Whole sessions through bot::run

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use helpers::{RecordingBackend, RecordingChat, SlowResolver, StaticResolver};
use jukebox_bot::backend::BackendEvent;
use jukebox_bot::bot::{self, Session};
use jukebox_bot::chat::ChatMessage;
use jukebox_bot::resolver::Resolver;
use jukebox_bot::Error;
use jukebox_common::config::TomlConfig;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

struct Running {
    backend: Arc<RecordingBackend>,
    chat: Arc<RecordingChat>,
    say: mpsc::Sender<ChatMessage>,
    backend_events: mpsc::UnboundedSender<BackendEvent>,
    shutdown: CancellationToken,
    task: tokio::task::JoinHandle<jukebox_bot::Result<()>>,
}

fn start(resolver: Arc<dyn Resolver>) -> Running {
    let backend = RecordingBackend::new();
    let chat = RecordingChat::new();
    let (say, incoming) = mpsc::channel(8);
    let (backend_events, events_rx) = mpsc::unbounded_channel();
    let shutdown = CancellationToken::new();

    let session = Session {
        backend: backend.clone(),
        backend_events: events_rx,
        chat: chat.clone(),
        incoming,
        resolver,
    };
    let token = shutdown.clone();
    let task = tokio::spawn(async move { bot::run(&TomlConfig::default(), session, token).await });

    Running {
        backend,
        chat,
        say,
        backend_events,
        shutdown,
        task,
    }
}

#[tokio::test(start_paused = true)]
async fn test_session_ends_when_chat_closes() {
    let running = start(Arc::new(StaticResolver::new().with("teardrop", 2)));

    running.say.send(ChatMessage::new("alice", "play teardrop")).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(running.chat.broadcasts(), vec!["alice added teardrop to the queue.".to_string()]);

    running.backend_events.send(BackendEvent::EndOfTrack).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(running.backend.played(), vec!["teardrop:0", "teardrop:1"]);

    drop(running.say);
    running.task.await.unwrap().unwrap();
    assert_eq!(running.backend.logouts(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_session_stops_on_shutdown() {
    let running = start(Arc::new(StaticResolver::new()));

    running.shutdown.cancel();
    running.task.await.unwrap().unwrap();
    assert_eq!(running.backend.logouts(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_streaming_error_ends_session() {
    let running = start(Arc::new(StaticResolver::new()));

    running
        .backend_events
        .send(BackendEvent::StreamingError("stream dropped".into()))
        .unwrap();
    let err = running.task.await.unwrap().unwrap_err();

    assert!(matches!(err, Error::BackendFatal(_)));
    assert_eq!(running.backend.logouts(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_slow_lookup_does_not_block_other_commands() {
    let running = start(Arc::new(SlowResolver(Duration::from_secs(3))));

    running.say.send(ChatMessage::new("alice", "play teardrop")).await.unwrap();
    running.say.send(ChatMessage::new("bob", "what")).await.unwrap();

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(running.chat.last_whisper_to("bob").is_some());
    assert!(running.chat.broadcasts().is_empty());

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(running.chat.broadcasts(), vec!["alice added teardrop to the queue.".to_string()]);

    running.shutdown.cancel();
    running.task.await.unwrap().unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_idle_comment_set_after_startup_delay() {
    let running = start(Arc::new(StaticResolver::new()));

    tokio::time::sleep(TomlConfig::default().comment_check_delay() + Duration::from_millis(100)).await;
    assert_eq!(running.chat.last_comment().as_deref(), Some(jukebox_bot::render::NOTHING_PLAYING));

    running.shutdown.cancel();
    running.task.await.unwrap().unwrap();
}
