//! Console chat transport
//!
//! Reads `user: text` lines from stdin and prints replies, broadcasts and
//! comment updates to stdout. Useful for running the bot locally without a
//! voice-chat server.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{ChatMessage, ChatSink};

/// Sender name used when a console line has no `user:` prefix
const CONSOLE_USER: &str = "console";

#[derive(Debug)]
enum Outbound {
    Comment(String),
    Channel(String),
    Private { user: String, text: String },
}

/// Chat sink/source bound to the process console
pub struct ConsoleChat {
    outbound: mpsc::UnboundedSender<Outbound>,
    volume: AtomicU8,
}

impl ConsoleChat {
    /// Spawn the stdin reader and stdout writer tasks
    ///
    /// The returned receiver yields one [`ChatMessage`] per non-empty input
    /// line and closes at end of input or when `shutdown` is cancelled.
    pub fn start(initial_volume: u8, shutdown: CancellationToken) -> (Arc<Self>, mpsc::Receiver<ChatMessage>) {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (incoming_tx, incoming_rx) = mpsc::channel(32);

        tokio::spawn(write_outbound(outbound_rx));
        tokio::spawn(read_incoming(incoming_tx, shutdown));

        let chat = Arc::new(Self {
            outbound: outbound_tx,
            volume: AtomicU8::new(initial_volume.min(100)),
        });
        (chat, incoming_rx)
    }

    fn send(&self, message: Outbound) {
        if self.outbound.send(message).is_err() {
            warn!("Console writer has stopped; dropping outbound message");
        }
    }
}

impl ChatSink for ConsoleChat {
    fn set_comment(&self, text: &str) {
        self.send(Outbound::Comment(text.to_string()));
    }

    fn broadcast(&self, text: &str) {
        self.send(Outbound::Channel(text.to_string()));
    }

    fn whisper(&self, user: &str, text: &str) {
        self.send(Outbound::Private {
            user: user.to_string(),
            text: text.to_string(),
        });
    }

    fn volume(&self) -> u8 {
        self.volume.load(Ordering::Relaxed)
    }

    fn set_volume(&self, volume: u8) {
        self.volume.store(volume.min(100), Ordering::Relaxed);
        info!("Console volume set to {}", volume.min(100));
    }
}

/// Split a console line into sender and text
///
/// `alice: play teardrop` is sent by `alice`; a line without a prefix is sent
/// by the console user. Blank lines yield nothing.
pub fn parse_console_line(line: &str) -> Option<ChatMessage> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    match line.split_once(':') {
        Some((user, text)) if !user.trim().is_empty() && !user.contains(char::is_whitespace) => {
            let text = text.trim();
            (!text.is_empty()).then(|| ChatMessage::new(user.trim(), text))
        }
        _ => Some(ChatMessage::new(CONSOLE_USER, line)),
    }
}

async fn read_incoming(incoming: mpsc::Sender<ChatMessage>, shutdown: CancellationToken) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            _ = shutdown.cancelled() => break,
            line = lines.next_line() => line,
        };

        match line {
            Ok(Some(line)) => {
                let Some(message) = parse_console_line(&line) else {
                    continue;
                };
                if incoming.send(message).await.is_err() {
                    break;
                }
            }
            Ok(None) => {
                info!("Console input closed");
                break;
            }
            Err(e) => {
                warn!("Failed to read console input: {}", e);
                break;
            }
        }
    }

    debug!("Console reader stopped");
}

async fn write_outbound(mut outbound: mpsc::UnboundedReceiver<Outbound>) {
    let mut stdout = tokio::io::stdout();

    while let Some(message) = outbound.recv().await {
        let line = match message {
            Outbound::Comment(text) => format!("[comment] {}\n", text),
            Outbound::Channel(text) => format!("[channel] {}\n", text),
            Outbound::Private { user, text } => format!("[to {}] {}\n", user, text),
        };

        if let Err(e) = stdout.write_all(line.as_bytes()).await {
            warn!("Failed to write console output: {}", e);
            break;
        }
        let _ = stdout.flush().await;
    }
}
