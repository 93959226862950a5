//! Chat command surface
//!
//! Parsing turns raw chat text into a [`Command`]; the
//! [`CommandDispatcher`] executes it against the engine.
//!
//! Matching is case-insensitive. `play`, `queue` and `volume` match as
//! prefixes of the first word; the other verbs must be the whole message.

mod dispatcher;

pub use dispatcher::{CommandDispatcher, Reply};

/// Parsed chat command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `play <query> [now]`
    Play { query: String, now: bool },
    /// bare `play` or `unpause`
    Unpause,
    /// `queue <query>` (empty query when no argument was given)
    Queue { query: String },
    Pause,
    Next,
    Clear,
    Undo,
    /// `what`: show the queue
    What,
    /// `volume`, `volume?` or `volume <n>`
    Volume { argument: Option<String> },
    Help,
    /// Anything else, carrying the cleaned text
    Unknown(String),
}

/// Remove the paragraph markup some chat clients wrap messages in
pub fn clean_text(text: &str) -> String {
    text.replace("<p>", "").replace("</p>", "").trim().to_string()
}

fn starts_with_ci(word: &str, prefix: &str) -> bool {
    word.len() >= prefix.len() && word.is_char_boundary(prefix.len()) && word[..prefix.len()].eq_ignore_ascii_case(prefix)
}

impl Command {
    /// Parse a chat message
    pub fn parse(text: &str) -> Command {
        let text = clean_text(text);
        let words: Vec<&str> = text.split_whitespace().collect();
        let Some(first) = words.first().copied() else {
            return Command::Unknown(text);
        };
        let argument = words[1..].join(" ");

        if starts_with_ci(first, "play") {
            if argument.is_empty() {
                return Command::Unpause;
            }
            // Trailing `now` jumps the queue, as long as something precedes it
            let now = words.len() > 2 && words[words.len() - 1].eq_ignore_ascii_case("now");
            let query = if now {
                words[1..words.len() - 1].join(" ")
            } else {
                argument
            };
            return Command::Play { query, now };
        }

        if starts_with_ci(first, "queue") {
            return Command::Queue { query: argument };
        }

        if words.len() == 1 {
            let verb = first.to_lowercase();
            match verb.as_str() {
                "pause" => return Command::Pause,
                "unpause" => return Command::Unpause,
                "next" => return Command::Next,
                "clear" => return Command::Clear,
                "undo" => return Command::Undo,
                "what" => return Command::What,
                "help" => return Command::Help,
                "volume?" => return Command::Volume { argument: None },
                _ => {}
            }
        }

        if starts_with_ci(first, "volume") {
            return Command::Volume {
                argument: (!argument.is_empty()).then_some(argument),
            };
        }

        Command::Unknown(text)
    }
}
