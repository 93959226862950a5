//! User-facing text
//!
//! Chat clients render messages as HTML, so user-supplied text is escaped.

use crate::playback::QueueSnapshot;

/// Comment shown while nothing plays
pub const NOTHING_PLAYING: &str = "Nothing is playing. :c";

/// Broadcast after the backend account was taken over elsewhere
pub const PLAY_TOKEN_LOST: &str = "The jukebox was just paused because its music account is being used \
elsewhere. Type <code>unpause</code> to regain control and keep playing.";

const COMMANDS: &[(&str, &str)] = &[
    ("play &lt;song/album/artist&gt; [now]", "add to the queue, or play right now"),
    ("play / unpause", "resume playback"),
    ("queue &lt;song/album/artist&gt;", "add without starting playback"),
    ("pause", "pause or resume"),
    ("next", "skip to the next track"),
    ("undo", "remove the last thing added"),
    ("clear", "empty the queue"),
    ("what", "show the queue"),
    ("volume [0-100]", "show or set the volume"),
    ("help", "show this message"),
];

/// Escape text for an HTML chat message
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Render the queue, marking the playing track
pub fn render_queue(snapshot: &QueueSnapshot) -> String {
    if snapshot.is_empty() {
        return "<b>Queue</b><br/>The queue is empty.".to_string();
    }

    let mut out = format!("<b>Queue</b> ({})<br/>", snapshot.state);
    for collection in &snapshot.collections {
        out.push_str(&format!(
            "<b>{}</b> <i>added by {}</i><br/>",
            escape(&collection.description),
            escape(&collection.user)
        ));
        for track in &collection.tracks {
            let marker = if track.playing { "&#9654; " } else { "&nbsp;&nbsp;&nbsp;" };
            out.push_str(&format!(
                "{}{} - {}<br/>",
                marker,
                escape(&track.artist),
                escape(&track.name)
            ));
        }
    }
    out
}

/// Command reference, optionally prefixed by an unknown-command notice
pub fn help_text(unknown: Option<&str>) -> String {
    let mut out = String::new();
    if let Some(command) = unknown {
        out.push_str(&format!("I don't know what <i>{}</i> means.<br/>", escape(command)));
    }
    out.push_str("<b>Commands</b><br/>");
    for (usage, description) in COMMANDS {
        out.push_str(&format!("<code>{}</code>: {}<br/>", usage, description));
    }
    out
}
