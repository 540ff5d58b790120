// Message formatting - pure functions from structured events to display lines
//
// Every line shown in the transcript goes through one of these. The contract
// is textual only: a "HH:MM" wall-clock timestamp followed by the message
// body. Colors and styling are applied later by the rendering layer, which
// classifies lines by their leading glyph (see tui::views).

use chrono::Local;

/// Current wall-clock time as "HH:MM"
fn timestamp() -> String {
    Local::now().format("%H:%M").to_string()
}

fn stamped(body: String) -> String {
    format!("{} {}", timestamp(), body)
}

/// A chat line: `<user> text`
pub fn chat(user: &str, text: &str) -> String {
    stamped(format!("<{}> {}", user, text))
}

/// A system/informational message
pub fn system(text: &str) -> String {
    stamped(text.to_string())
}

/// `→ user joined #channel`
pub fn join(user: &str, channel: &str) -> String {
    stamped(format!("→ {} joined {}", user, channel))
}

/// `← user left #channel (reason)`
pub fn part(user: &str, channel: &str, reason: Option<&str>) -> String {
    match reason {
        Some(r) if !r.is_empty() => stamped(format!("← {} left {} ({})", user, channel, r)),
        _ => stamped(format!("← {} left {}", user, channel)),
    }
}

/// `⇐ user quit (reason)`
pub fn quit(user: &str, reason: Option<&str>) -> String {
    match reason {
        Some(r) if !r.is_empty() => stamped(format!("⇐ {} quit ({})", user, r)),
        _ => stamped(format!("⇐ {} quit", user)),
    }
}

/// `[from] text`
pub fn notice(from: &str, text: &str) -> String {
    stamped(format!("[{}] {}", from, text))
}

/// `⚠ text`
pub fn error(text: &str) -> String {
    stamped(format!("⚠ {}", text))
}

/// Channel navigation notices (`• Now viewing #x`, `→ Switched to #x (2/3)`)
pub fn channel_switch(text: &str) -> String {
    stamped(text.to_string())
}
