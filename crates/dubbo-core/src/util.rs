//! Small helpers shared across modules.

use crate::config::LogConfig;

/// Shorten a payload for log output.
pub fn truncate(content: &str) -> String {
    let max = LogConfig::MAX_PAYLOAD_CHARS;
    match content.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &content[..idx]),
        None => content.to_string(),
    }
}
