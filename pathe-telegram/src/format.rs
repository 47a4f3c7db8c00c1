//! Response formatter: agent markdown to MarkdownV2 segments, and their delivery.

use pathe_core::{Bot, Chat, Message, Result};
use tracing::{debug, warn};

use crate::markdown::to_markdown_v2;

/// Telegram's message length limit.
pub const MAX_MESSAGE_LENGTH: usize = 4096;

/// Sent instead of an empty answer.
pub const NO_RESPONSE: &str = "No response";

/// Splits `text` into pieces of at most `max_chars` characters, cutting at exact boundaries.
pub fn split_segments(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(max_chars)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// Formats agent output for Telegram: MarkdownV2 conversion, placeholder for empty output, then
/// length-limited segments.
pub fn format_response(text: &str) -> Vec<String> {
    let formatted = to_markdown_v2(text);
    if formatted.trim().is_empty() {
        return vec![NO_RESPONSE.to_string()];
    }
    split_segments(&formatted, MAX_MESSAGE_LENGTH)
}

/// Sends `text` as formatted segments, in order. Each segment replies to `origin` when given; a
/// segment whose threaded send fails is retried once without the reply reference.
///
/// Returns the ids of the sent messages.
pub async fn send_segments(
    bot: &dyn Bot,
    chat: &Chat,
    origin: Option<&Message>,
    text: &str,
) -> Result<Vec<String>> {
    let segments = format_response(text);
    let reply_to = origin.map(|m| m.id.as_str());
    let mut sent = Vec::with_capacity(segments.len());

    for (index, segment) in segments.iter().enumerate() {
        let id = match bot.send_markup(chat, segment, reply_to).await {
            Ok(id) => id,
            Err(e) if reply_to.is_some() => {
                warn!(
                    error = %e,
                    chat_id = chat.id,
                    segment = index,
                    "Threaded send failed, sending without reply reference"
                );
                bot.send_markup(chat, segment, None).await?
            }
            Err(e) => return Err(e),
        };
        sent.push(id);
    }

    debug!(chat_id = chat.id, segments = sent.len(), "Response delivered");
    Ok(sent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_exactly_at_limit_is_one_segment() {
        let text = "a".repeat(MAX_MESSAGE_LENGTH);
        let segments = split_segments(&text, MAX_MESSAGE_LENGTH);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].chars().count(), MAX_MESSAGE_LENGTH);
    }

    #[test]
    fn test_split_one_over_limit_is_two_segments() {
        let text = "a".repeat(MAX_MESSAGE_LENGTH + 1);
        let segments = split_segments(&text, MAX_MESSAGE_LENGTH);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].chars().count(), MAX_MESSAGE_LENGTH);
        assert_eq!(segments[1], "a");
    }

    #[test]
    fn test_split_counts_characters_not_bytes() {
        let segments = split_segments("ँँँ", 2);
        assert_eq!(segments, vec!["ँँ", "ँ"]);
    }

    #[test]
    fn test_format_empty_is_placeholder() {
        assert_eq!(format_response(""), vec![NO_RESPONSE.to_string()]);
        assert_eq!(format_response(" \n\t"), vec![NO_RESPONSE.to_string()]);
    }

    #[test]
    fn test_format_escapes_before_splitting() {
        assert_eq!(format_response("Done."), vec![r"Done\.".to_string()]);
    }
}
