//! Text helpers for Telegram's legacy Markdown parse mode.

/// Marker appended to truncated text.
pub const ELLIPSIS: &str = "...";

/// Maximum length of a Telegram text message, in characters.
pub const TELEGRAM_MESSAGE_LIMIT: usize = 4096;

/// Length of body excerpts embedded in notifications.
pub const EXCERPT_LENGTH: usize = 200;

/// Shorten `text` to at most `max_length` characters.
///
/// Text that already fits is returned unchanged. Longer text keeps its first
/// `max_length - 3` characters followed by `...`, so the result is exactly
/// `max_length` characters. Lengths are counted in `char`s.
pub fn truncate_text(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        return text.to_string();
    }

    let keep = max_length.saturating_sub(ELLIPSIS.len());
    let marker_len = max_length - keep;

    let mut truncated: String = text.chars().take(keep).collect();
    truncated.push_str(&ELLIPSIS[..marker_len]);
    truncated
}

/// Escape user-supplied text for legacy Markdown.
///
/// Only `_`, `*`, `` ` `` and `[` are significant in this mode.
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Text inside an inline code span cannot be escaped, so backticks are
/// replaced instead.
pub fn code_span_safe(text: &str) -> String {
    text.replace('`', "'")
}

/// Text inside a `*bold*` entity. Escapes are not recognised inside
/// entities, so an asterisk that would close the entity early is replaced.
pub fn bold_safe(text: &str) -> String {
    text.replace('*', "∗")
}

/// Text inside `[link text]`. Brackets become parentheses so the entity ends
/// where the link does.
pub fn link_text_safe(text: &str) -> String {
    text.replace('[', "(").replace(']', ")")
}

/// First line of `text`, without the line terminator.
pub fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("")
}

/// Truncate a body excerpt and escape it for embedding in a message.
pub fn excerpt(text: &str) -> String {
    escape_markdown(&truncate_text(text.trim(), EXCERPT_LENGTH))
}

#[cfg(test)]
#[path = "markdown_tests.rs"]
mod tests;
