/// Telegram rejects messages over 4096 UTF-16 code units.
pub const MAX_MESSAGE_LEN: usize = 4000;

/// Length as Telegram counts it: UTF-16 code units.
pub fn message_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Split `text` into chunks of at most `max_len` UTF-16 code units.
///
/// A chunk ends at the last newline within the limit unless that newline sits
/// in the first half of the window, in which case the text is cut at the
/// limit. A character is never split. Leading whitespace of each following
/// chunk is dropped.
pub fn split_message(text: &str, max_len: usize) -> Vec<String> {
    let max_len = max_len.max(2);
    if message_len(text) <= max_len {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut remaining = text;

    while !remaining.is_empty() {
        if message_len(remaining) <= max_len {
            chunks.push(remaining.to_string());
            break;
        }

        let hard_cut = byte_offset(remaining, max_len);
        // a newline exactly at the limit still counts
        let window = &remaining[..byte_offset(remaining, max_len + 1)];

        let split_at = match window.rfind('\n') {
            Some(idx) if message_len(&remaining[..idx]) * 2 >= max_len => idx,
            _ => hard_cut,
        };

        chunks.push(remaining[..split_at].to_string());
        remaining = remaining[split_at..].trim_start();
    }

    chunks
}

/// Byte index of the longest prefix that fits in `units` UTF-16 code units.
fn byte_offset(text: &str, units: usize) -> usize {
    let mut used = 0;
    for (idx, c) in text.char_indices() {
        used += c.len_utf16();
        if used > units {
            return idx;
        }
    }
    text.len()
}
