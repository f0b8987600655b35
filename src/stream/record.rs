use serde_json::Value;

pub const DONE_SENTINEL: &str = "[DONE]";

/// What a framed line is, before its payload is looked at.
#[derive(Debug, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// Empty line: record boundary.
    Blank,
    /// Leading `:`; keep-alive or comment.
    Comment,
    /// Payload after `data:` and one optional space.
    Data(&'a str),
    /// Anything else.
    Other(&'a str),
}

pub fn classify(line: &str) -> LineKind<'_> {
    if line.trim().is_empty() {
        LineKind::Blank
    } else if line.starts_with(':') {
        LineKind::Comment
    } else if let Some(payload) = line.strip_prefix("data:") {
        LineKind::Data(payload.strip_prefix(' ').unwrap_or(payload))
    } else {
        LineKind::Other(line)
    }
}

/// A decoded `data:` payload.
#[derive(Debug, PartialEq, Eq)]
pub enum Record {
    Done,
    Delta(String),
    /// Valid JSON without text content (role announcements, finish reasons).
    Empty,
}

pub fn decode(payload: &str) -> Result<Record, serde_json::Error> {
    let payload = payload.trim();
    if payload == DONE_SENTINEL {
        return Ok(Record::Done);
    }

    let json: Value = serde_json::from_str(payload)?;
    match json["choices"][0]["delta"]["content"].as_str() {
        Some(text) if !text.is_empty() => Ok(Record::Delta(text.to_string())),
        _ => Ok(Record::Empty),
    }
}

/// Encode one delta the way OpenAI-compatible servers stream it.
pub fn encode_delta(text: &str) -> String {
    format!(
        "data: {}\n\n",
        serde_json::json!({ "choices": [{ "delta": { "content": text } }] })
    )
}

pub fn encode_done() -> String {
    format!("data: {}\n\n", DONE_SENTINEL)
}
