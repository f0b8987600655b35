/// Incremental line framing over raw bytes.
///
/// Bytes are kept undecoded until a full line is available, so a UTF-8
/// sequence split across two network reads decodes as one character.
#[derive(Debug, Default)]
pub struct LineFramer {
    tail: Vec<u8>,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) {
        self.tail.extend_from_slice(chunk);
    }

    /// Next newline-terminated line, without the terminator (`\n` or `\r\n`).
    /// An unterminated remainder stays buffered.
    pub fn next_line(&mut self) -> Option<String> {
        let pos = self.tail.iter().position(|b| *b == b'\n')?;
        let mut line: Vec<u8> = self.tail.drain(..=pos).collect();
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Some(String::from_utf8_lossy(&line).into_owned())
    }

    /// Remainder without a trailing newline; only meaningful once the
    /// input has ended.
    pub fn take_tail(&mut self) -> Option<String> {
        if self.tail.is_empty() {
            return None;
        }
        let mut line = std::mem::take(&mut self.tail);
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Some(String::from_utf8_lossy(&line).into_owned())
    }
}
