//! Line framing for server-sent event streams.
//!
//! Network chunks can end anywhere, including inside a multi-byte UTF-8
//! character. Bytes are buffered raw and only complete lines are decoded;
//! `\n` never occurs inside a multi-byte sequence, so a complete line is
//! always whole text.

#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);
    }

    /// Takes the next complete line, trimmed, without its terminator.
    pub fn next_line(&mut self) -> Option<String> {
        let pos = self.pending.iter().position(|b| *b == b'\n')?;
        let line: Vec<u8> = self.pending.drain(..=pos).collect();
        Some(String::from_utf8_lossy(&line).trim().to_string())
    }
}
