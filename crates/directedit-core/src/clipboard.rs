//! Clipboard abstraction.

use thiserror::Error;

/// Clipboard errors.
#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("Clipboard unavailable: {0}")]
    Unavailable(String),
    #[error("Clipboard write failed: {0}")]
    Write(String),
}

/// A text clipboard. The only fallible operation is a write.
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;

    /// Writes settle after `write_text` returns. Callers hand the text to
    /// the host and report the outcome once the write settles.
    fn is_async(&self) -> bool {
        false
    }
}

/// Clipboard that records writes in memory.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    writes: Vec<String>,
    fail: bool,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// A clipboard whose writes always fail.
    pub fn failing() -> Self {
        Self {
            writes: Vec::new(),
            fail: true,
        }
    }

    /// The most recent successful write.
    pub fn contents(&self) -> Option<&str> {
        self.writes.last().map(String::as_str)
    }

    /// Number of successful writes.
    pub fn write_count(&self) -> usize {
        self.writes.len()
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        if self.fail {
            return Err(ClipboardError::Write("permission denied".to_string()));
        }
        self.writes.push(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_clipboard() {
        let mut clipboard = MemoryClipboard::new();
        assert!(clipboard.contents().is_none());
        clipboard.write_text("pt-6").unwrap();
        clipboard.write_text("rounded-full").unwrap();
        assert_eq!(clipboard.contents(), Some("rounded-full"));
        assert_eq!(clipboard.write_count(), 2);
    }

    #[test]
    fn test_failing_clipboard() {
        let mut clipboard = MemoryClipboard::failing();
        assert!(clipboard.write_text("pt-6").is_err());
        assert_eq!(clipboard.write_count(), 0);
    }
}
