//! Clipboard sinks that receive copied text.

use anyhow::{Context, Result};
use std::io::Write;
use std::sync::Mutex;

/// Accepts the UTF-8 text produced by a copy operation.
pub trait ClipboardSink: Send + Sync {
    fn write_text(&self, text: &str) -> Result<()>;
}

/// Places copied text on the operating system clipboard.
pub struct SystemClipboard;

impl ClipboardSink for SystemClipboard {
    fn write_text(&self, text: &str) -> Result<()> {
        let mut clipboard = arboard::Clipboard::new().context("Clipboard is not available")?;
        clipboard.set_text(text)?;
        tracing::debug!("Placed {} bytes on the system clipboard", text.len());
        Ok(())
    }
}

/// Writes copied text to standard output, for piping into `pbcopy`, `xclip` and the like.
pub struct StdoutClipboard;

impl ClipboardSink for StdoutClipboard {
    fn write_text(&self, text: &str) -> Result<()> {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(text.as_bytes())?;
        stdout.flush()?;
        Ok(())
    }
}

/// Keeps the last copied text in memory.
#[derive(Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<String>>,
}

impl MemoryClipboard {
    pub fn contents(&self) -> Option<String> {
        self.contents
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl ClipboardSink for MemoryClipboard {
    fn write_text(&self, text: &str) -> Result<()> {
        *self
            .contents
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_clipboard_keeps_last_write() {
        let clipboard = MemoryClipboard::default();
        assert_eq!(clipboard.contents(), None);

        clipboard.write_text("first").unwrap();
        clipboard.write_text("second").unwrap();

        assert_eq!(clipboard.contents().as_deref(), Some("second"));
    }

    #[test]
    fn test_sinks_are_usable_as_trait_objects() {
        let sinks: Vec<Box<dyn ClipboardSink>> = vec![
            Box::new(SystemClipboard),
            Box::new(StdoutClipboard),
            Box::new(MemoryClipboard::default()),
        ];
        assert_eq!(sinks.len(), 3);
    }
}
