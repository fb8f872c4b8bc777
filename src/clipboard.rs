use crate::error::{Result, SnipjarError};
use arboard::Clipboard;
use std::cell::RefCell;
use std::rc::Rc;

/// Destination for "copy content" actions.
pub trait ClipboardSink {
    fn set_text(&mut self, text: &str) -> Result<()>;
}

/// The system clipboard, opened on each copy.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        let mut clipboard = Clipboard::new().map_err(|e| SnipjarError::Clipboard(e.to_string()))?;
        clipboard
            .set_text(text)
            .map_err(|e| SnipjarError::Clipboard(e.to_string()))
    }
}

/// Keeps copied text in memory. Clones share the same contents.
#[derive(Debug, Default, Clone)]
pub struct MemoryClipboard {
    contents: Rc<RefCell<Option<String>>>,
}

impl MemoryClipboard {
    pub fn contents(&self) -> Option<String> {
        self.contents.borrow().clone()
    }
}

impl ClipboardSink for MemoryClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        *self.contents.borrow_mut() = Some(text.to_string());
        Ok(())
    }
}
