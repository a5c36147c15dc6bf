//! System clipboard backed by arboard
//!
//! On X11 and Wayland the owning process serves the selection, so the
//! clipboard handle is opened once and kept for the life of the viewer.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use krod_core::clipboard::ClipboardWriter;
use krod_core::{Error, Result};

/// A clipboard connection that can take text
pub trait ClipboardHandle: Send + 'static {
    fn set_text(&mut self, text: String) -> Result<()>;
}

impl ClipboardHandle for arboard::Clipboard {
    fn set_text(&mut self, text: String) -> Result<()> {
        arboard::Clipboard::set_text(self, text).map_err(|e| Error::Clipboard(e.to_string()))
    }
}

fn open_system() -> Result<arboard::Clipboard> {
    arboard::Clipboard::new().map_err(|e| Error::Clipboard(e.to_string()))
}

/// Writes to the OS clipboard on a blocking thread
pub struct SystemClipboard<H = arboard::Clipboard> {
    /// Opened on first write, then reused
    handle: Arc<Mutex<Option<H>>>,
    open: fn() -> Result<H>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::with_opener(open_system)
    }
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: ClipboardHandle> SystemClipboard<H> {
    pub fn with_opener(open: fn() -> Result<H>) -> Self {
        Self {
            handle: Arc::new(Mutex::new(None)),
            open,
        }
    }
}

#[async_trait]
impl<H: ClipboardHandle> ClipboardWriter for SystemClipboard<H> {
    async fn write_text(&self, text: String) -> Result<()> {
        let handle = Arc::clone(&self.handle);
        let open = self.open;
        tokio::task::spawn_blocking(move || {
            let mut slot = handle.lock();
            if slot.is_none() {
                *slot = Some(open()?);
                tracing::debug!("Opened system clipboard");
            }
            match slot.as_mut() {
                Some(clipboard) => clipboard.set_text(text),
                None => Err(Error::Clipboard("clipboard not open".to_string())),
            }
        })
        .await
        .map_err(|e| Error::Clipboard(format!("clipboard task failed: {}", e)))?
    }
}
