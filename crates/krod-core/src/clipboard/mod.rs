//! Copy-to-clipboard support for code blocks
//!
//! The clipboard itself belongs to the host; this module tracks which code
//! blocks were just copied and for how long to show that.

mod tracker;

use async_trait::async_trait;

use crate::error::Result;

pub use tracker::CopyTracker;

/// Destination for copied text
#[async_trait]
pub trait ClipboardWriter: Send + Sync {
    async fn write_text(&self, text: String) -> Result<()>;
}
