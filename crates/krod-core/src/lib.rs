//! Krod core
//!
//! Turns raw chat message text into ordered, typed segments, formats prose
//! segments into an inline tree with resolved citations, and models the
//! source cards those citations point at.

pub mod clipboard;
pub mod config;
pub mod content;
pub mod error;
pub mod message;
pub mod sources;

pub use config::KrodConfig;
pub use content::{
    format_text, segment, ContentCache, ContentSegment, FormattedText, InlineNode, Paragraph,
};
pub use error::{Error, Result};
pub use message::{render_message, Message, MessageRole, RenderedMessage, RenderedSegment};
pub use sources::{
    parse_sources, visible_sources, CardRegistry, CitationLinker, CitationMarker,
    ScrollAlignment, ScrollBehavior, ScrollRequest, Source, SourceCards,
};
