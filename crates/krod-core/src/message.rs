//! Message rendering pipeline
//!
//! raw content -> segments -> formatted prose, ready for a host renderer.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::content::{ContentCache, ContentSegment, FormattedText};
use crate::error::Result;
use crate::sources::{ensure_unique_ids, Source};

/// Who wrote the message. Styling hint only, parsing ignores it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    #[default]
    Assistant,
}

/// A chat message as supplied by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub role: MessageRole,
    pub content: String,
    #[serde(default)]
    pub sources: Vec<Source>,
}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<String>, sources: Vec<Source>) -> Self {
        Self {
            role,
            content: content.into(),
            sources,
        }
    }

    /// Parse a JSON message, rejecting duplicate source ids
    pub fn from_json(json: &str) -> Result<Self> {
        let message: Message = serde_json::from_str(json)?;
        ensure_unique_ids(&message.sources)?;
        Ok(message)
    }
}

/// A segment with its per-type rendering data resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedSegment {
    Text(Arc<FormattedText>),
    Code {
        /// Stable per message, used for the copy indicator
        key: String,
        language: String,
        content: String,
    },
    BlockMath(String),
    InlineMath(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub role: MessageRole,
    pub segments: Vec<RenderedSegment>,
}

impl RenderedMessage {
    /// Code blocks in document order as (key, content)
    pub fn code_blocks(&self) -> impl Iterator<Item = (&str, &str)> {
        self.segments.iter().filter_map(|segment| match segment {
            RenderedSegment::Code { key, content, .. } => Some((key.as_str(), content.as_str())),
            _ => None,
        })
    }
}

/// Copy-indicator key for the code block at `segment_index`
pub fn code_block_key(segment_index: usize) -> String {
    format!("code-{}", segment_index)
}

/// Segment and format a message, reusing cached work
pub fn render_message(message: &Message, cache: &mut ContentCache) -> RenderedMessage {
    let segments = cache.get_or_segment(&message.content);

    let rendered = segments
        .iter()
        .enumerate()
        .map(|(index, segment)| match segment {
            ContentSegment::Text { content } => {
                RenderedSegment::Text(cache.get_or_format(content, &message.sources))
            }
            ContentSegment::Code { content, language } => RenderedSegment::Code {
                key: code_block_key(index),
                language: language.clone(),
                content: content.clone(),
            },
            ContentSegment::BlockMath { content } => RenderedSegment::BlockMath(content.clone()),
            ContentSegment::InlineMath { content } => {
                RenderedSegment::InlineMath(content.clone())
            }
        })
        .collect();

    RenderedMessage {
        role: message.role,
        segments: rendered,
    }
}
