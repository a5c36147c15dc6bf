//! Content Cache
//!
//! Memoizes segmentation and inline formatting so re-rendering an unchanged
//! message is free. Keys are the content itself, not a hash of it.

use std::collections::HashMap;
use std::sync::Arc;

use super::inline::{format_text, FormattedText};
use super::segment::{segment, ContentSegment};
use crate::sources::Source;

/// Formatting depends on the text and on how many sources can be cited
type FormatKey = (String, usize);

pub struct ContentCache {
    segments: HashMap<String, Arc<Vec<ContentSegment>>>,
    formatted: HashMap<FormatKey, Arc<FormattedText>>,
    /// Entries per map before it is flushed
    capacity: usize,
}

impl Default for ContentCache {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_CACHE_CAPACITY)
    }
}

impl ContentCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            segments: HashMap::new(),
            formatted: HashMap::new(),
            capacity: capacity.max(1),
        }
    }

    /// Get or compute the segments for `content`
    pub fn get_or_segment(&mut self, content: &str) -> Arc<Vec<ContentSegment>> {
        if let Some(cached) = self.segments.get(content) {
            return Arc::clone(cached);
        }

        if self.segments.len() >= self.capacity {
            tracing::debug!(entries = self.segments.len(), "Segment cache full, flushing");
            self.segments.clear();
        }

        let segments = Arc::new(segment(content));
        self.segments
            .insert(content.to_string(), Arc::clone(&segments));
        segments
    }

    /// Get or compute the formatted form of a text segment
    pub fn get_or_format(&mut self, text: &str, sources: &[Source]) -> Arc<FormattedText> {
        let key = (text.to_string(), sources.len());
        if let Some(cached) = self.formatted.get(&key) {
            return Arc::clone(cached);
        }

        if self.formatted.len() >= self.capacity {
            tracing::debug!(entries = self.formatted.len(), "Format cache full, flushing");
            self.formatted.clear();
        }

        let formatted = Arc::new(format_text(text, sources));
        self.formatted.insert(key, Arc::clone(&formatted));
        formatted
    }

    /// Drop everything derived from `content`
    ///
    /// Call when a message's content is replaced.
    pub fn invalidate(&mut self, content: &str) {
        if let Some(segments) = self.segments.remove(content) {
            for segment in segments.iter() {
                if let ContentSegment::Text { content: text } = segment {
                    self.formatted.retain(|(cached, _), _| cached != text);
                }
            }
        }
    }

    pub fn clear(&mut self) {
        self.segments.clear();
        self.formatted.clear();
    }

    /// Number of messages with cached segments
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}
