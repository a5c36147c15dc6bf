//! Message content: segmentation, inline formatting and markup output

mod cache;
pub mod html;
mod inline;
mod segment;

pub use cache::ContentCache;
pub use inline::{format_text, FormattedText, InlineNode, Paragraph};
pub use segment::{segment, ContentSegment, DEFAULT_CODE_LANGUAGE};
