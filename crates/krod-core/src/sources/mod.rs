//! Sources cited by a message
//!
//! Source lists are supplied per message and never mutated here; citations
//! and cards only index into them.

mod cards;
mod citation;
mod source;

pub use cards::{visible_sources, SourceCards, COLLAPSED_SOURCE_LIMIT};
pub use citation::{
    CardRegistry, CitationLinker, CitationMarker, ScrollAlignment, ScrollBehavior, ScrollRequest,
};
pub use source::{parse_sources, Source};

pub(crate) use source::ensure_unique_ids;
