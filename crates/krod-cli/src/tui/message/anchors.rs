//! Positions of interactive elements in rendered output
//!
//! Recorded while building lines so clicks and keys can be mapped back to
//! citations, code blocks and source cards after the lines are drawn.

use ratatui::text::Line;

/// Tracks a citation marker's position in rendered output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitationSpan {
    /// Index into the message's source list
    pub source_index: usize,
    /// Line index in rendered output (0-based)
    pub line: usize,
    /// Start column in display width units (0-based)
    pub start_col: usize,
    /// End column in display width units (exclusive)
    pub end_col: usize,
}

/// Lines occupied by a code block; `top` is its header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeAnchor {
    pub key: String,
    pub top: usize,
    pub height: usize,
}

/// Lines occupied by a source card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardAnchor {
    pub source_id: String,
    pub top: usize,
    pub height: usize,
}

/// Rendered message with everything needed for hit testing
#[derive(Debug, Clone, Default)]
pub struct RenderedLines {
    pub lines: Vec<Line<'static>>,
    pub citations: Vec<CitationSpan>,
    pub code_blocks: Vec<CodeAnchor>,
    pub cards: Vec<CardAnchor>,
    /// Line holding the show all / show less control, if offered
    pub toggle_line: Option<usize>,
}

impl RenderedLines {
    /// Source index of the citation drawn at (line, col)
    pub fn citation_at(&self, line: usize, col: usize) -> Option<usize> {
        self.citations
            .iter()
            .find(|c| c.line == line && (c.start_col..c.end_col).contains(&col))
            .map(|c| c.source_index)
    }

    /// Code block whose header is drawn on `line`
    pub fn code_header_at(&self, line: usize) -> Option<&CodeAnchor> {
        self.code_blocks.iter().find(|c| c.top == line)
    }

    /// Whether a marker for `source_index` was drawn anywhere
    pub fn has_citation(&self, source_index: usize) -> bool {
        self.citations.iter().any(|c| c.source_index == source_index)
    }
}
