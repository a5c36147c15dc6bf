//! Inline formatting for prose segments
//!
//! Builds a small typed tree instead of substituting markup into the text,
//! so renderers escape leaves and spans can never overlap.
//!
//! Order of recognition inside a paragraph:
//! 1. `` `code` `` spans, whose content is left untouched
//! 2. `*emphasis*` wrapping a whole `**strong**` span
//! 3. `**strong**`
//! 4. `*emphasis*`, inside and between strong spans
//! 5. `[n]` citations, anywhere outside code spans

use once_cell::sync::Lazy;
use regex::Regex;

use crate::sources::{CitationMarker, Source};

static PARAGRAPH_BREAK_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{2,}").unwrap());
static CODE_SPAN_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]+)`").unwrap());
static STRONG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").unwrap());
static EMPHASIS_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*(.*?)\*").unwrap());
static EMPHASIS_AROUND_STRONG_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*[^*\n]*\*\*[^*\n]+\*\*[^*\n]*\*").unwrap());
static CITATION_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([0-9]+)\]").unwrap());

/// Inline content of a paragraph
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineNode {
    /// Plain text, unescaped
    Text(String),
    /// `**...**`
    Strong(Vec<InlineNode>),
    /// `*...*`
    Emphasis(Vec<InlineNode>),
    /// `` `...` ``
    Code(String),
    /// Resolved `[n]` reference, shown as it was written
    Citation {
        marker: CitationMarker,
        label: String,
    },
    /// Single newline inside a paragraph
    LineBreak,
}

/// A blank-line separated block of inline content
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paragraph {
    pub nodes: Vec<InlineNode>,
}

/// Formatted prose segment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormattedText {
    pub paragraphs: Vec<Paragraph>,
}

impl FormattedText {
    /// All citations in document order
    pub fn citations(&self) -> Vec<CitationMarker> {
        let mut out = Vec::new();
        for paragraph in &self.paragraphs {
            collect_citations(&paragraph.nodes, &mut out);
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }
}

fn collect_citations(nodes: &[InlineNode], out: &mut Vec<CitationMarker>) {
    for node in nodes {
        match node {
            InlineNode::Citation { marker, .. } => out.push(*marker),
            InlineNode::Strong(children) | InlineNode::Emphasis(children) => {
                collect_citations(children, out)
            }
            _ => {}
        }
    }
}

/// Format the content of a text segment against the message's sources
pub fn format_text(text: &str, sources: &[Source]) -> FormattedText {
    let paragraphs = PARAGRAPH_BREAK_REGEX
        .split(text)
        .filter(|p| !p.trim().is_empty())
        .map(|p| Paragraph {
            nodes: parse_paragraph(p, sources.len()),
        })
        .collect();

    FormattedText { paragraphs }
}

fn parse_paragraph(text: &str, source_count: usize) -> Vec<InlineNode> {
    let mut nodes = Vec::new();
    let mut last_end = 0;

    for caps in CODE_SPAN_REGEX.captures_iter(text) {
        let (Some(whole), Some(body)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        parse_outer_emphasis(&text[last_end..whole.start()], source_count, &mut nodes);
        nodes.push(InlineNode::Code(body.as_str().to_string()));
        last_end = whole.end();
    }
    parse_outer_emphasis(&text[last_end..], source_count, &mut nodes);

    nodes
}

/// `*a **b** c*`, which the strong pass alone would split apart
fn parse_outer_emphasis(text: &str, source_count: usize, out: &mut Vec<InlineNode>) {
    let bytes = text.as_bytes();
    let mut last_end = 0;
    let mut search_from = 0;

    while let Some(found) = EMPHASIS_AROUND_STRONG_REGEX.find_at(text, search_from) {
        // An adjacent `*` means the match is really part of a strong run
        let touches_star = (found.start() > 0 && bytes[found.start() - 1] == b'*')
            || bytes.get(found.end()) == Some(&b'*');
        if touches_star {
            search_from = found.start() + 1;
            continue;
        }
        parse_strong(&text[last_end..found.start()], source_count, out);
        let mut children = Vec::new();
        parse_strong(
            &text[found.start() + 1..found.end() - 1],
            source_count,
            &mut children,
        );
        out.push(InlineNode::Emphasis(children));
        last_end = found.end();
        search_from = found.end();
    }
    parse_strong(&text[last_end..], source_count, out);
}

fn parse_strong(text: &str, source_count: usize, out: &mut Vec<InlineNode>) {
    let mut last_end = 0;

    for caps in STRONG_REGEX.captures_iter(text) {
        let (Some(whole), Some(body)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        parse_emphasis(&text[last_end..whole.start()], source_count, out);
        let mut children = Vec::new();
        parse_emphasis(body.as_str(), source_count, &mut children);
        out.push(InlineNode::Strong(children));
        last_end = whole.end();
    }
    parse_emphasis(&text[last_end..], source_count, out);
}

fn parse_emphasis(text: &str, source_count: usize, out: &mut Vec<InlineNode>) {
    let mut last_end = 0;

    for caps in EMPHASIS_REGEX.captures_iter(text) {
        let (Some(whole), Some(body)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        parse_citations(&text[last_end..whole.start()], source_count, out);
        let mut children = Vec::new();
        parse_citations(body.as_str(), source_count, &mut children);
        out.push(InlineNode::Emphasis(children));
        last_end = whole.end();
    }
    parse_citations(&text[last_end..], source_count, out);
}

fn parse_citations(text: &str, source_count: usize, out: &mut Vec<InlineNode>) {
    let mut last_end = 0;

    for caps in CITATION_REGEX.captures_iter(text) {
        let (Some(whole), Some(digits)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        // Overflowing numbers can never be in range
        let marker = digits
            .as_str()
            .parse::<usize>()
            .ok()
            .and_then(|n| CitationMarker::resolve(n, source_count));

        if let Some(marker) = marker {
            push_text(&text[last_end..whole.start()], out);
            out.push(InlineNode::Citation {
                marker,
                label: whole.as_str().to_string(),
            });
            last_end = whole.end();
        }
    }
    push_text(&text[last_end..], out);
}

/// Push plain text, turning single newlines into line breaks
fn push_text(text: &str, out: &mut Vec<InlineNode>) {
    for (idx, line) in text.split('\n').enumerate() {
        if idx > 0 {
            out.push(InlineNode::LineBreak);
        }
        if line.is_empty() {
            continue;
        }
        // Merge with preceding text so literal `[n]` stays in one run
        if let Some(InlineNode::Text(prev)) = out.last_mut() {
            prev.push_str(line);
        } else {
            out.push(InlineNode::Text(line.to_string()));
        }
    }
}
