//! Text Utilities - styled wrapping and truncation
//!
//! All width calculations use unicode display width, not byte length.

use std::borrow::Cow;

use ratatui::style::Style;
use ratatui::text::{Line, Span};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Get display width of a string (handles unicode properly)
#[inline]
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Make untrusted text safe to print
///
/// Tabs become four spaces; every other control character except `\n` is
/// dropped, so message text can't smuggle escape sequences to the terminal.
pub fn sanitize(text: &str) -> Cow<'_, str> {
    if !text.chars().any(|c| c.is_control() && c != '\n') {
        return Cow::Borrowed(text);
    }
    let mut clean = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\t' => clean.push_str("    "),
            '\n' => clean.push(c),
            c if c.is_control() => {}
            c => clean.push(c),
        }
    }
    Cow::Owned(clean)
}

/// A run of text with one style, optionally tagged as a citation
#[derive(Debug, Clone, PartialEq)]
pub struct StyledPiece {
    pub text: String,
    pub style: Style,
    /// Source index when this piece is a citation marker
    pub citation: Option<usize>,
}

impl StyledPiece {
    pub fn new(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: clean(text.into()),
            style,
            citation: None,
        }
    }

    pub fn citation(text: impl Into<String>, style: Style, source_index: usize) -> Self {
        Self {
            text: clean(text.into()),
            style,
            citation: Some(source_index),
        }
    }
}

fn clean(text: String) -> String {
    let sanitized = match sanitize(&text) {
        Cow::Owned(sanitized) => Some(sanitized),
        Cow::Borrowed(_) => None,
    };
    sanitized.unwrap_or(text)
}

/// Where a citation landed after wrapping, relative to the wrapped block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrappedCitation {
    pub source_index: usize,
    pub line: usize,
    pub start_col: usize,
    pub end_col: usize,
}

/// Token produced while wrapping: a word, a whitespace run, or a citation
struct Token<'a> {
    text: &'a str,
    style: Style,
    citation: Option<usize>,
    is_space: bool,
}

fn tokenize(pieces: &[StyledPiece]) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    for piece in pieces {
        if piece.citation.is_some() {
            tokens.push(Token {
                text: &piece.text,
                style: piece.style,
                citation: piece.citation,
                is_space: false,
            });
            continue;
        }

        let mut start = 0;
        let mut in_space: Option<bool> = None;
        for (idx, ch) in piece.text.char_indices() {
            let space = ch.is_whitespace();
            match in_space {
                Some(prev) if prev != space => {
                    tokens.push(Token {
                        text: &piece.text[start..idx],
                        style: piece.style,
                        citation: None,
                        is_space: prev,
                    });
                    start = idx;
                }
                _ => {}
            }
            in_space = Some(space);
        }
        if let Some(space) = in_space {
            tokens.push(Token {
                text: &piece.text[start..],
                style: piece.style,
                citation: None,
                is_space: space,
            });
        }
    }
    tokens
}

/// Builds wrapped lines, merging adjacent runs that share a style
struct LineBuilder {
    lines: Vec<Vec<(String, Style)>>,
    current: Vec<(String, Style)>,
    width: usize,
}

impl LineBuilder {
    fn push(&mut self, text: &str, style: Style) {
        self.width += display_width(text);
        match self.current.last_mut() {
            Some((last, last_style)) if *last_style == style => last.push_str(text),
            _ => self.current.push((text.to_string(), style)),
        }
    }

    fn break_line(&mut self) {
        // Trailing whitespace never ends a wrapped line
        while let Some((text, _)) = self.current.last_mut() {
            let trimmed_len = text.trim_end().len();
            if trimmed_len == text.len() {
                break;
            }
            text.truncate(trimmed_len);
            if text.is_empty() {
                self.current.pop();
            }
        }
        self.lines.push(std::mem::take(&mut self.current));
        self.width = 0;
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        if !self.current.is_empty() || self.lines.is_empty() {
            self.break_line();
        }
        self.lines
            .into_iter()
            .map(|runs| {
                Line::from(
                    runs.into_iter()
                        .map(|(text, style)| Span::styled(text, style))
                        .collect::<Vec<_>>(),
                )
            })
            .collect()
    }
}

/// Wrap one logical line of styled pieces at word boundaries
///
/// Words wider than `max_width` are broken by character. Citations are never
/// split. Whitespace at a wrap point is dropped.
pub fn wrap_pieces(
    pieces: &[StyledPiece],
    max_width: usize,
) -> (Vec<Line<'static>>, Vec<WrappedCitation>) {
    let max_width = max_width.max(1);
    let mut builder = LineBuilder {
        lines: Vec::new(),
        current: Vec::new(),
        width: 0,
    };
    let mut citations = Vec::new();

    for token in tokenize(pieces) {
        let token_width = display_width(token.text);

        if token.is_space {
            if builder.width == 0 && !builder.lines.is_empty() {
                continue;
            }
            if builder.width + token_width > max_width {
                builder.break_line();
                continue;
            }
            builder.push(token.text, token.style);
            continue;
        }

        if builder.width + token_width > max_width && builder.width > 0 {
            builder.break_line();
        }

        if let Some(source_index) = token.citation {
            let start_col = builder.width;
            builder.push(token.text, token.style);
            citations.push(WrappedCitation {
                source_index,
                line: builder.lines.len(),
                start_col,
                end_col: builder.width,
            });
            continue;
        }

        if token_width <= max_width {
            builder.push(token.text, token.style);
            continue;
        }

        // Force-break a word longer than the line
        for ch in token.text.chars() {
            let char_width = UnicodeWidthChar::width(ch).unwrap_or(0);
            if builder.width + char_width > max_width && builder.width > 0 {
                builder.break_line();
            }
            let mut buf = [0u8; 4];
            builder.push(ch.encode_utf8(&mut buf), token.style);
        }
    }

    (builder.finish(), citations)
}

/// Truncate a string to fit within max display width, adding ellipsis if needed.
///
/// Returns `Cow::Borrowed` if no truncation needed (zero allocation).
pub fn truncate_ellipsis(s: &str, max_width: usize) -> Cow<'_, str> {
    if display_width(s) <= max_width {
        return Cow::Borrowed(s);
    }

    // Need at least 4 chars for "X..." pattern
    if max_width < 4 {
        return Cow::Owned(s.chars().take(max_width).collect());
    }

    let target_width = max_width - 3;
    let mut width = 0;
    let truncated: String = s
        .chars()
        .take_while(|c| {
            let char_width = UnicodeWidthChar::width(*c).unwrap_or(0);
            if width + char_width <= target_width {
                width += char_width;
                true
            } else {
                false
            }
        })
        .collect();

    Cow::Owned(format!("{}...", truncated))
}
