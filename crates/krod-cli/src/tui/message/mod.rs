//! Message rendering for the terminal
//!
//! Turns a core `RenderedMessage` into ratatui lines plus the anchors the
//! viewer needs for citations, copy buttons and source cards.

mod anchors;
mod cards;
mod inline;

use std::borrow::Cow;

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use krod_core::{MessageRole, RenderedMessage, RenderedSegment, Source, SourceCards};

pub use anchors::{CardAnchor, CitationSpan, CodeAnchor, RenderedLines};

use crate::tui::themes::Theme;
use crate::tui::utils::syntax::highlight_code;
use crate::tui::utils::text::{display_width, sanitize, wrap_pieces};

/// Transient view state that affects drawing
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions<'a> {
    pub width: usize,
    /// Code block key drawn as selected
    pub selected_code: Option<&'a str>,
    /// Source id whose card is drawn highlighted
    pub highlighted_card: Option<&'a str>,
}

/// Render a message and its source cards into lines
pub fn render_lines(
    message: &RenderedMessage,
    sources: &[Source],
    cards: &SourceCards,
    is_copied: &dyn Fn(&str) -> bool,
    options: RenderOptions<'_>,
    theme: &Theme,
) -> RenderedLines {
    let width = options.width.max(1);
    let mut out = RenderedLines::default();

    let (label, role_color) = match message.role {
        MessageRole::User => ("You", theme.user_msg_color),
        MessageRole::Assistant => ("Assistant", theme.assistant_msg_color),
    };
    out.lines.push(Line::from(Span::styled(
        format!("▍ {}", label),
        Style::default().fg(role_color).add_modifier(Modifier::BOLD),
    )));

    let base_style = Style::default().fg(theme.text_color);

    for segment in &message.segments {
        out.lines.push(Line::default());
        match segment {
            RenderedSegment::Text(text) => {
                for logical in inline::render_formatted(text, base_style, theme) {
                    let offset = out.lines.len();
                    let (lines, citations) = wrap_pieces(&logical, width);
                    out.lines.extend(lines);
                    out.citations
                        .extend(citations.into_iter().map(|c| CitationSpan {
                            source_index: c.source_index,
                            line: offset + c.line,
                            start_col: c.start_col,
                            end_col: c.end_col,
                        }));
                }
            }
            RenderedSegment::Code {
                key,
                language,
                content,
            } => {
                let top = out.lines.len();
                let selected = options.selected_code == Some(key.as_str());
                out.lines
                    .push(code_header(language, is_copied(key), selected, width, theme));
                for spans in highlight_code(content, language, theme) {
                    let mut line = vec![Span::styled(
                        "  ",
                        Style::default().bg(theme.code_bg_color),
                    )];
                    line.extend(spans);
                    out.lines.push(Line::from(line));
                }
                out.code_blocks.push(CodeAnchor {
                    key: key.clone(),
                    top,
                    height: out.lines.len() - top,
                });
            }
            RenderedSegment::BlockMath(tex) => {
                let style = Style::default()
                    .fg(theme.math_color)
                    .add_modifier(Modifier::ITALIC);
                for tex_line in tex.lines() {
                    let pad = width.saturating_sub(display_width(tex_line)) / 2;
                    out.lines.push(Line::from(vec![
                        Span::raw(" ".repeat(pad)),
                        Span::styled(tex_line.to_string(), style),
                    ]));
                }
            }
            RenderedSegment::InlineMath(tex) => {
                out.lines.push(Line::from(Span::styled(
                    tex.clone(),
                    Style::default().fg(theme.math_color),
                )));
            }
        }
    }

    if let Some(section) =
        cards::render_cards(sources, cards, options.highlighted_card, width, theme)
    {
        out.lines.push(Line::default());
        let offset = out.lines.len();
        out.lines.extend(section.lines);
        out.toggle_line = section.toggle_line.map(|line| offset + line);
        out.cards
            .extend(section.anchors.into_iter().map(|anchor| CardAnchor {
                top: offset + anchor.top,
                ..anchor
            }));
    }

    strip_control_chars(&mut out.lines);
    out
}

/// Code, TeX and source fields go out verbatim otherwise
fn strip_control_chars(lines: &mut [Line<'static>]) {
    for span in lines.iter_mut().flat_map(|line| line.spans.iter_mut()) {
        let sanitized = match sanitize(&span.content) {
            Cow::Owned(sanitized) => Some(sanitized),
            Cow::Borrowed(_) => None,
        };
        if let Some(sanitized) = sanitized {
            span.content = Cow::Owned(sanitized);
        }
    }
}

fn code_header(
    language: &str,
    copied: bool,
    selected: bool,
    width: usize,
    theme: &Theme,
) -> Line<'static> {
    let mut bar = Style::default().bg(theme.code_bg_color);
    if selected {
        bar = bar.bg(theme.selection_bg_color);
    }

    let (button, button_style) = if copied {
        ("✓ Copied", bar.fg(theme.success_color))
    } else {
        ("Copy (y)", bar.fg(theme.dim_color))
    };

    let lang = format!(" {}", language);
    let pad = width.saturating_sub(display_width(&lang) + display_width(button) + 1);

    Line::from(vec![
        Span::styled(lang, bar.fg(theme.dim_color).add_modifier(Modifier::BOLD)),
        Span::styled(" ".repeat(pad), bar),
        Span::styled(button.to_string(), button_style),
        Span::styled(" ", bar),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use krod_core::{render_message, ContentCache, Message};

    fn message(content: &str, source_count: usize) -> (RenderedMessage, Vec<Source>) {
        let sources: Vec<Source> = (1..=source_count)
            .map(|i| Source {
                id: format!("s{}", i),
                title: format!("Title {}", i),
                url: format!("https://example.com/{}", i),
                domain: None,
                snippet: None,
                favicon: None,
            })
            .collect();
        let message = Message::new(MessageRole::Assistant, content, sources.clone());
        let mut cache = ContentCache::new(8);
        (render_message(&message, &mut cache), sources)
    }

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_citation_spans_are_absolute() {
        let (rendered, sources) = message("Proven [1] twice [2]", 2);
        let out = render_lines(
            &rendered,
            &sources,
            &SourceCards::new(),
            &|_| false,
            RenderOptions {
                width: 80,
                ..Default::default()
            },
            &Theme::default(),
        );

        // Role label, blank, then the paragraph
        assert_eq!(line_text(&out.lines[2]), "Proven [1] twice [2]");
        assert_eq!(out.citation_at(2, 7), Some(0));
        assert_eq!(out.citation_at(2, 18), Some(1));
        assert_eq!(out.citation_at(2, 0), None);
        assert_eq!(out.cards.len(), 2);
        assert!(out.cards[0].top > 2);
        assert_eq!(line_text(&out.lines[out.cards[0].top]), "[1]  Title 1");
    }

    #[test]
    fn test_code_block_header_and_copy_state() {
        let (rendered, sources) = message("```rust\nlet x = 1;\n```", 0);
        let render = |copied: bool| {
            render_lines(
                &rendered,
                &sources,
                &SourceCards::new(),
                &|key| copied && key == "code-0",
                RenderOptions {
                    width: 40,
                    ..Default::default()
                },
                &Theme::default(),
            )
        };

        let idle = render(false);
        assert_eq!(idle.code_blocks.len(), 1);
        let anchor = &idle.code_blocks[0];
        assert_eq!(anchor.key, "code-0");
        assert_eq!(anchor.height, 2);
        let header = line_text(&idle.lines[anchor.top]);
        assert!(header.starts_with(" rust"));
        assert!(header.contains("Copy (y)"));
        assert_eq!(display_width(&header), 40);
        assert_eq!(line_text(&idle.lines[anchor.top + 1]), "  let x = 1;");
        assert!(idle.cards.is_empty());

        let copied = render(true);
        assert!(line_text(&copied.lines[copied.code_blocks[0].top]).contains("✓ Copied"));
    }

    #[test]
    fn test_escape_sequences_never_reach_output() {
        let (rendered, mut sources) = message(
            "hi \x1b]52;c;aGFjaw==\x07 there [1]\n```sh\nx\x1b[2J\n```\n$\x1b[31mx$",
            1,
        );
        sources[0].title = "evil\x1b]0;title\x07".to_string();
        let out = render_lines(
            &rendered,
            &sources,
            &SourceCards::new(),
            &|_| false,
            RenderOptions {
                width: 80,
                ..Default::default()
            },
            &Theme::default(),
        );

        let mut printed = Vec::new();
        crate::tui::ansi::write_lines(&mut printed, &out.lines, false).unwrap();
        let printed = String::from_utf8(printed).unwrap();
        assert!(!printed.contains('\x1b'));
        assert!(!printed.contains('\x07'));
        assert!(printed.contains("hi ]52;c;aGFjaw== there [1]"));
        assert!(printed.contains("x[2J"));
        assert!(printed.contains("evil]0;title"));
    }

    #[test]
    fn test_math_segments() {
        let (rendered, sources) = message("$$a+b$$", 0);
        let out = render_lines(
            &rendered,
            &sources,
            &SourceCards::new(),
            &|_| false,
            RenderOptions {
                width: 11,
                ..Default::default()
            },
            &Theme::default(),
        );
        assert_eq!(line_text(&out.lines[2]), "    a+b");
    }
}
