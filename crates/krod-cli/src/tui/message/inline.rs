//! Inline content rendering to styled pieces

use ratatui::style::{Modifier, Style};

use krod_core::{FormattedText, InlineNode};

use crate::tui::themes::Theme;
use crate::tui::utils::text::StyledPiece;

/// Convert a paragraph into logical lines of styled pieces
///
/// Each `LineBreak` starts a new logical line; breaks at the edges of a
/// paragraph are dropped so segment boundaries don't leave blank rows.
pub fn render_paragraph(
    nodes: &[InlineNode],
    base_style: Style,
    theme: &Theme,
) -> Vec<Vec<StyledPiece>> {
    let mut lines = vec![Vec::new()];
    for node in nodes {
        render_node(node, base_style, theme, &mut lines);
    }

    while lines.len() > 1 && lines.first().is_some_and(|l| is_blank(l)) {
        lines.remove(0);
    }
    while lines.len() > 1 && lines.last().is_some_and(|l| is_blank(l)) {
        lines.pop();
    }
    lines
}

/// Logical lines for every paragraph, with an empty line between paragraphs
pub fn render_formatted(
    text: &FormattedText,
    base_style: Style,
    theme: &Theme,
) -> Vec<Vec<StyledPiece>> {
    let mut out = Vec::new();
    for (idx, paragraph) in text.paragraphs.iter().enumerate() {
        if idx > 0 {
            out.push(Vec::new());
        }
        out.extend(render_paragraph(&paragraph.nodes, base_style, theme));
    }
    out
}

fn is_blank(pieces: &[StyledPiece]) -> bool {
    pieces.iter().all(|p| p.text.trim().is_empty())
}

fn render_node(node: &InlineNode, style: Style, theme: &Theme, lines: &mut Vec<Vec<StyledPiece>>) {
    match node {
        InlineNode::Text(text) => push(lines, StyledPiece::new(text.clone(), style)),
        InlineNode::Strong(children) => {
            let style = style.add_modifier(Modifier::BOLD);
            for child in children {
                render_node(child, style, theme, lines);
            }
        }
        InlineNode::Emphasis(children) => {
            let style = style.add_modifier(Modifier::ITALIC);
            for child in children {
                render_node(child, style, theme, lines);
            }
        }
        InlineNode::Code(code) => {
            let code_style = Style::default()
                .fg(theme.accent_color)
                .bg(theme.code_bg_color);
            push(
                lines,
                StyledPiece::new(format!(" {} ", code.replace('\n', " ")), code_style),
            );
        }
        InlineNode::Citation { marker, label } => {
            let cite_style = style
                .fg(theme.link_color)
                .add_modifier(Modifier::UNDERLINED);
            push(
                lines,
                StyledPiece::citation(
                    label.clone(),
                    cite_style,
                    marker.source_index,
                ),
            );
        }
        InlineNode::LineBreak => lines.push(Vec::new()),
    }
}

fn push(lines: &mut Vec<Vec<StyledPiece>>, piece: StyledPiece) {
    if let Some(line) = lines.last_mut() {
        line.push(piece);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use krod_core::{format_text, Source};

    fn text_of(line: &[StyledPiece]) -> String {
        line.iter().map(|p| p.text.as_str()).collect()
    }

    #[test]
    fn test_line_breaks_split_lines_and_edges_trimmed() {
        let formatted = format_text("\nfirst\nsecond\n", &[]);
        let lines = render_formatted(&formatted, Style::default(), &Theme::default());
        let texts: Vec<String> = lines.iter().map(|l| text_of(l)).collect();
        assert_eq!(texts, vec!["first", "second"]);
    }

    #[test]
    fn test_paragraphs_separated_by_blank_line() {
        let formatted = format_text("a\n\nb", &[]);
        let lines = render_formatted(&formatted, Style::default(), &Theme::default());
        assert_eq!(lines.len(), 3);
        assert!(lines[1].is_empty());
    }

    #[test]
    fn test_citation_piece_is_tagged() {
        let sources = vec![Source {
            id: "s1".to_string(),
            title: "T".to_string(),
            url: "https://t.dev".to_string(),
            domain: None,
            snippet: None,
            favicon: None,
        }];
        let formatted = format_text("**see [1]**", &sources);
        let lines = render_formatted(&formatted, Style::default(), &Theme::default());
        let citation = lines[0].iter().find(|p| p.citation.is_some()).unwrap();
        assert_eq!(citation.text, "[1]");
        assert_eq!(citation.citation, Some(0));
        assert!(citation.style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_citation_shown_as_written() {
        let sources = vec![Source {
            id: "s1".to_string(),
            title: "T".to_string(),
            url: "https://t.dev".to_string(),
            domain: None,
            snippet: None,
            favicon: None,
        }];
        let formatted = format_text("per [01]", &sources);
        let lines = render_formatted(&formatted, Style::default(), &Theme::default());
        assert_eq!(text_of(&lines[0]), "per [01]");
        let citation = lines[0].iter().find(|p| p.citation.is_some()).unwrap();
        assert_eq!(citation.citation, Some(0));
    }
}
