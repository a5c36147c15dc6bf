//! Source card rendering

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use krod_core::{Source, SourceCards};

use super::anchors::CardAnchor;
use crate::tui::themes::Theme;
use crate::tui::utils::text::{display_width, truncate_ellipsis};

/// Width of the "[n] " number column
const NUMBER_WIDTH: usize = 5;

/// Lines for the sources section appended below a message
pub struct CardSection {
    pub lines: Vec<Line<'static>>,
    /// Card anchors relative to the first line of the section
    pub anchors: Vec<CardAnchor>,
    /// Relative line of the header when a toggle is offered
    pub toggle_line: Option<usize>,
}

/// Render the visible cards; `None` when there are no sources at all
pub fn render_cards(
    sources: &[Source],
    cards: &SourceCards,
    highlighted: Option<&str>,
    width: usize,
    theme: &Theme,
) -> Option<CardSection> {
    if sources.is_empty() {
        return None;
    }

    let mut lines = Vec::new();
    let mut anchors = Vec::new();

    lines.push(Line::from(Span::styled(
        "─".repeat(width),
        Style::default().fg(theme.border_color),
    )));

    let header = SourceCards::header(sources);
    let mut header_spans = vec![Span::styled(
        header.clone(),
        Style::default()
            .fg(theme.title_color)
            .add_modifier(Modifier::BOLD),
    )];
    let toggle_line = if cards.has_hidden(sources) {
        let label = format!("{} (s)", cards.toggle_label());
        let pad = width.saturating_sub(display_width(&header) + display_width(&label));
        header_spans.push(Span::raw(" ".repeat(pad)));
        header_spans.push(Span::styled(label, Style::default().fg(theme.dim_color)));
        Some(lines.len())
    } else {
        None
    };
    lines.push(Line::from(header_spans));

    let text_width = width.saturating_sub(NUMBER_WIDTH).max(1);
    for (index, source) in cards.visible(sources).iter().enumerate() {
        lines.push(Line::default());
        let top = lines.len();
        let is_highlighted = highlighted == Some(source.id.as_str());
        let title_style = if is_highlighted {
            Style::default()
                .fg(theme.text_color)
                .bg(theme.selection_bg_color)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
                .fg(theme.text_color)
                .add_modifier(Modifier::BOLD)
        };

        lines.push(Line::from(vec![
            Span::styled(
                format!("{:<width$}", format!("[{}]", index + 1), width = NUMBER_WIDTH),
                Style::default().fg(theme.link_color),
            ),
            Span::styled(
                truncate_ellipsis(&source.title, text_width).into_owned(),
                title_style,
            ),
        ]));

        let indent = " ".repeat(NUMBER_WIDTH);
        lines.push(Line::from(vec![
            Span::raw(indent.clone()),
            Span::styled(
                truncate_ellipsis(&source.display_domain(), text_width).into_owned(),
                Style::default().fg(theme.dim_color),
            ),
        ]));

        if let Some(snippet) = source.snippet.as_deref().filter(|s| !s.trim().is_empty()) {
            lines.push(Line::from(vec![
                Span::raw(indent.clone()),
                Span::styled(
                    truncate_ellipsis(snippet.trim(), text_width).into_owned(),
                    Style::default()
                        .fg(theme.dim_color)
                        .add_modifier(Modifier::ITALIC),
                ),
            ]));
        }

        lines.push(Line::from(vec![
            Span::raw(indent),
            Span::styled(
                truncate_ellipsis(&source.url, text_width).into_owned(),
                Style::default()
                    .fg(theme.link_color)
                    .add_modifier(Modifier::UNDERLINED),
            ),
        ]));

        anchors.push(CardAnchor {
            source_id: source.id.clone(),
            top,
            height: lines.len() - top,
        });
    }

    Some(CardSection {
        lines,
        anchors,
        toggle_line,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sources(n: usize) -> Vec<Source> {
        (1..=n)
            .map(|i| Source {
                id: format!("s{}", i),
                title: format!("Title {}", i),
                url: format!("https://site{}.dev/page", i),
                domain: None,
                snippet: (i % 2 == 0).then(|| "snippet".to_string()),
                favicon: None,
            })
            .collect()
    }

    #[test]
    fn test_no_section_without_sources() {
        assert!(render_cards(&[], &SourceCards::new(), None, 40, &Theme::default()).is_none());
    }

    #[test]
    fn test_collapsed_cards_and_toggle() {
        let all = sources(5);
        let section =
            render_cards(&all, &SourceCards::new(), None, 40, &Theme::default()).unwrap();
        assert_eq!(section.anchors.len(), 3);
        assert_eq!(section.toggle_line, Some(1));
        let header: String = section.lines[1]
            .spans
            .iter()
            .map(|s| s.content.as_ref())
            .collect();
        assert!(header.starts_with("Sources (5)"));
        assert!(header.ends_with("Show all (s)"));
    }

    #[test]
    fn test_expanded_shows_all_with_snippet_heights() {
        let all = sources(4);
        let mut cards = SourceCards::new();
        cards.toggle();
        let section = render_cards(&all, &cards, None, 40, &Theme::default()).unwrap();
        assert_eq!(section.anchors.len(), 4);
        // Odd cards: title, domain, url. Even cards add a snippet.
        assert_eq!(section.anchors[0].height, 3);
        assert_eq!(section.anchors[1].height, 4);
        let domain_line: String = section.lines[section.anchors[0].top + 1]
            .spans
            .iter()
            .map(|s| s.content.as_ref())
            .collect();
        assert_eq!(domain_line.trim(), "site1.dev");
    }

    #[test]
    fn test_no_toggle_for_short_lists() {
        let section =
            render_cards(&sources(2), &SourceCards::new(), None, 40, &Theme::default()).unwrap();
        assert_eq!(section.toggle_line, None);
    }
}
