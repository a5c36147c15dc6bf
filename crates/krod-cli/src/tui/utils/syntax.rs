//! Syntax highlighting using syntect

use once_cell::sync::Lazy;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use crate::tui::themes::Theme;

/// Global syntax set - loaded once at startup
static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);

/// Only used for scope detection; colors are remapped to our theme
static THEME_SET: Lazy<ThemeSet> = Lazy::new(ThemeSet::load_defaults);

/// Fence tags that syntect does not know under the same name
fn alias(lang: &str) -> &str {
    match lang {
        "ts" | "typescript" | "tsx" | "jsx" => "js",
        "py" | "python3" => "python",
        "sh" | "bash" | "zsh" | "shell" | "console" => "bash",
        "rs" => "rust",
        "yml" => "yaml",
        "c++" | "cpp" => "cpp",
        other => other,
    }
}

fn find_syntax(lang: &str) -> &'static SyntaxReference {
    let lang = alias(lang);
    SYNTAX_SET
        .find_syntax_by_token(lang)
        .or_else(|| SYNTAX_SET.find_syntax_by_extension(lang))
        .unwrap_or_else(|| SYNTAX_SET.find_syntax_plain_text())
}

/// Highlight a code block and return styled spans for each line
///
/// Unknown languages (including the default `text`) render unstyled.
pub fn highlight_code(code: &str, lang: &str, theme: &Theme) -> Vec<Vec<Span<'static>>> {
    let syntax = find_syntax(lang);
    let syntect_theme = &THEME_SET.themes["base16-ocean.dark"];
    let mut highlighter = HighlightLines::new(syntax, syntect_theme);
    let base = Style::default().bg(theme.code_bg_color);

    let mut result = Vec::new();

    for line in LinesWithEndings::from(code) {
        let spans = match highlighter.highlight_line(line, &SYNTAX_SET) {
            Ok(ranges) => ranges
                .into_iter()
                .map(|(style, text)| {
                    let mut span_style = base.fg(map_syntect_color_to_theme(style.foreground, theme));
                    if style.font_style.contains(FontStyle::BOLD) {
                        span_style = span_style.add_modifier(Modifier::BOLD);
                    }
                    if style.font_style.contains(FontStyle::ITALIC) {
                        span_style = span_style.add_modifier(Modifier::ITALIC);
                    }
                    Span::styled(text.trim_end_matches('\n').to_string(), span_style)
                })
                .collect(),
            Err(e) => {
                tracing::debug!(error = %e, "Highlighting failed, using plain text");
                vec![Span::styled(
                    line.trim_end_matches('\n').to_string(),
                    base.fg(theme.text_color),
                )]
            }
        };
        result.push(spans);
    }

    if result.is_empty() {
        result.push(vec![Span::styled(String::new(), base)]);
    }

    result
}

/// Map base16-ocean.dark output colors onto the theme's syntax palette
fn map_syntect_color_to_theme(syntect_color: syntect::highlighting::Color, theme: &Theme) -> Color {
    match (syntect_color.r, syntect_color.g, syntect_color.b) {
        // Comments (gray)
        (101, 115, 126) => theme.syntax_comment_color,
        // Strings (green)
        (163, 190, 140) => theme.syntax_string_color,
        // Numbers (orange)
        (208, 135, 112) => theme.syntax_number_color,
        // Keywords (purple)
        (180, 142, 173) => theme.syntax_keyword_color,
        // Functions (blue)
        (143, 161, 179) => theme.syntax_function_color,
        // Types/Classes (yellow), support (cyan)
        (235, 203, 139) | (150, 181, 180) => theme.syntax_type_color,
        // Variables (red)
        (191, 97, 106) => theme.syntax_variable_color,
        // Operators and punctuation
        (192, 197, 206) | (167, 173, 186) => theme.syntax_punctuation_color,
        _ => theme.text_color,
    }
}
