//! Theme for the Krod terminal view
//!
//! A single dark palette; there is no theme switching.

use ratatui::style::Color;

/// Colors used when drawing a message
#[derive(Debug, Clone)]
pub struct Theme {
    // Core colors
    pub border_color: Color,
    pub title_color: Color,
    pub accent_color: Color,
    pub text_color: Color,
    pub success_color: Color,
    pub dim_color: Color,
    pub code_bg_color: Color,
    pub selection_bg_color: Color,

    // Message role colors (text)
    pub user_msg_color: Color,
    pub assistant_msg_color: Color,

    // Math and citations
    pub math_color: Color,
    pub link_color: Color,

    // Syntax Highlighting Colors
    pub syntax_keyword_color: Color,
    pub syntax_function_color: Color,
    pub syntax_string_color: Color,
    pub syntax_number_color: Color,
    pub syntax_comment_color: Color,
    pub syntax_type_color: Color,
    pub syntax_variable_color: Color,
    pub syntax_punctuation_color: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            border_color: Color::Rgb(88, 91, 112),
            title_color: Color::Rgb(139, 233, 253),
            accent_color: Color::Rgb(189, 147, 249),
            text_color: Color::Rgb(203, 213, 225),
            success_color: Color::Rgb(80, 250, 123),
            dim_color: Color::Rgb(148, 163, 184),
            code_bg_color: Color::Rgb(30, 30, 45),
            selection_bg_color: Color::Rgb(51, 65, 85),
            user_msg_color: Color::Rgb(80, 250, 123),
            assistant_msg_color: Color::Rgb(189, 147, 249),
            math_color: Color::Rgb(255, 203, 107),
            link_color: Color::Rgb(139, 233, 253),
            syntax_keyword_color: Color::Rgb(255, 121, 198),
            syntax_function_color: Color::Rgb(80, 250, 123),
            syntax_string_color: Color::Rgb(241, 250, 140),
            syntax_number_color: Color::Rgb(189, 147, 249),
            syntax_comment_color: Color::Rgb(98, 114, 164),
            syntax_type_color: Color::Rgb(139, 233, 253),
            syntax_variable_color: Color::Rgb(248, 248, 242),
            syntax_punctuation_color: Color::Rgb(248, 248, 242),
        }
    }
}
