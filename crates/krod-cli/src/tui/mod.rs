//! Terminal front end
//!
//! `print_message` renders once to stdout; `run_viewer` is the interactive
//! view with clickable citations and copyable code blocks.

pub mod ansi;
pub mod app;
pub mod clipboard;
pub mod message;
pub mod themes;
pub mod utils;
pub mod viewport;

use std::io::{self, IsTerminal};

use anyhow::Result;

use krod_core::{render_message, ContentCache, KrodConfig, Message, SourceCards};

pub use app::run_viewer;
pub use clipboard::SystemClipboard;

use message::{render_lines, RenderOptions};
use themes::Theme;

/// Width used when neither a flag nor the terminal provides one
const FALLBACK_WIDTH: usize = 80;

/// Render a message to stdout and return
pub fn print_message(
    message: &Message,
    config: &KrodConfig,
    expand_sources: bool,
    width: Option<usize>,
) -> Result<()> {
    let width = width
        .or_else(|| {
            crossterm::terminal::size()
                .ok()
                .map(|(cols, _)| cols as usize)
        })
        .unwrap_or(FALLBACK_WIDTH);

    let mut cache = ContentCache::new(config.cache.capacity);
    let rendered = render_message(message, &mut cache);

    let mut cards = SourceCards::with_limit(config.sources.collapsed_limit);
    cards.set_expanded(expand_sources);

    let lines = render_lines(
        &rendered,
        &message.sources,
        &cards,
        &|_| false,
        RenderOptions {
            width,
            ..Default::default()
        },
        &Theme::default(),
    );

    let stdout = io::stdout();
    let styled = stdout.is_terminal();
    ansi::write_lines(&mut stdout.lock(), &lines.lines, styled)?;
    Ok(())
}
