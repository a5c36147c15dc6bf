//! Interactive message viewer
//!
//! Owns the render pipeline state for one message and maps keys and mouse
//! input onto citations, code block copies and the source card toggle.

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::{Frame, Terminal};
use tokio::task::JoinHandle;

use krod_core::clipboard::{ClipboardWriter, CopyTracker};
use krod_core::{
    render_message, CitationLinker, ContentCache, KrodConfig, Message, RenderedMessage,
    SourceCards,
};

use crate::tui::message::{render_lines, RenderOptions, RenderedLines};
use crate::tui::themes::Theme;
use crate::tui::viewport::Viewport;

/// Frame interval for smooth scrolling and indicator expiry
const TICK_INTERVAL: Duration = Duration::from_millis(30);

/// Lines moved per mouse wheel notch
const WHEEL_LINES: usize = 3;

const KEY_HINTS: &str = " q quit  j/k scroll  s sources  Tab code  y copy  1-9 cite ";

pub struct ViewerApp {
    message: Message,
    rendered: RenderedMessage,
    cards: SourceCards,
    tracker: CopyTracker,
    clipboard: Arc<dyn ClipboardWriter>,
    theme: Theme,
    viewport: Viewport,
    lines: RenderedLines,
    /// Index into the message's code blocks
    selected_code: Option<usize>,
    /// Keys showing "Copied" at the last layout
    shown_copied: Vec<String>,
    /// Content area of the last draw
    area: Rect,
    /// Lines must be rebuilt before the next draw
    stale: bool,
    /// Anything changed since the last draw
    dirty: bool,
    should_quit: bool,
}

impl ViewerApp {
    pub fn new(
        message: Message,
        config: &KrodConfig,
        clipboard: Arc<dyn ClipboardWriter>,
        expand_sources: bool,
    ) -> Self {
        let mut cache = ContentCache::new(config.cache.capacity);
        let rendered = render_message(&message, &mut cache);

        let mut cards = SourceCards::with_limit(config.sources.collapsed_limit);
        cards.set_expanded(expand_sources);

        Self {
            message,
            rendered,
            cards,
            tracker: CopyTracker::from_config(&config.clipboard),
            clipboard,
            theme: Theme::default(),
            viewport: Viewport::default(),
            lines: RenderedLines::default(),
            selected_code: None,
            shown_copied: Vec::new(),
            area: Rect::default(),
            stale: true,
            dirty: true,
            should_quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    fn code_block_count(&self) -> usize {
        self.rendered.code_blocks().count()
    }

    fn selected_key(&self) -> Option<String> {
        let index = self.selected_code?;
        self.rendered
            .code_blocks()
            .nth(index)
            .map(|(key, _)| key.to_string())
    }

    /// Rebuild lines for a content area of `width` x `height`
    pub fn relayout(&mut self, width: usize, height: usize) {
        let selected = self.selected_key();
        let tracker = &self.tracker;
        let options = RenderOptions {
            width,
            selected_code: selected.as_deref(),
            highlighted_card: self.viewport.focused_card(),
        };
        self.lines = render_lines(
            &self.rendered,
            &self.message.sources,
            &self.cards,
            &|key| tracker.is_copied(key),
            options,
            &self.theme,
        );
        self.shown_copied = self.tracker.copied_keys();
        self.viewport
            .set_layout(height, self.lines.lines.len(), self.lines.cards.clone());
        self.stale = false;
        self.dirty = true;
    }

    pub fn draw(&mut self, frame: &mut Frame) {
        let full = frame.area();
        let area = Rect {
            x: full.x + 1,
            y: full.y,
            width: full.width.saturating_sub(2),
            height: full.height.saturating_sub(1),
        };

        if self.stale || area.width != self.area.width || area.height != self.area.height {
            self.relayout(area.width as usize, area.height as usize);
        }
        self.area = area;

        let start = self.viewport.offset().min(self.lines.lines.len());
        let end = (start + area.height as usize).min(self.lines.lines.len());
        let visible: Vec<Line<'static>> = self.lines.lines[start..end].to_vec();
        frame.render_widget(Paragraph::new(visible), area);

        let status_area = Rect {
            x: full.x,
            y: full.y + full.height.saturating_sub(1),
            width: full.width,
            height: 1.min(full.height),
        };
        frame.render_widget(Paragraph::new(self.status_line()), status_area);
        self.dirty = false;
    }

    fn status_line(&self) -> Line<'static> {
        let dim = Style::default().fg(self.theme.dim_color);
        let mut spans = vec![Span::styled(KEY_HINTS, dim)];
        if !self.shown_copied.is_empty() {
            spans.push(Span::styled(
                "✓ Copied to clipboard",
                Style::default().fg(self.theme.success_color),
            ));
        }
        Line::from(spans)
    }

    /// Advance animations and pick up expired indicators
    pub fn on_tick(&mut self) {
        if self.viewport.tick() {
            self.dirty = true;
        }
        if self.tracker.copied_keys() != self.shown_copied {
            self.stale = true;
            self.dirty = true;
        }
    }

    pub fn needs_redraw(&self) -> bool {
        self.dirty || self.stale || self.viewport.is_animating()
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(_, _) => self.stale = true,
            _ => {}
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        self.dirty = true;
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true
            }
            KeyCode::Char('j') | KeyCode::Down => self.viewport.scroll_down(1),
            KeyCode::Char('k') | KeyCode::Up => self.viewport.scroll_up(1),
            KeyCode::PageDown | KeyCode::Char(' ') => self.viewport.page_down(),
            KeyCode::PageUp => self.viewport.page_up(),
            KeyCode::Char('g') | KeyCode::Home => self.viewport.scroll_to_top(),
            KeyCode::Char('G') | KeyCode::End => self.viewport.scroll_to_bottom(),
            KeyCode::Char('s') => self.toggle_sources(),
            KeyCode::Tab => self.select_code(true),
            KeyCode::BackTab => self.select_code(false),
            KeyCode::Char('y') | KeyCode::Char('c') | KeyCode::Enter => {
                if let Some(index) = self.selected_code.or_else(|| {
                    // A lone code block needs no selection
                    (self.code_block_count() == 1).then_some(0)
                }) {
                    self.copy_code(index);
                }
            }
            KeyCode::Char(digit @ '1'..='9') => {
                let display_number = digit as usize - '0' as usize;
                self.activate_citation(display_number - 1);
            }
            _ => self.dirty = false,
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::ScrollDown => self.viewport.scroll_down(WHEEL_LINES),
            MouseEventKind::ScrollUp => self.viewport.scroll_up(WHEEL_LINES),
            MouseEventKind::Down(MouseButton::Left) => {
                self.handle_click(mouse.column, mouse.row);
                return;
            }
            _ => return,
        }
        self.dirty = true;
    }

    fn handle_click(&mut self, column: u16, row: u16) {
        let area = self.area;
        if row < area.y || row >= area.y + area.height || column < area.x {
            return;
        }
        let line = self.viewport.offset() + (row - area.y) as usize;
        let col = (column - area.x) as usize;

        if let Some(source_index) = self.lines.citation_at(line, col) {
            self.activate_citation(source_index);
        } else if let Some(key) = self.lines.code_header_at(line).map(|c| c.key.clone()) {
            let found = self.rendered.code_blocks().position(|(k, _)| k == key);
            if let Some(index) = found {
                self.selected_code = Some(index);
                self.copy_code(index);
            }
        } else if self.lines.toggle_line == Some(line) {
            self.toggle_sources();
        }
    }

    fn toggle_sources(&mut self) {
        self.cards.toggle();
        tracing::debug!(expanded = self.cards.is_expanded(), "Toggled source cards");
        self.stale = true;
        self.dirty = true;
    }

    fn select_code(&mut self, forward: bool) {
        let count = self.code_block_count();
        if count == 0 {
            return;
        }
        let next = match (self.selected_code, forward) {
            (None, true) => 0,
            (None, false) => count - 1,
            (Some(i), true) => (i + 1) % count,
            (Some(i), false) => (i + count - 1) % count,
        };
        self.selected_code = Some(next);
        self.stale = true;

        if let Some(key) = self.selected_key() {
            if let Some(anchor) = self.lines.code_blocks.iter().find(|c| c.key == key) {
                self.viewport.reveal(anchor.top, anchor.height);
            }
        }
    }

    /// Copy a code block; the indicator appears once the write lands
    pub fn copy_code(&mut self, index: usize) -> Option<JoinHandle<()>> {
        let (key, content) = self.rendered.code_blocks().nth(index)?;
        let (key, content) = (key.to_string(), content.to_string());
        tracing::info!(key = %key, bytes = content.len(), "Copying code block");
        Some(
            self.tracker
                .copy(Arc::clone(&self.clipboard), content, key),
        )
    }

    /// Follow citation `[source_index + 1]` to its card
    pub fn activate_citation(&mut self, source_index: usize) {
        if !self.lines.has_citation(source_index) {
            tracing::debug!(source_index, "No such citation in message");
            return;
        }
        CitationLinker::new(&self.message.sources).activate(source_index, &mut self.viewport);
        self.stale = true;
    }

    pub fn shutdown(&self) {
        self.tracker.cancel_all();
    }
}

/// Restores the terminal even when the viewer errors out
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
    }
}

fn setup_terminal() -> Result<(Terminal<CrosstermBackend<Stdout>>, TerminalGuard)> {
    enable_raw_mode()?;
    let guard = TerminalGuard;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    Ok((terminal, guard))
}

/// Run the viewer until the user quits
pub async fn run_viewer(
    message: Message,
    config: &KrodConfig,
    clipboard: Arc<dyn ClipboardWriter>,
    expand_sources: bool,
) -> Result<()> {
    let (mut terminal, _guard) = setup_terminal()?;
    let mut app = ViewerApp::new(message, config, clipboard, expand_sources);
    tracing::info!(
        segments = app.rendered.segments.len(),
        sources = app.message.sources.len(),
        "Viewer started"
    );

    let mut events = EventStream::new();
    let mut ticker = tokio::time::interval(TICK_INTERVAL);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        if app.needs_redraw() {
            terminal.draw(|frame| app.draw(frame))?;
        }
        if app.should_quit() {
            break;
        }

        tokio::select! {
            _ = ticker.tick() => app.on_tick(),
            event = events.next() => match event {
                Some(Ok(event)) => app.handle_event(event),
                Some(Err(e)) => {
                    app.shutdown();
                    return Err(e.into());
                }
                None => break,
            },
        }
    }

    app.shutdown();
    tracing::info!("Viewer closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use krod_core::{MessageRole, Source};
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryClipboard {
        contents: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ClipboardWriter for MemoryClipboard {
        async fn write_text(&self, text: String) -> krod_core::Result<()> {
            self.contents.lock().unwrap().push(text);
            Ok(())
        }
    }

    fn source(i: usize) -> Source {
        Source {
            id: format!("s{}", i),
            title: format!("Source {}", i),
            url: format!("https://example.com/{}", i),
            domain: None,
            snippet: None,
            favicon: None,
        }
    }

    fn app(content: &str, source_count: usize) -> (ViewerApp, Arc<MemoryClipboard>) {
        let clipboard = Arc::new(MemoryClipboard::default());
        let message = Message::new(
            MessageRole::Assistant,
            content,
            (1..=source_count).map(source).collect(),
        );
        let mut app = ViewerApp::new(
            message,
            &KrodConfig::default(),
            clipboard.clone(),
            false,
        );
        app.relayout(60, 8);
        (app, clipboard)
    }

    fn press(app: &mut ViewerApp, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[tokio::test]
    async fn test_copy_selected_code_block() {
        let (mut app, clipboard) = app("one\n```\nfirst\n```\ntwo\n```\nsecond\n```", 0);
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.selected_key().as_deref(), Some("code-3"));

        let handle = app.copy_code(app.selected_code.unwrap()).unwrap();
        handle.await.unwrap();
        assert_eq!(*clipboard.contents.lock().unwrap(), vec!["second"]);

        app.on_tick();
        assert!(app.stale);
        app.relayout(60, 8);
        assert_eq!(app.shown_copied, vec!["code-3"]);
        app.shutdown();
    }

    #[test]
    fn test_tab_wraps_between_code_blocks() {
        let (mut app, _) = app("```\na\n```\ntext\n```\nb\n```", 0);
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.selected_key().as_deref(), Some("code-2"));
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.selected_key().as_deref(), Some("code-0"));
    }

    #[test]
    fn test_toggle_sources_changes_cards() {
        let (mut app, _) = app("Facts [1]", 5);
        assert_eq!(app.lines.cards.len(), 3);
        press(&mut app, KeyCode::Char('s'));
        app.relayout(60, 8);
        assert_eq!(app.lines.cards.len(), 5);
        press(&mut app, KeyCode::Char('s'));
        app.relayout(60, 8);
        assert_eq!(app.lines.cards.len(), 3);
    }

    #[test]
    fn test_digit_follows_citation_to_card() {
        let (mut app, _) = app("Facts [2]", 2);
        press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.viewport.focused_card(), Some("s2"));
    }

    #[test]
    fn test_digit_without_citation_is_ignored() {
        let (mut app, _) = app("Facts [1]", 2);
        press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.viewport.focused_card(), None);
    }

    #[test]
    fn test_citation_to_collapsed_card_is_noop() {
        let (mut app, _) = app("Late [5]", 5);
        press(&mut app, KeyCode::Char('5'));
        assert_eq!(app.viewport.focused_card(), None);
        assert_eq!(app.viewport.offset(), 0);
    }

    #[test]
    fn test_click_on_citation() {
        let (mut app, _) = app("Facts [1]", 1);
        app.area = Rect::new(1, 0, 60, 8);
        let citation = app.lines.citations[0].clone();
        app.handle_click(
            1 + citation.start_col as u16,
            citation.line as u16,
        );
        assert_eq!(app.viewport.focused_card(), Some("s1"));
    }

    #[tokio::test]
    async fn test_click_on_code_header_copies_block() {
        let (mut app, clipboard) = app("intro\n```rust\nlet x = 1;\n```", 0);
        app.area = Rect::new(1, 0, 60, 8);
        let header = app.lines.code_blocks[0].top;
        app.handle_click(10, header as u16);
        assert_eq!(app.selected_key().as_deref(), Some("code-1"));

        for _ in 0..50 {
            if !clipboard.contents.lock().unwrap().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(*clipboard.contents.lock().unwrap(), vec!["let x = 1;"]);
        app.shutdown();
    }

    #[test]
    fn test_quit_keys() {
        let (mut app, _) = app("bye", 0);
        assert!(!app.should_quit());
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit());
    }
}
